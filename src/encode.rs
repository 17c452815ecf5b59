//! Compiles interned terms to CNF.
//!
//! Booleans go through plain Tseitin transformation; the hash-consed arena
//! means a shared subterm gets one auxiliary variable no matter how often
//! it appears.
//!
//! Integers use an order/value hybrid encoding. Each integer term gets a
//! sorted candidate domain with one value literal per candidate and a
//! chain of order literals (`x <= v_i`). The chain makes exactly-one hold
//! structurally and gives comparisons linear-size encodings. Sums fold
//! pairwise; each partial sum is a fresh internal domain.

use crate::context::{Bool, Context, Term, TermId};
use crate::sat::cnf::Cnf;
use crate::sat::literal::Literal;
use log::debug;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

/// Finite-domain representation of an integer term.
#[derive(Debug, Clone)]
struct IntRepr {
    /// Sorted candidate values.
    values: Vec<i64>,
    /// `value_lits[i]` holds iff the term equals `values[i]`.
    value_lits: Vec<Literal>,
    /// `order_lits[i]` holds iff the term is at most `values[i]`;
    /// one shorter than `values`, the last bound being vacuous.
    order_lits: Vec<Literal>,
}

impl IntRepr {
    /// The literal for `term <= bound`.
    fn le_const(&self, bound: i64, lit_true: Literal) -> Literal {
        let pos = self.values.partition_point(|v| *v <= bound);
        if pos == 0 {
            lit_true.negated()
        } else if pos == self.values.len() {
            lit_true
        } else {
            self.order_lits[pos - 1]
        }
    }

    fn lit_for(&self, value: i64) -> Option<Literal> {
        self.values
            .binary_search(&value)
            .ok()
            .map(|i| self.value_lits[i])
    }
}

/// Decode table from SAT model back to declared variables.
#[derive(Debug, Default)]
pub struct VarTable {
    ints: FxHashMap<u32, IntRepr>,
    bools: FxHashMap<u32, Literal>,
}

impl VarTable {
    pub(crate) fn decode(
        &self,
        values: &[bool],
    ) -> (FxHashMap<u32, i64>, FxHashMap<u32, bool>) {
        let lit_value =
            |lit: Literal| values[lit.variable() as usize] == lit.polarity();
        let ints = self
            .ints
            .iter()
            .map(|(var, repr)| {
                let i = repr
                    .value_lits
                    .iter()
                    .position(|lit| lit_value(*lit))
                    .expect("no value literal holds");
                (*var, repr.values[i])
            })
            .collect();
        let bools = self
            .bools
            .iter()
            .map(|(var, lit)| (*var, lit_value(*lit)))
            .collect();
        (ints, bools)
    }
}

pub struct Encoder<'ctx> {
    ctx: &'ctx Context,
    cnf: Cnf,
    lit_true: Literal,
    bools: FxHashMap<TermId, Literal>,
    ints: FxHashMap<TermId, IntRepr>,
}

impl<'ctx> Encoder<'ctx> {
    pub fn new(ctx: &'ctx Context) -> Self {
        let mut cnf = Cnf::new();
        let lit_true = Literal::positive(cnf.new_var());
        cnf.add_clause([lit_true]);
        Self {
            ctx,
            cnf,
            lit_true,
            bools: FxHashMap::default(),
            ints: FxHashMap::default(),
        }
    }

    /// Asserts a formula at the top level.
    pub fn assert(&mut self, b: Bool) {
        // Top-level conjunctions turn into separate assertions instead of
        // a Tseitin variable.
        if let Term::And(args) = self.ctx.term(b.0) {
            for arg in args {
                self.assert(Bool(arg));
            }
            return;
        }
        let lit = self.encode_bool(b.0);
        self.cnf.add_clause([lit]);
    }

    /// Forces a declared variable into the decode table even if nothing
    /// was asserted about it.
    pub fn declare(&mut self, id: TermId) {
        match self.ctx.term(id) {
            Term::BoolVar(_) => {
                self.encode_bool(id);
            }
            Term::IntVar(_) => {
                self.encode_int(id);
            }
            _ => panic!("declare expects a variable term"),
        }
    }

    pub fn finish(self) -> (Cnf, VarTable) {
        let mut table = VarTable::default();
        for (id, lit) in &self.bools {
            if let Term::BoolVar(var) = self.ctx.term(*id) {
                table.bools.insert(var, *lit);
            }
        }
        for (id, repr) in &self.ints {
            if let Term::IntVar(var) = self.ctx.term(*id) {
                table.ints.insert(var, repr.clone());
            }
        }
        debug!(
            "encoded {} vars, {} clauses",
            self.cnf.num_vars(),
            self.cnf.num_clauses()
        );
        (self.cnf, table)
    }

    fn fresh(&mut self) -> Literal {
        Literal::positive(self.cnf.new_var())
    }

    /// Allocates an order-encoded domain over `values`.
    fn fresh_repr(&mut self, values: Vec<i64>) -> IntRepr {
        let n = values.len();
        assert!(n > 0, "empty integer domain");
        if n == 1 {
            return IntRepr {
                values,
                value_lits: vec![self.lit_true],
                order_lits: Vec::new(),
            };
        }
        let order_lits: Vec<Literal> = (0..n - 1).map(|_| self.fresh()).collect();
        for w in order_lits.windows(2) {
            self.cnf.add_clause([w[0].negated(), w[1]]);
        }
        let mut value_lits = Vec::with_capacity(n);
        value_lits.push(order_lits[0]);
        for i in 1..n - 1 {
            let v = self.fresh();
            let (o, prev) = (order_lits[i], order_lits[i - 1]);
            self.cnf.add_clause([v.negated(), o]);
            self.cnf.add_clause([v.negated(), prev.negated()]);
            self.cnf.add_clause([v, o.negated(), prev]);
            value_lits.push(v);
        }
        value_lits.push(order_lits[n - 2].negated());
        IntRepr {
            values,
            value_lits,
            order_lits,
        }
    }

    fn encode_bool(&mut self, id: TermId) -> Literal {
        if let Some(lit) = self.bools.get(&id) {
            return *lit;
        }
        let lit = match self.ctx.term(id) {
            Term::BoolConst(true) => self.lit_true,
            Term::BoolConst(false) => self.lit_true.negated(),
            Term::BoolVar(_) => self.fresh(),
            Term::Not(inner) => self.encode_bool(inner).negated(),
            Term::And(args) => {
                let lits: Vec<Literal> = args.iter().map(|a| self.encode_bool(*a)).collect();
                let g = self.fresh();
                let mut long = vec![g];
                for a in lits {
                    self.cnf.add_clause([g.negated(), a]);
                    long.push(a.negated());
                }
                self.cnf.add_clause(long);
                g
            }
            Term::Or(args) => {
                let lits: Vec<Literal> = args.iter().map(|a| self.encode_bool(*a)).collect();
                let g = self.fresh();
                let mut long = vec![g.negated()];
                for a in lits {
                    self.cnf.add_clause([g, a.negated()]);
                    long.push(a);
                }
                self.cnf.add_clause(long);
                g
            }
            Term::Implies(a, b) => {
                let (a, b) = (self.encode_bool(a), self.encode_bool(b));
                let g = self.fresh();
                self.cnf.add_clause([g.negated(), a.negated(), b]);
                self.cnf.add_clause([g, a]);
                self.cnf.add_clause([g, b.negated()]);
                g
            }
            Term::Iff(a, b) => {
                let (a, b) = (self.encode_bool(a), self.encode_bool(b));
                let g = self.fresh();
                self.cnf.add_clause([g.negated(), a.negated(), b]);
                self.cnf.add_clause([g.negated(), a, b.negated()]);
                self.cnf.add_clause([g, a, b]);
                self.cnf.add_clause([g, a.negated(), b.negated()]);
                g
            }
            Term::Eq(x, y) => self.encode_eq(x, y),
            Term::Le(x, y) => self.encode_cmp(x, y, 0),
            Term::Lt(x, y) => self.encode_cmp(x, y, -1),
            term => panic!("expected a boolean term, found {term:?}"),
        };
        self.bools.insert(id, lit);
        lit
    }

    /// `r <-> x = y` over finite domains.
    fn encode_eq(&mut self, x: TermId, y: TermId) -> Literal {
        let a = self.encode_int(x);
        let b = self.encode_int(y);
        let r = self.fresh();
        for (i, value) in a.values.iter().enumerate() {
            let a_i = a.value_lits[i];
            match b.lit_for(*value) {
                Some(b_j) => {
                    self.cnf.add_clause([r.negated(), a_i.negated(), b_j]);
                    self.cnf.add_clause([r, a_i.negated(), b_j.negated()]);
                }
                None => self.cnf.add_clause([r.negated(), a_i.negated()]),
            }
        }
        r
    }

    /// `r <-> x <= y + slack`, with `slack` 0 for `Le` and -1 for `Lt`.
    fn encode_cmp(&mut self, x: TermId, y: TermId, slack: i64) -> Literal {
        let a = self.encode_int(x);
        let b = self.encode_int(y);
        let r = self.fresh();
        for (i, value) in a.values.iter().enumerate() {
            let a_i = a.value_lits[i];
            // r and x = v force y >= v - slack; not r forces y < v - slack.
            let y_below = b.le_const(value - slack - 1, self.lit_true);
            self.cnf
                .add_clause([r.negated(), a_i.negated(), y_below.negated()]);
            self.cnf.add_clause([r, a_i.negated(), y_below]);
        }
        r
    }

    fn encode_int(&mut self, id: TermId) -> IntRepr {
        if let Some(repr) = self.ints.get(&id) {
            return repr.clone();
        }
        let repr = match self.ctx.term(id) {
            Term::IntConst(value) => IntRepr {
                values: vec![value],
                value_lits: vec![self.lit_true],
                order_lits: Vec::new(),
            },
            Term::IntVar(var) => {
                let (lo, hi) = self.ctx.int_bounds(var);
                self.fresh_repr((lo..=hi).collect())
            }
            Term::FromBool(inner) => {
                let lit = self.encode_bool(inner);
                IntRepr {
                    values: vec![0, 1],
                    value_lits: vec![lit.negated(), lit],
                    order_lits: vec![lit.negated()],
                }
            }
            Term::Sum(args) => {
                let reprs: Vec<IntRepr> = args.iter().map(|a| self.encode_int(*a)).collect();
                let mut iter = reprs.into_iter();
                let first = iter.next().expect("sum interned with >= 2 args");
                iter.fold(first, |acc, next| self.encode_pair_sum(&acc, &next))
            }
            Term::Ite(cond, then, els) => {
                let c = self.encode_bool(cond);
                let a = self.encode_int(then);
                let b = self.encode_int(els);
                let domain: BTreeSet<i64> =
                    a.values.iter().chain(b.values.iter()).copied().collect();
                let s = self.fresh_repr(domain.into_iter().collect());
                for (i, value) in a.values.iter().enumerate() {
                    let s_k = s.lit_for(*value).expect("ite domain covers both arms");
                    self.cnf
                        .add_clause([c.negated(), a.value_lits[i].negated(), s_k]);
                }
                for (j, value) in b.values.iter().enumerate() {
                    let s_k = s.lit_for(*value).expect("ite domain covers both arms");
                    self.cnf.add_clause([c, b.value_lits[j].negated(), s_k]);
                }
                s
            }
            term => panic!("expected an integer term, found {term:?}"),
        };
        self.ints.insert(id, repr.clone());
        repr
    }

    fn encode_pair_sum(&mut self, a: &IntRepr, b: &IntRepr) -> IntRepr {
        let domain: BTreeSet<i64> = a
            .values
            .iter()
            .flat_map(|va| b.values.iter().map(move |vb| va + vb))
            .collect();
        let s = self.fresh_repr(domain.into_iter().collect());
        for (i, va) in a.values.iter().enumerate() {
            for (j, vb) in b.values.iter().enumerate() {
                let s_k = s.lit_for(va + vb).expect("sum domain covers all pairs");
                self.cnf.add_clause([
                    a.value_lits[i].negated(),
                    b.value_lits[j].negated(),
                    s_k,
                ]);
            }
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::engine::{Engine, Verdict};
    use std::sync::atomic::AtomicBool;

    fn solve_with(ctx: &Context, asserted: &[Bool]) -> Option<(Cnf, VarTable, Vec<bool>)> {
        let mut encoder = Encoder::new(ctx);
        for b in asserted {
            encoder.assert(*b);
        }
        let (cnf, table) = encoder.finish();
        match Engine::new(cnf.clone()).solve(None, &AtomicBool::new(false)) {
            Verdict::Sat(values) => Some((cnf, table, values)),
            _ => None,
        }
    }

    #[test]
    fn test_int_equals_constant() {
        let ctx = Context::new();
        let x = ctx.fresh_int(0, 5);
        let formula = x.eq(&ctx, ctx.int(3));
        let (_, table, values) = solve_with(&ctx, &[formula]).expect("sat");
        let (ints, _) = table.decode(&values);
        assert_eq!(ints.values().copied().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn test_ordering_and_sum() {
        let ctx = Context::new();
        let x = ctx.fresh_int(0, 3);
        let y = ctx.fresh_int(0, 3);
        let asserted = [
            x.lt(&ctx, y),
            ctx.sum([x, y]).eq(&ctx, ctx.int(5)),
        ];
        let (_, table, values) = solve_with(&ctx, &asserted).expect("sat");
        let (ints, _) = table.decode(&values);
        let mut vals: Vec<i64> = ints.values().copied().collect();
        vals.sort_unstable();
        assert_eq!(vals, vec![2, 3]);
    }

    #[test]
    fn test_out_of_range_equality_is_unsat() {
        let ctx = Context::new();
        let x = ctx.fresh_int(0, 2);
        assert!(solve_with(&ctx, &[x.eq(&ctx, ctx.int(7))]).is_none());
    }

    #[test]
    fn test_bool_sum_counts() {
        let ctx = Context::new();
        let bits: Vec<Bool> = (0..4).map(|_| ctx.fresh_bool()).collect();
        let count = ctx.sum_bools(bits.iter().copied());
        let (_, table, values) =
            solve_with(&ctx, &[count.eq(&ctx, ctx.int(3))]).expect("sat");
        let (_, bools) = table.decode(&values);
        let set = bools.values().filter(|b| **b).count();
        assert_eq!(set, 3);
    }

    #[test]
    fn test_ite_selects_branch() {
        let ctx = Context::new();
        let c = ctx.fresh_bool();
        let x = ctx.ite(c, ctx.int(10), ctx.int(20));
        let asserted = [x.eq(&ctx, ctx.int(20)), c];
        assert!(solve_with(&ctx, &asserted).is_none());
    }

    #[test]
    fn test_distinct_pigeonholes() {
        let ctx = Context::new();
        let vars: Vec<_> = (0..4).map(|_| ctx.fresh_int(0, 2)).collect();
        assert!(solve_with(&ctx, &[ctx.distinct(vars)]).is_none());
    }

    #[test]
    fn test_unconstrained_declared_var_decodes() {
        let ctx = Context::new();
        let x = ctx.fresh_int(2, 4);
        let mut encoder = Encoder::new(&ctx);
        encoder.declare(x.0);
        let (cnf, table) = encoder.finish();
        let Verdict::Sat(values) = Engine::new(cnf).solve(None, &AtomicBool::new(false)) else {
            panic!("expected sat");
        };
        let (ints, _) = table.decode(&values);
        let value = ints[&0];
        assert!((2..=4).contains(&value));
    }
}
