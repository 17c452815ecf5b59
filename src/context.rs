//! The symbolic expression layer.
//!
//! A [`Context`] owns an arena of hash-consed terms. Formula builders
//! intern structurally equal terms once, so the CNF compiler encodes every
//! shared subterm a single time. [`Bool`] and [`Arith`] are copyable
//! handles into the arena; building a term never asserts anything.
//!
//! Integer variables carry inclusive bounds fixed at declaration. All
//! arithmetic in this system is over such finite domains.

use core::cell::RefCell;
use rustc_hash::FxHashMap;

/// Index of an interned term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermId(u32);

impl TermId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Interned term structure. Comparisons and `Ite` are arith-valued at the
/// leaves, boolean at the root; `FromBool` coerces a boolean to 0/1.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    BoolConst(bool),
    BoolVar(u32),
    IntConst(i64),
    IntVar(u32),
    Not(TermId),
    And(Vec<TermId>),
    Or(Vec<TermId>),
    Implies(TermId, TermId),
    Iff(TermId, TermId),
    Eq(TermId, TermId),
    Lt(TermId, TermId),
    Le(TermId, TermId),
    Sum(Vec<TermId>),
    Ite(TermId, TermId, TermId),
    FromBool(TermId),
}

#[derive(Debug, Default)]
struct TermPool {
    terms: Vec<Term>,
    interned: FxHashMap<Term, TermId>,
    int_bounds: Vec<(i64, i64)>,
    bool_vars: u32,
}

impl TermPool {
    fn intern(&mut self, term: Term) -> TermId {
        if let Some(id) = self.interned.get(&term) {
            return *id;
        }
        let id = TermId(u32::try_from(self.terms.len()).expect("term arena overflow"));
        self.terms.push(term.clone());
        self.interned.insert(term, id);
        id
    }

    fn fresh(&mut self, term: Term) -> TermId {
        // Variables have identity, never hash-consed.
        let id = TermId(u32::try_from(self.terms.len()).expect("term arena overflow"));
        self.terms.push(term);
        id
    }
}

/// A boolean-valued term handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bool(pub(crate) TermId);

/// An integer-valued term handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Arith(pub(crate) TermId);

/// Owner of the term arena. Not `Sync`; formula construction is
/// single-threaded by design.
#[derive(Debug, Default)]
pub struct Context {
    pool: RefCell<TermPool>,
}

impl Context {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&self, term: Term) -> TermId {
        self.pool.borrow_mut().intern(term)
    }

    pub(crate) fn term(&self, id: TermId) -> Term {
        self.pool.borrow().terms[id.index()].clone()
    }

    /// Inclusive bounds of the integer variable numbered `var`.
    pub(crate) fn int_bounds(&self, var: u32) -> (i64, i64) {
        self.pool.borrow().int_bounds[var as usize]
    }

    pub(crate) fn fresh_bool(&self) -> Bool {
        let mut pool = self.pool.borrow_mut();
        let var = pool.bool_vars;
        pool.bool_vars += 1;
        Bool(pool.fresh(Term::BoolVar(var)))
    }

    pub(crate) fn fresh_int(&self, lo: i64, hi: i64) -> Arith {
        assert!(lo <= hi, "empty domain [{lo}, {hi}]");
        let mut pool = self.pool.borrow_mut();
        let var = u32::try_from(pool.int_bounds.len()).expect("variable count overflow");
        pool.int_bounds.push((lo, hi));
        Arith(pool.fresh(Term::IntVar(var)))
    }

    #[must_use]
    pub fn bool_const(&self, value: bool) -> Bool {
        Bool(self.intern(Term::BoolConst(value)))
    }

    #[must_use]
    pub fn int(&self, value: i64) -> Arith {
        Arith(self.intern(Term::IntConst(value)))
    }

    /// Conjunction; true when empty.
    pub fn and(&self, args: impl IntoIterator<Item = Bool>) -> Bool {
        let mut flat = Vec::new();
        for b in args {
            match self.term(b.0) {
                Term::BoolConst(true) => {}
                Term::BoolConst(false) => return self.bool_const(false),
                _ => flat.push(b.0),
            }
        }
        match flat.len() {
            0 => self.bool_const(true),
            1 => Bool(flat[0]),
            _ => Bool(self.intern(Term::And(flat))),
        }
    }

    /// Disjunction; false when empty.
    pub fn or(&self, args: impl IntoIterator<Item = Bool>) -> Bool {
        let mut flat = Vec::new();
        for b in args {
            match self.term(b.0) {
                Term::BoolConst(false) => {}
                Term::BoolConst(true) => return self.bool_const(true),
                _ => flat.push(b.0),
            }
        }
        match flat.len() {
            0 => self.bool_const(false),
            1 => Bool(flat[0]),
            _ => Bool(self.intern(Term::Or(flat))),
        }
    }

    pub fn not(&self, a: Bool) -> Bool {
        match self.term(a.0) {
            Term::BoolConst(b) => self.bool_const(!b),
            Term::Not(inner) => Bool(inner),
            _ => Bool(self.intern(Term::Not(a.0))),
        }
    }

    pub fn implies(&self, a: Bool, b: Bool) -> Bool {
        Bool(self.intern(Term::Implies(a.0, b.0)))
    }

    pub fn iff(&self, a: Bool, b: Bool) -> Bool {
        if a == b {
            return self.bool_const(true);
        }
        Bool(self.intern(Term::Iff(a.0, b.0)))
    }

    /// Sum of integer terms; 0 when empty.
    pub fn sum(&self, args: impl IntoIterator<Item = Arith>) -> Arith {
        let ids: Vec<TermId> = args.into_iter().map(|a| a.0).collect();
        match ids.len() {
            0 => self.int(0),
            1 => Arith(ids[0]),
            _ => Arith(self.intern(Term::Sum(ids))),
        }
    }

    /// Sum of booleans coerced to 0/1.
    pub fn sum_bools(&self, args: impl IntoIterator<Item = Bool>) -> Arith {
        let args: Vec<Arith> = args.into_iter().map(|b| self.from_bool(b)).collect();
        self.sum(args)
    }

    #[must_use]
    pub fn from_bool(&self, b: Bool) -> Arith {
        Arith(self.intern(Term::FromBool(b.0)))
    }

    /// Pairwise inequality; trivially true for fewer than two terms.
    pub fn distinct(&self, args: impl IntoIterator<Item = Arith>) -> Bool {
        let args: Vec<Arith> = args.into_iter().collect();
        let mut pairs = Vec::new();
        for i in 0..args.len() {
            for j in i + 1..args.len() {
                pairs.push(args[i].ne(self, args[j]));
            }
        }
        self.and(pairs)
    }

    /// If-then-else over boolean terms.
    pub fn ite_bool(&self, cond: Bool, then: Bool, els: Bool) -> Bool {
        self.and([
            self.implies(cond, then),
            self.implies(self.not(cond), els),
        ])
    }

    /// If-then-else over integer terms.
    pub fn ite(&self, cond: Bool, then: Arith, els: Arith) -> Arith {
        match self.term(cond.0) {
            Term::BoolConst(true) => then,
            Term::BoolConst(false) => els,
            _ => Arith(self.intern(Term::Ite(cond.0, then.0, els.0))),
        }
    }
}

impl Bool {
    #[must_use]
    pub fn not(self, ctx: &Context) -> Self {
        ctx.not(self)
    }

    #[must_use]
    pub fn implies(self, ctx: &Context, other: Self) -> Self {
        ctx.implies(self, other)
    }

    #[must_use]
    pub fn iff(self, ctx: &Context, other: Self) -> Self {
        ctx.iff(self, other)
    }

    #[must_use]
    pub fn and(self, ctx: &Context, other: Self) -> Self {
        ctx.and([self, other])
    }

    #[must_use]
    pub fn or(self, ctx: &Context, other: Self) -> Self {
        ctx.or([self, other])
    }
}

impl Arith {
    #[must_use]
    pub fn eq(self, ctx: &Context, other: Self) -> Bool {
        if self.0 == other.0 {
            return ctx.bool_const(true);
        }
        Bool(ctx.intern(Term::Eq(self.0, other.0)))
    }

    #[must_use]
    pub fn ne(self, ctx: &Context, other: Self) -> Bool {
        ctx.not(self.eq(ctx, other))
    }

    #[must_use]
    pub fn lt(self, ctx: &Context, other: Self) -> Bool {
        Bool(ctx.intern(Term::Lt(self.0, other.0)))
    }

    #[must_use]
    pub fn le(self, ctx: &Context, other: Self) -> Bool {
        if self.0 == other.0 {
            return ctx.bool_const(true);
        }
        Bool(ctx.intern(Term::Le(self.0, other.0)))
    }

    #[must_use]
    pub fn gt(self, ctx: &Context, other: Self) -> Bool {
        other.lt(ctx, self)
    }

    #[must_use]
    pub fn ge(self, ctx: &Context, other: Self) -> Bool {
        other.le(ctx, self)
    }

    /// This term plus a constant offset.
    #[must_use]
    pub fn add(self, ctx: &Context, offset: i64) -> Self {
        if offset == 0 {
            return self;
        }
        let k = ctx.int(offset);
        ctx.sum([self, k])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_consing_shares_terms() {
        let ctx = Context::new();
        let a = ctx.fresh_int(0, 3);
        let b = ctx.fresh_int(0, 3);
        assert_eq!(a.eq(&ctx, b), a.eq(&ctx, b));
        assert_ne!(a.0, b.0);
    }

    #[test]
    fn test_degenerate_connectives() {
        let ctx = Context::new();
        assert_eq!(ctx.and([]), ctx.bool_const(true));
        assert_eq!(ctx.or([]), ctx.bool_const(false));
        assert_eq!(ctx.sum([]), ctx.int(0));
        assert_eq!(ctx.distinct([]), ctx.bool_const(true));
        let x = ctx.fresh_int(0, 1);
        assert_eq!(ctx.distinct([x]), ctx.bool_const(true));
    }

    #[test]
    fn test_double_negation_collapses() {
        let ctx = Context::new();
        let b = ctx.fresh_bool();
        assert_eq!(ctx.not(ctx.not(b)), b);
    }

    #[test]
    fn test_constant_folding_in_and() {
        let ctx = Context::new();
        let b = ctx.fresh_bool();
        assert_eq!(ctx.and([b, ctx.bool_const(true)]), b);
        assert_eq!(
            ctx.and([b, ctx.bool_const(false)]),
            ctx.bool_const(false)
        );
    }

    #[test]
    fn test_self_comparisons_fold() {
        let ctx = Context::new();
        let x = ctx.fresh_int(0, 5);
        assert_eq!(x.eq(&ctx, x), ctx.bool_const(true));
        assert_eq!(x.le(&ctx, x), ctx.bool_const(true));
    }

    #[test]
    #[should_panic(expected = "empty domain")]
    fn test_empty_domain_rejected() {
        let ctx = Context::new();
        let _ = ctx.fresh_int(3, 2);
    }
}
