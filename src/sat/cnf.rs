use crate::sat::clause::Clause;
use crate::sat::literal::{Literal, Variable};
use core::ops::Index;

/// A formula in conjunctive normal form, plus the variable allocator.
///
/// `add_clause` normalizes as it goes: duplicate literals are dropped and
/// tautological clauses are skipped entirely. An empty clause marks the
/// formula trivially unsatisfiable.
#[derive(Debug, Clone, Default)]
pub struct Cnf {
    clauses: Vec<Clause>,
    num_vars: usize,
    trivially_unsat: bool,
}

impl Cnf {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_var(&mut self) -> Variable {
        let var = Variable::try_from(self.num_vars).expect("variable count overflow");
        self.num_vars += 1;
        var
    }

    pub fn add_clause(&mut self, literals: impl IntoIterator<Item = Literal>) {
        let mut lits: Vec<Literal> = literals.into_iter().collect();
        lits.sort_unstable();
        lits.dedup();
        if lits.windows(2).any(|w| w[0] == w[1].negated()) {
            return;
        }
        if lits.is_empty() {
            self.trivially_unsat = true;
        }
        self.clauses.push(Clause::new(lits));
    }

    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    #[must_use]
    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    #[must_use]
    pub fn is_trivially_unsat(&self) -> bool {
        self.trivially_unsat
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    pub(crate) fn clauses_mut(&mut self) -> &mut [Clause] {
        &mut self.clauses
    }
}

impl Index<usize> for Cnf {
    type Output = Clause;

    fn index(&self, index: usize) -> &Self::Output {
        &self.clauses[index]
    }
}
