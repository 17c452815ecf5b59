use crate::sat::literal::Literal;
use core::ops::{Index, IndexMut};
use smallvec::SmallVec;

/// A disjunction of literals.
///
/// The first two positions are the watched literals; `swap` keeps the
/// invariant when the watches move.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Clause {
    literals: SmallVec<[Literal; 8]>,
}

impl Clause {
    #[must_use]
    pub fn new(literals: impl IntoIterator<Item = Literal>) -> Self {
        Self {
            literals: literals.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.len() == 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }

    pub fn swap(&mut self, i: usize, j: usize) {
        self.literals.swap(i, j);
    }
}

impl Index<usize> for Clause {
    type Output = Literal;

    fn index(&self, index: usize) -> &Self::Output {
        &self.literals[index]
    }
}

impl IndexMut<usize> for Clause {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.literals[index]
    }
}

impl FromIterator<Literal> for Clause {
    fn from_iter<I: IntoIterator<Item = Literal>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let clause = Clause::new([Literal::positive(1), Literal::negative(2)]);
        assert_eq!(clause.len(), 2);
        assert!(!clause.is_unit());
        assert_eq!(clause[0], Literal::positive(1));
    }

    #[test]
    fn test_swap() {
        let mut clause = Clause::new([
            Literal::positive(1),
            Literal::positive(2),
            Literal::positive(3),
        ]);
        clause.swap(0, 2);
        assert_eq!(clause[0], Literal::positive(3));
        assert_eq!(clause[2], Literal::positive(1));
    }
}
