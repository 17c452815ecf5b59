use crate::sat::literal::Literal;

/// Two-watched-literal index: for each literal, the clauses currently
/// watching it. A clause only needs attention when a watched literal
/// becomes false.
#[derive(Debug, Clone, Default)]
pub struct Watches {
    lists: Vec<Vec<usize>>,
}

impl Watches {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            lists: vec![Vec::new(); num_vars * 2],
        }
    }

    pub fn watch(&mut self, lit: Literal, clause: usize) {
        self.lists[lit.code()].push(clause);
    }

    /// Takes the whole watch list for `lit`; the propagator re-adds the
    /// entries that keep watching it.
    pub fn take(&mut self, lit: Literal) -> Vec<usize> {
        std::mem::take(&mut self.lists[lit.code()])
    }

    #[must_use]
    pub fn watchers(&self, lit: Literal) -> &[usize] {
        &self.lists[lit.code()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_and_rewatch() {
        let mut watches = Watches::new(2);
        watches.watch(Literal::positive(0), 3);
        watches.watch(Literal::positive(0), 5);
        let taken = watches.take(Literal::positive(0));
        assert_eq!(taken, vec![3, 5]);
        assert!(watches.watchers(Literal::positive(0)).is_empty());
        watches.watch(Literal::positive(0), 5);
        assert_eq!(watches.watchers(Literal::positive(0)), &[5]);
    }
}
