use crate::sat::literal::Literal;

/// One assignment on the trail.
///
/// `decision` marks a branch point; `flipped` marks a branch whose second
/// polarity is being explored, so backtracking never revisits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub lit: Literal,
    pub decision: bool,
    pub flipped: bool,
}

/// The assignment stack with the propagation queue head.
///
/// Literals between `qhead` and the top are assigned but not yet
/// propagated.
#[derive(Debug, Clone, Default)]
pub struct Trail {
    steps: Vec<Step>,
    qhead: usize,
}

impl Trail {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_decision(&mut self, lit: Literal, flipped: bool) {
        self.steps.push(Step {
            lit,
            decision: true,
            flipped,
        });
    }

    pub fn push_propagated(&mut self, lit: Literal) {
        self.steps.push(Step {
            lit,
            decision: false,
            flipped: false,
        });
    }

    /// The next literal to propagate, advancing the queue head.
    pub fn next_unpropagated(&mut self) -> Option<Literal> {
        let step = self.steps.get(self.qhead)?;
        self.qhead += 1;
        Some(step.lit)
    }

    pub fn pop(&mut self) -> Option<Step> {
        let step = self.steps.pop();
        self.qhead = self.qhead.min(self.steps.len());
        step
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_propagation_queue() {
        let mut trail = Trail::new();
        trail.push_decision(Literal::positive(0), false);
        trail.push_propagated(Literal::negative(1));
        assert_eq!(trail.next_unpropagated(), Some(Literal::positive(0)));
        assert_eq!(trail.next_unpropagated(), Some(Literal::negative(1)));
        assert_eq!(trail.next_unpropagated(), None);
    }

    #[test]
    fn test_pop_clamps_qhead() {
        let mut trail = Trail::new();
        trail.push_decision(Literal::positive(0), false);
        assert_eq!(trail.next_unpropagated(), Some(Literal::positive(0)));
        let step = trail.pop().unwrap();
        assert!(step.decision);
        assert_eq!(trail.next_unpropagated(), None);
    }
}
