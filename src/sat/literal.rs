use core::ops::Not;

pub type Variable = u32;

/// A literal packed into one word: variable in the high bits, polarity in
/// the low bit. `code` doubles as the index into per-literal tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Literal(u32);

impl Literal {
    #[must_use]
    pub const fn new(var: Variable, polarity: bool) -> Self {
        Self((var << 1) | polarity as u32)
    }

    #[must_use]
    pub const fn positive(var: Variable) -> Self {
        Self::new(var, true)
    }

    #[must_use]
    pub const fn negative(var: Variable) -> Self {
        Self::new(var, false)
    }

    #[must_use]
    pub const fn variable(self) -> Variable {
        self.0 >> 1
    }

    /// True for the positive literal.
    #[must_use]
    pub const fn polarity(self) -> bool {
        self.0 & 1 != 0
    }

    #[must_use]
    pub const fn negated(self) -> Self {
        Self(self.0 ^ 1)
    }

    /// Dense index for watch lists and other per-literal tables.
    #[must_use]
    pub const fn code(self) -> usize {
        self.0 as usize
    }
}

impl Not for Literal {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.negated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let lit = Literal::new(7, true);
        assert_eq!(lit.variable(), 7);
        assert!(lit.polarity());
        assert_eq!(lit.negated(), Literal::new(7, false));
        assert_eq!(lit.negated().negated(), lit);
    }

    #[test]
    fn test_codes_are_dense() {
        assert_eq!(Literal::negative(0).code(), 0);
        assert_eq!(Literal::positive(0).code(), 1);
        assert_eq!(Literal::negative(1).code(), 2);
        assert_eq!(Literal::positive(1).code(), 3);
    }
}
