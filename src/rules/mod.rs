//! Rule modules: one per puzzle variant, plus the registry.
//!
//! A rule module is thin glue. It declares variables for the things the
//! variant asks the solver to fill in, asserts the variant's rules using
//! the constraint library, and reads the model back into a [`Solution`].
//! Everything combinatorially hard lives below this layer.

pub mod canal_view;
pub mod masyu;
pub mod nonogram;

use crate::puzzle::{Puzzle, Solution};
use std::time::Duration;

/// Solves one puzzle of the variant, or gives up within the budget.
pub type Rule = fn(&Puzzle, Option<Duration>) -> Option<Solution>;

/// A hand-checked instance with its unique answer, used in tests.
pub type Sample = fn() -> (Puzzle, Solution);

/// A registered puzzle variant.
#[derive(Debug)]
pub struct PuzzleType {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub rule: Rule,
    pub samples: &'static [Sample],
}

pub static PUZZLE_TYPES: &[PuzzleType] = &[
    PuzzleType {
        name: "Canal View",
        keywords: &["canal"],
        rule: canal_view::solve,
        samples: &[canal_view::sample],
    },
    PuzzleType {
        name: "Masyu",
        keywords: &["masyu", "pearl"],
        rule: masyu::solve,
        samples: &[masyu::sample],
    },
    PuzzleType {
        name: "Nonogram",
        keywords: &["nonogram", "picross", "hanjie"],
        rule: nonogram::solve,
        samples: &[nonogram::sample],
    },
];

/// Looks a variant up by name or keyword, case-insensitively.
#[must_use]
pub fn find_puzzle_type(name: &str) -> Option<&'static PuzzleType> {
    let needle = name.to_lowercase();
    PUZZLE_TYPES.iter().find(|puzzle_type| {
        puzzle_type.name.to_lowercase() == needle
            || puzzle_type.keywords.contains(&needle.as_str())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_name_and_keyword() {
        assert_eq!(find_puzzle_type("Masyu").map(|t| t.name), Some("Masyu"));
        assert_eq!(find_puzzle_type("pearl").map(|t| t.name), Some("Masyu"));
        assert_eq!(
            find_puzzle_type("canal view").map(|t| t.name),
            Some("Canal View")
        );
        assert!(find_puzzle_type("sudoku").is_none());
    }

    #[test]
    fn test_every_type_carries_a_sample() {
        for puzzle_type in PUZZLE_TYPES {
            assert!(!puzzle_type.samples.is_empty(), "{}", puzzle_type.name);
        }
    }
}
