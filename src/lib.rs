//! This crate solves grid logic puzzles (Nonogram, Masyu, Canal View and
//! friends) by compiling their rules into Boolean satisfiability and
//! running a bundled SAT engine.
//!
//! The layers, bottom up: [`sat`] is the engine, [`context`] the symbolic
//! formula arena, [`constraints`] the library of reusable puzzle
//! constraints, and [`rules`] the per-variant glue reading a
//! [`puzzle::Puzzle`] and producing a [`puzzle::Solution`].

/// Ordered containers and a union-find, keyed by structural equality.
pub mod collections;

/// Variable declaration, the constraint library and the solve entry point.
pub mod constraints;

/// The hash-consed term arena and formula builders.
pub mod context;

mod encode;

/// Points, lattices, point sets and their derived structure.
pub mod geometry;

/// Direction-set tables for line and loop puzzles.
pub mod network;

/// The puzzle and solution records, and the clue symbol type.
pub mod puzzle;

/// One module per puzzle variant, plus the variant registry.
pub mod rules;

/// The SAT engine: clauses, watched literals and the DPLL search.
pub mod sat;

/// Running a compiled problem on a worker thread and reading models back.
pub mod solve;
