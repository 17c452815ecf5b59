//! The bundled SAT backend.
//!
//! The modeling layer talks to this module through a narrow surface: build
//! a [`cnf::Cnf`], hand it to an [`engine::Engine`], get a
//! [`engine::Verdict`] back. Nothing above this module depends on how the
//! search works.

pub mod assignment;
pub mod clause;
pub mod cnf;
pub mod engine;
pub mod literal;
pub mod trail;
pub mod watch;
