//! The solve pipeline: compile, run on a worker thread, read back.
//!
//! Compilation happens on the caller's thread (the term arena is not
//! `Sync`); only the finished CNF and the decode table cross to the
//! worker. The caller gets a [`SolveTask`] handle it can wait on or
//! cancel.

use crate::context::{Arith, Bool, Context, Term, TermId};
use crate::encode::VarTable;
use crate::sat::cnf::Cnf;
use crate::sat::engine::{Engine, Verdict};
use log::debug;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Shared flag for interrupting a running solve from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn flag(&self) -> &AtomicBool {
        &self.0
    }
}

/// The result of a solve.
///
/// `Unsolvable` is a proof of unsatisfiability; `NotFound` means the
/// search ran out of budget or was cancelled. Callers that only care
/// whether a solution exists can use [`Outcome::no_solution`].
#[derive(Debug)]
pub enum Outcome {
    Solved(Model),
    Unsolvable,
    NotFound,
}

impl Outcome {
    #[must_use]
    pub fn no_solution(&self) -> bool {
        !matches!(self, Self::Solved(_))
    }

    #[must_use]
    pub fn solution(self) -> Option<Model> {
        match self {
            Self::Solved(model) => Some(model),
            _ => None,
        }
    }
}

/// A satisfying assignment for every declared variable, plus a term
/// evaluator over it.
#[derive(Debug, Clone)]
pub struct Model {
    ints: FxHashMap<u32, i64>,
    bools: FxHashMap<u32, bool>,
}

impl Model {
    /// The value of an integer term under this model.
    ///
    /// Works on any term built from declared variables, not only the
    /// variables themselves. Panics on a variable the model never saw.
    #[must_use]
    pub fn get(&self, ctx: &Context, arith: Arith) -> i64 {
        self.eval_int(ctx, arith.0)
    }

    /// The value of a boolean term under this model.
    #[must_use]
    pub fn get_bool(&self, ctx: &Context, formula: Bool) -> bool {
        self.eval_bool(ctx, formula.0)
    }

    fn eval_int(&self, ctx: &Context, id: TermId) -> i64 {
        match ctx.term(id) {
            Term::IntConst(value) => value,
            Term::IntVar(var) => *self
                .ints
                .get(&var)
                .unwrap_or_else(|| panic!("variable {var} not in model")),
            Term::Sum(args) => args.iter().map(|a| self.eval_int(ctx, *a)).sum(),
            Term::Ite(cond, then, els) => {
                if self.eval_bool(ctx, cond) {
                    self.eval_int(ctx, then)
                } else {
                    self.eval_int(ctx, els)
                }
            }
            Term::FromBool(inner) => i64::from(self.eval_bool(ctx, inner)),
            term => panic!("expected an integer term, found {term:?}"),
        }
    }

    fn eval_bool(&self, ctx: &Context, id: TermId) -> bool {
        match ctx.term(id) {
            Term::BoolConst(value) => value,
            Term::BoolVar(var) => *self
                .bools
                .get(&var)
                .unwrap_or_else(|| panic!("variable {var} not in model")),
            Term::Not(inner) => !self.eval_bool(ctx, inner),
            Term::And(args) => args.iter().all(|a| self.eval_bool(ctx, *a)),
            Term::Or(args) => args.iter().any(|a| self.eval_bool(ctx, *a)),
            Term::Implies(a, b) => !self.eval_bool(ctx, a) || self.eval_bool(ctx, b),
            Term::Iff(a, b) => self.eval_bool(ctx, a) == self.eval_bool(ctx, b),
            Term::Eq(x, y) => self.eval_int(ctx, x) == self.eval_int(ctx, y),
            Term::Lt(x, y) => self.eval_int(ctx, x) < self.eval_int(ctx, y),
            Term::Le(x, y) => self.eval_int(ctx, x) <= self.eval_int(ctx, y),
            term => panic!("expected a boolean term, found {term:?}"),
        }
    }
}

/// Handle to a solve running on a worker thread.
#[derive(Debug)]
pub struct SolveTask {
    handle: JoinHandle<Outcome>,
    token: CancelToken,
}

impl SolveTask {
    /// Requests cancellation; the engine notices on its next budget check
    /// and the pending [`Self::wait`] returns [`Outcome::NotFound`].
    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Blocks until the verdict.
    #[must_use]
    pub fn wait(self) -> Outcome {
        self.handle.join().expect("solver thread panicked")
    }
}

pub(crate) fn spawn(cnf: Cnf, table: VarTable, budget: Option<Duration>) -> SolveTask {
    let token = CancelToken::new();
    let deadline = budget.map(|b| Instant::now() + b);
    let worker_token = token.clone();
    let handle = thread::spawn(move || {
        let started = Instant::now();
        let verdict = Engine::new(cnf).solve(deadline, worker_token.flag());
        debug!("solve finished in {:?}", started.elapsed());
        match verdict {
            Verdict::Sat(values) => {
                let (ints, bools) = table.decode(&values);
                Outcome::Solved(Model { ints, bools })
            }
            Verdict::Unsat => Outcome::Unsolvable,
            Verdict::Interrupted => Outcome::NotFound,
        }
    });
    SolveTask { handle, token }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token_round_trip() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        token.clone().cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_model_evaluates_composite_terms() {
        let ctx = Context::new();
        let x = ctx.fresh_int(0, 5);
        let model = Model {
            ints: [(0, 3)].into_iter().collect(),
            bools: FxHashMap::default(),
        };
        assert_eq!(model.get(&ctx, x), 3);
        assert_eq!(model.get(&ctx, x.add(&ctx, 4)), 7);
        assert!(model.get_bool(&ctx, x.lt(&ctx, ctx.int(4))));
        assert!(!model.get_bool(&ctx, x.eq(&ctx, ctx.int(2))));
    }
}
