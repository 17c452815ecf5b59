//! The search loop: iterative DPLL with two watched literals per clause,
//! activity-guided branching, saved phases, and chronological backtracking
//! by flipping the deepest unflipped decision.
//!
//! The loop polls a deadline and an interrupt flag, so a caller can bound
//! the search by wall clock or cancel it from another thread.

use crate::sat::assignment::Assignment;
use crate::sat::cnf::Cnf;
use crate::sat::literal::{Literal, Variable};
use crate::sat::trail::Trail;
use crate::sat::watch::Watches;
use log::{debug, trace};
use ordered_float::OrderedFloat;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// The engine's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// A satisfying assignment, indexed by variable.
    Sat(Vec<bool>),
    Unsat,
    /// The deadline passed or the interrupt flag was raised.
    Interrupted,
}

const BUDGET_CHECK_INTERVAL: u64 = 512;
const ACTIVITY_RESCALE: f64 = 1e100;
const ACTIVITY_GROWTH: f64 = 1.05;
// One decision in this many is random, to escape activity plateaus.
const RANDOM_DECISION_ONE_IN: usize = 64;

#[derive(Debug)]
pub struct Engine {
    cnf: Cnf,
    assignment: Assignment,
    trail: Trail,
    watches: Watches,
    activity: Vec<f64>,
    bump: f64,
    saved_phase: Vec<bool>,
    rng: fastrand::Rng,
    conflicts: u64,
    steps: u64,
}

impl Engine {
    #[must_use]
    pub fn new(cnf: Cnf) -> Self {
        let num_vars = cnf.num_vars();
        Self {
            cnf,
            assignment: Assignment::new(num_vars),
            trail: Trail::new(),
            watches: Watches::new(num_vars),
            activity: vec![0.0; num_vars],
            bump: 1.0,
            saved_phase: vec![false; num_vars],
            rng: fastrand::Rng::with_seed(0x5eed),
            conflicts: 0,
            steps: 0,
        }
    }

    /// Runs the search until a verdict, the deadline, or an interrupt.
    pub fn solve(mut self, deadline: Option<Instant>, interrupt: &AtomicBool) -> Verdict {
        debug!(
            "engine start: {} vars, {} clauses",
            self.cnf.num_vars(),
            self.cnf.num_clauses()
        );
        if self.cnf.is_trivially_unsat() || !self.attach_clauses() {
            return Verdict::Unsat;
        }
        loop {
            self.steps += 1;
            if self.steps % BUDGET_CHECK_INTERVAL == 1 && out_of_budget(deadline, interrupt) {
                debug!("engine interrupted after {} conflicts", self.conflicts);
                return Verdict::Interrupted;
            }

            if let Some(conflict) = self.propagate() {
                self.conflicts += 1;
                if self.conflicts % 10_000 == 0 {
                    trace!("{} conflicts, trail depth {}", self.conflicts, self.trail.len());
                }
                self.bump_conflict(conflict);
                if !self.backtrack() {
                    debug!("unsat after {} conflicts", self.conflicts);
                    return Verdict::Unsat;
                }
            } else if let Some(lit) = self.decide() {
                self.assignment.assign(lit);
                self.trail.push_decision(lit, false);
            } else {
                debug!("sat after {} conflicts", self.conflicts);
                return Verdict::Sat(self.assignment.values());
            }
        }
    }

    /// Sets up watches and assigns root-level units. False on a root
    /// conflict.
    fn attach_clauses(&mut self) -> bool {
        for i in 0..self.cnf.num_clauses() {
            let clause = &self.cnf[i];
            if clause.len() >= 2 {
                self.watches.watch(clause[0], i);
                self.watches.watch(clause[1], i);
            } else if clause.is_unit() {
                let lit = clause[0];
                match self.assignment.literal_value(lit) {
                    Some(true) => {}
                    Some(false) => return false,
                    None => {
                        self.assignment.assign(lit);
                        self.trail.push_propagated(lit);
                    }
                }
            }
        }
        true
    }

    /// Exhausts the propagation queue. Returns a falsified clause index on
    /// conflict.
    fn propagate(&mut self) -> Option<usize> {
        while let Some(lit) = self.trail.next_unpropagated() {
            let false_lit = lit.negated();
            let watchers = self.watches.take(false_lit);
            for (i, &ci) in watchers.iter().enumerate() {
                let clause = &mut self.cnf.clauses_mut()[ci];
                if clause[0] == false_lit {
                    clause.swap(0, 1);
                }
                debug_assert_eq!(clause[1], false_lit);

                let first = clause[0];
                if self.assignment.literal_value(first) == Some(true) {
                    self.watches.watch(false_lit, ci);
                    continue;
                }

                let replacement = (2..clause.len())
                    .find(|&k| self.assignment.literal_value(clause[k]) != Some(false));
                if let Some(k) = replacement {
                    clause.swap(1, k);
                    let new_watch = clause[1];
                    self.watches.watch(new_watch, ci);
                    continue;
                }

                self.watches.watch(false_lit, ci);
                match self.assignment.literal_value(first) {
                    None => {
                        self.assignment.assign(first);
                        self.trail.push_propagated(first);
                    }
                    Some(false) => {
                        // Conflict: the untouched tail keeps its watches.
                        for &cj in &watchers[i + 1..] {
                            self.watches.watch(false_lit, cj);
                        }
                        return Some(ci);
                    }
                    Some(true) => unreachable!("satisfied clause handled above"),
                }
            }
        }
        None
    }

    fn bump_conflict(&mut self, conflict: usize) {
        for lit in self.cnf[conflict].iter() {
            self.activity[lit.variable() as usize] += self.bump;
        }
        self.bump *= ACTIVITY_GROWTH;
        if self.bump > ACTIVITY_RESCALE {
            for a in &mut self.activity {
                *a /= ACTIVITY_RESCALE;
            }
            self.bump /= ACTIVITY_RESCALE;
        }
    }

    /// Unwinds to the deepest unflipped decision and flips it. False when
    /// no such decision remains.
    fn backtrack(&mut self) -> bool {
        while let Some(step) = self.trail.pop() {
            let var = step.lit.variable();
            self.saved_phase[var as usize] = step.lit.polarity();
            self.assignment.unassign(var);
            if step.decision && !step.flipped {
                let flipped = step.lit.negated();
                self.assignment.assign(flipped);
                self.trail.push_decision(flipped, true);
                return true;
            }
        }
        false
    }

    /// Picks the next branching literal, or `None` when fully assigned.
    fn decide(&mut self) -> Option<Literal> {
        let num_vars = self.cnf.num_vars();
        let var = if self.rng.usize(0..RANDOM_DECISION_ONE_IN) == 0 {
            let unassigned: Vec<Variable> = (0..num_vars as Variable)
                .filter(|v| self.assignment.var_value(*v).is_none())
                .collect();
            if unassigned.is_empty() {
                return None;
            }
            unassigned[self.rng.usize(0..unassigned.len())]
        } else {
            (0..num_vars as Variable)
                .filter(|v| self.assignment.var_value(*v).is_none())
                .max_by_key(|v| OrderedFloat(self.activity[*v as usize]))?
        };
        Some(Literal::new(var, self.saved_phase[var as usize]))
    }
}

fn out_of_budget(deadline: Option<Instant>, interrupt: &AtomicBool) -> bool {
    interrupt.load(Ordering::Relaxed) || deadline.is_some_and(|d| Instant::now() >= d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    fn solve(cnf: Cnf) -> Verdict {
        Engine::new(cnf).solve(None, &AtomicBool::new(false))
    }

    fn clause(cnf: &mut Cnf, lits: &[i32]) {
        cnf.add_clause(lits.iter().map(|&l| {
            let var = (l.unsigned_abs() - 1) as Variable;
            Literal::new(var, l > 0)
        }));
    }

    #[test]
    fn test_empty_formula_is_sat() {
        assert_eq!(solve(Cnf::new()), Verdict::Sat(Vec::new()));
    }

    #[test]
    fn test_unit_propagation_chain() {
        let mut cnf = Cnf::new();
        for _ in 0..3 {
            cnf.new_var();
        }
        clause(&mut cnf, &[1]);
        clause(&mut cnf, &[-1, 2]);
        clause(&mut cnf, &[-2, 3]);
        match solve(cnf) {
            Verdict::Sat(model) => assert_eq!(model, vec![true, true, true]),
            other => panic!("expected sat, got {other:?}"),
        }
    }

    #[test]
    fn test_contradictory_units_are_unsat() {
        let mut cnf = Cnf::new();
        cnf.new_var();
        clause(&mut cnf, &[1]);
        clause(&mut cnf, &[-1]);
        assert_eq!(solve(cnf), Verdict::Unsat);
    }

    #[test]
    fn test_requires_backtracking() {
        // (a | b) & (a | !b) & (!a | b) is sat only at a=b=true.
        let mut cnf = Cnf::new();
        for _ in 0..2 {
            cnf.new_var();
        }
        clause(&mut cnf, &[1, 2]);
        clause(&mut cnf, &[1, -2]);
        clause(&mut cnf, &[-1, 2]);
        match solve(cnf) {
            Verdict::Sat(model) => assert_eq!(model, vec![true, true]),
            other => panic!("expected sat, got {other:?}"),
        }
    }

    #[test]
    fn test_full_exhaustion_is_unsat() {
        // All four clauses over two variables.
        let mut cnf = Cnf::new();
        for _ in 0..2 {
            cnf.new_var();
        }
        clause(&mut cnf, &[1, 2]);
        clause(&mut cnf, &[1, -2]);
        clause(&mut cnf, &[-1, 2]);
        clause(&mut cnf, &[-1, -2]);
        assert_eq!(solve(cnf), Verdict::Unsat);
    }

    #[test]
    fn test_interrupt_flag_stops_search() {
        let mut cnf = Cnf::new();
        for _ in 0..20 {
            cnf.new_var();
        }
        // Hard random-ish instance is unnecessary; a raised flag stops
        // the loop on its first budget check regardless.
        for v in 0..19 {
            clause(&mut cnf, &[v + 1, v + 2]);
            clause(&mut cnf, &[-(v + 1), -(v + 2)]);
        }
        let flag = AtomicBool::new(true);
        let deadline = Some(Instant::now() + Duration::from_secs(60));
        assert_eq!(
            Engine::new(cnf).solve(deadline, &flag),
            Verdict::Interrupted
        );
    }
}
