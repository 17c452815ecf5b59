//! Variable declaration and the library of reusable puzzle constraints.
//!
//! A [`Constraints`] accumulates declared variables and asserted formulas
//! against a [`Context`], then compiles and solves the whole batch. The
//! generator methods encode the combinatorial patterns that recur across
//! puzzle rules: connectivity, loops and paths, contiguous areas,
//! block-run sums along a line, and sight-line counts.
//!
//! Connectivity is encoded with spanning-tree ranks: every selected cell
//! either is a designated root or has a selected neighbor with a strictly
//! smaller rank. A cycle cannot satisfy that, and a second component has
//! no root to bottom out at, so exactly the connected selections survive.

use crate::collections::{ValueMap, ValueSet};
use crate::context::{Arith, Bool, Context};
use crate::encode::Encoder;
use crate::geometry::{Bearing, Point, PointSet};
use crate::network::{LoopNetwork, Network, NetworkVar, PathNetwork};
use crate::solve::{self, Model, Outcome, SolveTask};
use core::cell::RefCell;
use core::fmt::Debug;
use std::rc::Rc;
use std::time::Duration;

/// A variable ranging over a candidate list, or over none of them (-1).
#[derive(Debug, Clone)]
pub struct Choice<V> {
    arith: Arith,
    values: Vec<V>,
}

impl<V: PartialEq + Debug> Choice<V> {
    #[must_use]
    pub fn arith(&self) -> Arith {
        self.arith
    }

    /// The formula selecting `value`.
    ///
    /// Panics when `value` is not a candidate; asking for it is a mistake
    /// in the rule module.
    #[must_use]
    pub fn is(&self, ctx: &Context, value: &V) -> Bool {
        let index = self
            .values
            .iter()
            .position(|v| v == value)
            .unwrap_or_else(|| panic!("{value:?} is not a candidate of this choice"));
        self.arith.eq(ctx, ctx.int(index as i64))
    }

    /// The formula selecting no candidate at all.
    #[must_use]
    pub fn is_none(&self, ctx: &Context) -> Bool {
        self.arith.eq(ctx, ctx.int(-1))
    }

    /// Reads the selected candidate back from a model.
    #[must_use]
    pub fn value<'a>(&'a self, ctx: &Context, model: &Model) -> Option<&'a V> {
        let index = model.get(ctx, self.arith);
        if index < 0 {
            None
        } else {
            Some(&self.values[index as usize])
        }
    }
}

/// A clue for one block in [`Constraints::add_contiguous_block_sums`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockSum {
    /// A block whose cell values add up to exactly this.
    Sum(i64),
    /// One block of any sum.
    Any,
    /// Any number of blocks, of any sums.
    Wild,
}

#[derive(Debug, Default)]
struct Accumulated {
    declared_bools: Vec<Bool>,
    declared_ints: Vec<Arith>,
    asserted: Vec<Bool>,
}

/// The write-only accumulator of a puzzle's formulation.
#[derive(Debug)]
pub struct Constraints<'ctx> {
    ctx: &'ctx Context,
    acc: RefCell<Accumulated>,
}

impl<'ctx> Constraints<'ctx> {
    #[must_use]
    pub fn new(ctx: &'ctx Context) -> Self {
        Self {
            ctx,
            acc: RefCell::new(Accumulated::default()),
        }
    }

    #[must_use]
    pub fn ctx(&self) -> &'ctx Context {
        self.ctx
    }

    /// Declares an integer variable with inclusive bounds.
    pub fn int(&self, lo: i64, hi: i64) -> Arith {
        let arith = self.ctx.fresh_int(lo, hi);
        self.acc.borrow_mut().declared_ints.push(arith);
        arith
    }

    /// Declares a boolean variable.
    pub fn bool_var(&self) -> Bool {
        let b = self.ctx.fresh_bool();
        self.acc.borrow_mut().declared_bools.push(b);
        b
    }

    /// Declares a variable over the given candidates, or none (-1).
    pub fn choice<V: PartialEq + Debug>(
        &self,
        values: impl IntoIterator<Item = V>,
    ) -> Choice<V> {
        let values: Vec<V> = values.into_iter().collect();
        let arith = self.int(-1, values.len() as i64 - 1);
        Choice { arith, values }
    }

    /// A choice over text labels.
    pub fn labels(
        &self,
        labels: impl IntoIterator<Item = String>,
    ) -> Choice<String> {
        self.choice(labels)
    }

    /// Asserts a formula.
    pub fn add(&self, formula: Bool) {
        self.acc.borrow_mut().asserted.push(formula);
    }

    /// All `good` cells form one orthogonally connected component.
    ///
    /// Vacuously satisfied when nothing is good.
    pub fn add_all_connected(&self, points: &PointSet, good: impl Fn(Point) -> Bool) {
        if points.is_empty() {
            return;
        }
        let ctx = self.ctx;
        let n = points.len() as i64;
        let tree = ValueMap::from_keys(points.iter(), |_| self.int(0, n - 1));
        let root = self.choice(points.iter());
        for p in points.iter() {
            let mut arms = vec![ctx.not(good(p)), root.is(ctx, &p)];
            for q in points.edge_sharing_points(p) {
                arms.push(ctx.and([good(q), tree[&q].lt(ctx, tree[&p])]));
            }
            self.add(ctx.or(arms));
        }
    }

    /// Every cell connects along `is_edge` edges to a cell where `is_root`
    /// holds. Returns, per cell, the choice of which root's component the
    /// cell belongs to.
    pub fn add_connected(
        &self,
        points: &PointSet,
        is_root: impl Fn(Point) -> Bool,
        is_edge: impl Fn(Point, Point) -> Bool,
    ) -> ValueMap<Point, Choice<Point>> {
        if points.is_empty() {
            return ValueMap::new();
        }
        let ctx = self.ctx;
        let n = points.len() as i64;
        let instance = ValueMap::from_keys(points.iter(), |_| self.choice(points.iter()));
        let tree = ValueMap::from_keys(points.iter(), |_| self.int(0, n - 1));
        for p in points.iter() {
            let reach = ctx.or(
                points
                    .edge_sharing_points(p)
                    .into_iter()
                    .map(|q| ctx.and([is_edge(p, q), tree[&q].lt(ctx, tree[&p])]))
                    .collect::<Vec<_>>(),
            );
            self.add(ctx.ite_bool(is_root(p), instance[&p].is(ctx, &p), reach));
            for q in points.edge_sharing_points(p) {
                self.add(ctx.implies(
                    is_edge(p, q),
                    instance[&p].arith().eq(ctx, instance[&q].arith()),
                ));
            }
        }
        instance
    }

    /// The contiguous `good` region containing `start` has exactly `area`
    /// cells. Encoded as `area` rounds of flood-fill unrolling followed by
    /// a cardinality assertion.
    pub fn add_contiguous_area(
        &self,
        points: &PointSet,
        start: Point,
        good: impl Fn(Point) -> Bool,
        area: i64,
    ) {
        let ctx = self.ctx;
        let mut flood = ValueMap::from_keys(points.iter(), |p| {
            if *p == start {
                good(*p)
            } else {
                ctx.bool_const(false)
            }
        });
        for _ in 0..area {
            let prev = flood;
            flood = ValueMap::from_keys(points.iter(), |p| {
                let mut arms = vec![prev[p]];
                for q in points.edge_sharing_points(*p) {
                    arms.push(ctx.and([good(*p), prev[&q]]));
                }
                ctx.or(arms)
            });
        }
        self.add(
            ctx.sum_bools(flood.values().copied())
                .eq(ctx, ctx.int(area)),
        );
    }

    /// The nonzero runs of `line`, in order, match the block clues.
    ///
    /// A dynamic program walks the line with a running block counter:
    /// at each position either no block ends, or a block of some size ends
    /// and the counter advances when its sum matches the next clue.
    /// [`BlockSum::Wild`] absorbs any run of blocks at its position.
    ///
    /// An empty clue list forces the whole line to zero.
    pub fn add_contiguous_block_sums(&self, line: &[Arith], sums: &[BlockSum]) {
        let ctx = self.ctx;
        let zero = ctx.int(0);
        if sums.is_empty() {
            for cell in line {
                self.add((*cell).eq(ctx, zero));
            }
            return;
        }
        let padded: Vec<Arith> = core::iter::once(zero)
            .chain(line.iter().copied())
            .chain(core::iter::once(zero))
            .collect();
        let num_blocks: Vec<Arith> = padded
            .iter()
            .map(|_| self.int(0, sums.len() as i64))
            .collect();
        for i in 1..padded.len() {
            // Either no block ends here...
            let mut choices = vec![ctx.and([
                num_blocks[i].eq(ctx, num_blocks[i - 1]),
                ctx.or([padded[i - 1].eq(ctx, zero), padded[i].ne(ctx, zero)]),
            ])];
            for (block_num, sum) in sums.iter().enumerate() {
                if *sum == BlockSum::Wild {
                    // ...or we sit inside a wildcard region...
                    let inside = ctx.int(block_num as i64 + 1);
                    choices.push(ctx.and([
                        num_blocks[i].eq(ctx, inside),
                        num_blocks[i - 1].eq(ctx, inside),
                    ]));
                    continue;
                }
                // ...or a block of some size ends just before position i.
                let skip = usize::from(sums.get(block_num + 1) == Some(&BlockSum::Wild));
                let next_block_num = block_num + 1 + skip;
                for block_size in 1..i {
                    let block = &padded[i - block_size..i];
                    let mut parts = vec![
                        num_blocks[i].eq(ctx, ctx.int(next_block_num as i64)),
                        num_blocks[i - block_size].eq(ctx, ctx.int(block_num as i64)),
                        padded[i].eq(ctx, zero),
                        padded[i - block_size - 1].eq(ctx, zero),
                    ];
                    parts.extend(block.iter().map(|cell| (*cell).ne(ctx, zero)));
                    if let BlockSum::Sum(s) = sum {
                        parts.push(ctx.sum(block.iter().copied()).eq(ctx, ctx.int(*s)));
                    }
                    choices.push(ctx.and(parts));
                }
            }
            self.add(ctx.or(choices));
        }
        let first = i64::from(sums[0] == BlockSum::Wild);
        self.add(num_blocks[0].eq(ctx, ctx.int(first)));
        self.add(
            num_blocks[num_blocks.len() - 1].eq(ctx, ctx.int(sums.len() as i64)),
        );
    }

    /// Exactly `count` cells are visible from `start`: the start itself
    /// plus every cell reachable along a straight line of `good` cells.
    pub fn add_sight_line_count(
        &self,
        points: &PointSet,
        start: Point,
        good: impl Fn(Point, Option<Bearing>) -> Bool,
        count: i64,
    ) {
        let ctx = self.ctx;
        let mut seen = ValueSet::new();
        seen.insert(start);
        let mut visible = vec![good(start, None)];
        for bearing in points.lattice().bearings() {
            let line = points.line_from(start, bearing, |_| true);
            for i in 1..line.len() {
                if seen.insert(line[i]) {
                    visible.push(ctx.and(
                        line[..=i]
                            .iter()
                            .map(|p| good(*p, Some(bearing)))
                            .collect::<Vec<_>>(),
                    ));
                }
            }
        }
        self.add(ctx.sum_bools(visible).eq(ctx, ctx.int(count)));
    }

    /// One direction-set variable per cell, with neighbors kept mutually
    /// consistent: a cell goes east iff its east neighbor goes west, and
    /// never toward a missing neighbor.
    pub fn network_grid(
        &self,
        points: &PointSet,
        network: &dyn Network,
    ) -> ValueMap<Point, NetworkVar> {
        let ctx = self.ctx;
        let sets = Rc::new(network.direction_sets(points.lattice().as_ref()));
        let grid = ValueMap::from_keys(points.iter(), |_| {
            NetworkVar::new(self.int(0, sets.len() as i64 - 1), Rc::clone(&sets))
        });
        for (p, var) in &grid {
            for v in points.lattice().edge_sharing_directions() {
                let q = p.translate(v);
                match grid.get(&q) {
                    Some(neighbor) => self.add(ctx.implies(
                        var.has_direction(ctx, v),
                        neighbor.has_direction(ctx, v.negate()),
                    )),
                    None => self.add(ctx.not(var.has_direction(ctx, v))),
                }
            }
        }
        grid
    }

    /// A network of non-intersecting paths, with a position index along
    /// each path: -1 off the paths, else 0, 1, 2, ... from one end.
    pub fn paths_grid(
        &self,
        points: &PointSet,
    ) -> (ValueMap<Point, NetworkVar>, ValueMap<Point, Arith>) {
        let ctx = self.ctx;
        let n = points.len() as i64;
        let grid = self.network_grid(points, &PathNetwork);
        let order = ValueMap::from_keys(points.iter(), |_| self.int(-1, n - 1));
        for (p, var) in &grid {
            let has_neighbor = |delta: i64| {
                let arms: Vec<Bool> = points
                    .edge_sharing_neighbors(*p)
                    .into_iter()
                    .map(|(q, v)| {
                        ctx.and([
                            var.has_direction(ctx, v),
                            order[&q].eq(ctx, order[p].add(ctx, delta)),
                        ])
                    })
                    .collect();
                ctx.or(arms)
            };
            self.add(ctx.implies(
                var.is_loop_segment(ctx),
                ctx.and([has_neighbor(-1), has_neighbor(1)]),
            ));
            self.add(ctx.implies(
                var.is_terminal(ctx),
                ctx.ite_bool(
                    order[p].eq(ctx, ctx.int(0)),
                    has_neighbor(1),
                    has_neighbor(-1),
                ),
            ));
            self.add(ctx.implies(var.is_empty(ctx), order[p].eq(ctx, ctx.int(-1))));
        }
        (grid, order)
    }

    /// A network forming a single connected loop (or nothing at all).
    /// Returns the grid and the choice of an arbitrary cell on the loop.
    pub fn single_loop_grid(
        &self,
        points: &PointSet,
    ) -> (ValueMap<Point, NetworkVar>, Choice<Point>) {
        let ctx = self.ctx;
        let grid = self.network_grid(points, &LoopNetwork);
        let root = self.choice(points.iter());
        self.add_connected(
            points,
            |p| ctx.or([grid[&p].is_empty(ctx), root.is(ctx, &p)]),
            |p, q| grid[&p].has_direction(ctx, p.direction_to(q)),
        );
        (grid, root)
    }

    /// Rules out the model: at least one of `vars` must take a different
    /// value. Used to ask for another solution.
    pub fn exclude(&self, model: &Model, vars: impl IntoIterator<Item = Arith>) {
        let ctx = self.ctx;
        let arms: Vec<Bool> = vars
            .into_iter()
            .map(|a| a.ne(ctx, ctx.int(model.get(ctx, a))))
            .collect();
        self.add(ctx.or(arms));
    }

    /// Compiles everything asserted so far and starts a solve on a worker
    /// thread.
    #[must_use]
    pub fn solve(&self, budget: Option<Duration>) -> SolveTask {
        let mut encoder = Encoder::new(self.ctx);
        let acc = self.acc.borrow();
        for b in &acc.declared_bools {
            encoder.declare(b.0);
        }
        for a in &acc.declared_ints {
            encoder.declare(a.0);
        }
        for formula in &acc.asserted {
            encoder.assert(*formula);
        }
        let (cnf, table) = encoder.finish();
        solve::spawn(cnf, table, budget)
    }

    /// Convenience: solve and wait.
    #[must_use]
    pub fn solve_blocking(&self, budget: Option<Duration>) -> Outcome {
        self.solve(budget).wait()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_is_and_read_back() {
        let ctx = Context::new();
        let cs = Constraints::new(&ctx);
        let choice = cs.choice(["a", "b", "c"]);
        cs.add(choice.is(&ctx, &"b"));
        let model = cs.solve_blocking(None).solution().expect("sat");
        assert_eq!(choice.value(&ctx, &model), Some(&"b"));
    }

    #[test]
    fn test_choice_none() {
        let ctx = Context::new();
        let cs = Constraints::new(&ctx);
        let choice = cs.choice(["a", "b"]);
        cs.add(choice.is_none(&ctx));
        let model = cs.solve_blocking(None).solution().expect("sat");
        assert_eq!(choice.value(&ctx, &model), None);
    }

    #[test]
    #[should_panic(expected = "not a candidate")]
    fn test_choice_rejects_unknown_value() {
        let ctx = Context::new();
        let cs = Constraints::new(&ctx);
        let choice = cs.choice(["a", "b"]);
        let _ = choice.is(&ctx, &"z");
    }

    #[test]
    fn test_empty_block_sums_clear_the_line() {
        let ctx = Context::new();
        let cs = Constraints::new(&ctx);
        let line: Vec<Arith> = (0..4).map(|_| cs.int(0, 1)).collect();
        cs.add_contiguous_block_sums(&line, &[]);
        let model = cs.solve_blocking(None).solution().expect("sat");
        for cell in &line {
            assert_eq!(model.get(&ctx, *cell), 0);
        }
    }

    #[test]
    fn test_block_sums_place_two_blocks() {
        let ctx = Context::new();
        let cs = Constraints::new(&ctx);
        let line: Vec<Arith> = (0..5).map(|_| cs.int(0, 1)).collect();
        cs.add_contiguous_block_sums(&line, &[BlockSum::Sum(2), BlockSum::Sum(2)]);
        let model = cs.solve_blocking(None).solution().expect("sat");
        let values: Vec<i64> = line.iter().map(|c| model.get(&ctx, *c)).collect();
        assert_eq!(values, vec![1, 1, 0, 1, 1]);
    }

    #[test]
    fn test_block_sums_infeasible_clue() {
        let ctx = Context::new();
        let cs = Constraints::new(&ctx);
        let line: Vec<Arith> = (0..3).map(|_| cs.int(0, 1)).collect();
        cs.add_contiguous_block_sums(&line, &[BlockSum::Sum(2), BlockSum::Sum(2)]);
        assert!(cs.solve_blocking(None).no_solution());
    }

    #[test]
    fn test_contiguous_area_exact_size() {
        let ctx = Context::new();
        let cs = Constraints::new(&ctx);
        let points = PointSet::square(2, 2);
        let shaded = ValueMap::from_keys(points.iter(), |_| cs.bool_var());
        cs.add_contiguous_area(&points, Point::new(0, 0), |p| shaded[&p], 3);
        let model = cs.solve_blocking(None).solution().expect("sat");
        let count = points
            .iter()
            .filter(|p| model.get_bool(&ctx, shaded[p]))
            .count();
        assert_eq!(count, 3);
        assert!(model.get_bool(&ctx, shaded[&Point::new(0, 0)]));
    }
}
