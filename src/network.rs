//! Direction-set tables for line and loop puzzles.
//!
//! A network fixes, per cell, which sets of edge directions are allowed:
//! a loop needs zero or two, a path at most two, a free network anything.
//! Each cell then gets one integer variable indexing its allowed set, and
//! the predicates here translate questions about the cell ("does it go
//! east", "is it a straight segment") into formulas over that index.

use crate::context::{Arith, Bool, Context};
use crate::geometry::{Lattice, Vector};
use std::rc::Rc;

/// Which direction sets a cell may take.
pub trait Network {
    fn is_valid(&self, directions: &[Vector]) -> bool;

    /// All allowed subsets of the lattice's edge directions, sorted within
    /// each set. The empty set, when allowed, is always index 0.
    fn direction_sets(&self, lattice: &dyn Lattice) -> Vec<Vec<Vector>> {
        let directions = lattice.edge_sharing_directions();
        let mut sets = Vec::new();
        for mask in 0u32..1 << directions.len() {
            let set: Vec<Vector> = directions
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, v)| *v)
                .collect();
            if self.is_valid(&set) {
                sets.push(set);
            }
        }
        sets
    }
}

/// Any combination of directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullNetwork;

impl Network for FullNetwork {
    fn is_valid(&self, _directions: &[Vector]) -> bool {
        true
    }
}

/// Every cell is empty or passed through exactly once.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopNetwork;

impl Network for LoopNetwork {
    fn is_valid(&self, directions: &[Vector]) -> bool {
        matches!(directions.len(), 0 | 2)
    }
}

/// Paths with free ends: degree at most two.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathNetwork;

impl Network for PathNetwork {
    fn is_valid(&self, directions: &[Vector]) -> bool {
        directions.len() <= 2
    }
}

/// One cell of a network grid: an index into a shared direction-set table.
#[derive(Debug, Clone)]
pub struct NetworkVar {
    arith: Arith,
    sets: Rc<Vec<Vec<Vector>>>,
}

impl NetworkVar {
    pub(crate) fn new(arith: Arith, sets: Rc<Vec<Vec<Vector>>>) -> Self {
        Self { arith, sets }
    }

    #[must_use]
    pub fn arith(&self) -> Arith {
        self.arith
    }

    /// The table index of the given direction set.
    ///
    /// Panics when the set is not allowed by the network; asking for it is
    /// a mistake in the rule module.
    #[must_use]
    pub fn index_of(&self, directions: &[Vector]) -> i64 {
        let mut sorted = directions.to_vec();
        sorted.sort_unstable();
        let index = self
            .sets
            .iter()
            .position(|set| *set == sorted)
            .unwrap_or_else(|| panic!("direction set {sorted:?} not allowed by this network"));
        index as i64
    }

    /// The direction set at a table index, for reading a model back.
    #[must_use]
    pub fn directions(&self, index: i64) -> &[Vector] {
        &self.sets[usize::try_from(index).expect("index into the direction-set table")]
    }

    fn any_matching(&self, ctx: &Context, pred: impl Fn(&[Vector]) -> bool) -> Bool {
        let arms = self
            .sets
            .iter()
            .enumerate()
            .filter(|(_, set)| pred(set))
            .map(|(i, _)| self.arith.eq(ctx, ctx.int(i as i64)));
        ctx.or(arms.collect::<Vec<_>>())
    }

    /// The cell connects toward `v`.
    #[must_use]
    pub fn has_direction(&self, ctx: &Context, v: Vector) -> Bool {
        self.any_matching(ctx, |set| set.contains(&v))
    }

    /// The cell takes exactly the given direction set.
    #[must_use]
    pub fn is(&self, ctx: &Context, directions: &[Vector]) -> Bool {
        self.arith.eq(ctx, ctx.int(self.index_of(directions)))
    }

    /// The cell has no directions at all.
    #[must_use]
    pub fn is_empty(&self, ctx: &Context) -> Bool {
        self.any_matching(ctx, |set| set.is_empty())
    }

    /// The cell is passed through: exactly two directions.
    #[must_use]
    pub fn is_loop_segment(&self, ctx: &Context) -> Bool {
        self.any_matching(ctx, |set| set.len() == 2)
    }

    /// The cell's directions come in opposite pairs. The empty set counts
    /// as straight; combine with [`Self::is_loop_segment`] to exclude it.
    #[must_use]
    pub fn is_straight(&self, ctx: &Context) -> Bool {
        self.any_matching(ctx, |set| {
            set.iter().all(|v| set.contains(&v.negate()))
        })
    }

    /// The cell is a path end: exactly one direction.
    #[must_use]
    pub fn is_terminal(&self, ctx: &Context) -> Bool {
        self.any_matching(ctx, |set| set.len() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SquareLattice;

    #[test]
    fn test_loop_network_sets_on_square_grid() {
        let sets = LoopNetwork.direction_sets(&SquareLattice);
        // The empty set plus the six pairs of four directions.
        assert_eq!(sets.len(), 7);
        assert!(sets[0].is_empty());
        assert!(sets[1..].iter().all(|s| s.len() == 2));
    }

    #[test]
    fn test_path_network_allows_terminals() {
        let sets = PathNetwork.direction_sets(&SquareLattice);
        // Empty, four singles, six pairs.
        assert_eq!(sets.len(), 11);
    }

    #[test]
    fn test_full_network_is_the_power_set() {
        assert_eq!(FullNetwork.direction_sets(&SquareLattice).len(), 16);
    }

    #[test]
    fn test_straight_sets_are_negation_closed() {
        let sets = LoopNetwork.direction_sets(&SquareLattice);
        let straight: Vec<&Vec<Vector>> = sets
            .iter()
            .filter(|s| s.iter().all(|v| s.contains(&v.negate())))
            .collect();
        // Empty, east-west, north-south.
        assert_eq!(straight.len(), 3);
    }
}
