//! Nonogram: shade cells so that the runs of consecutive shaded cells in
//! every row and column match the number clues written outside the grid.

use crate::collections::ValueMap;
use crate::constraints::{BlockSum, Constraints};
use crate::context::{Arith, Context};
use crate::geometry::{Point, PointSet};
use crate::puzzle::{Puzzle, Solution};
use std::rc::Rc;
use std::time::Duration;

pub fn solve(puzzle: &Puzzle, budget: Option<Duration>) -> Option<Solution> {
    let ctx = Context::new();
    let cs = Constraints::new(&ctx);

    // Shade some cells on the board according to the numbers
    let grid = ValueMap::from_keys(puzzle.points.iter(), |_| cs.int(0, 1));

    // Clues outside the grid represent the lengths of each of the blocks of
    // consecutive shaded cells in the corresponding row or column, in order
    // from left to right or top to bottom
    let texts = PointSet::new(
        Rc::clone(puzzle.points.lattice()),
        puzzle.texts.keys().copied(),
    );
    for (line, before, bearing) in puzzle.points.lines() {
        let clues: Vec<BlockSum> = texts
            .line_from(before, bearing.negate(), |_| true)
            .iter()
            .rev()
            .map(|p| BlockSum::Sum(puzzle.texts[p].parse().expect("numeric clue")))
            .collect();
        if clues.is_empty() {
            continue;
        }
        let cells: Vec<Arith> = line.iter().map(|p| grid[p]).collect();
        cs.add_contiguous_block_sums(&cells, &clues);
    }

    let model = cs.solve_blocking(budget).solution()?;

    // Fill in solved shaded cells
    let mut solution = Solution::new();
    for (p, arith) in &grid {
        if model.get(&ctx, *arith) != 0 {
            solution.shaded.insert(*p);
        }
    }
    Some(solution)
}

/// A 4 by 4 instance: full top and bottom rows, columns of two single
/// cells each.
#[must_use]
pub fn sample() -> (Puzzle, Solution) {
    let mut puzzle = Puzzle::rectangle(4, 4);
    puzzle.texts.insert(Point::new(0, -1), "4".to_owned());
    puzzle.texts.insert(Point::new(3, -1), "4".to_owned());
    for x in 0..4 {
        puzzle.texts.insert(Point::new(-2, x), "1".to_owned());
        puzzle.texts.insert(Point::new(-1, x), "1".to_owned());
    }
    let mut solution = Solution::new();
    for x in 0..4 {
        solution.shaded.insert(Point::new(0, x));
        solution.shaded.insert(Point::new(3, x));
    }
    (puzzle, solution)
}
