//! Canal View: shade cells so that all shaded cells form one connected
//! canal, never covering a 2 by 2 square, where each number counts the
//! shaded cells visible from it along the four straight lines.

use crate::collections::ValueMap;
use crate::constraints::Constraints;
use crate::context::Context;
use crate::geometry::Point;
use crate::puzzle::{Puzzle, Solution};
use std::time::Duration;

pub fn solve(puzzle: &Puzzle, budget: Option<Duration>) -> Option<Solution> {
    let ctx = Context::new();
    let cs = Constraints::new(&ctx);

    // Shade some cells on the board
    let grid = ValueMap::from_keys(puzzle.points.iter(), |_| cs.int(0, 1));

    // The number on a cell indicates how many cells are shaded in a
    // continuous line starting from the cell, in the four cardinal
    // directions; the numbered cell itself counts as the extra one
    for (p, text) in &puzzle.texts {
        let count: i64 = text.parse().expect("numeric clue");
        cs.add_sight_line_count(
            &puzzle.points,
            *p,
            |q, _| {
                if q == *p {
                    ctx.bool_const(true)
                } else {
                    grid[&q].eq(&ctx, ctx.int(1))
                }
            },
            count + 1,
        );
    }

    // You cannot shade a cell with a number
    for (p, _) in &puzzle.texts {
        cs.add(grid[p].eq(&ctx, ctx.int(0)));
    }

    // The shaded cells cannot form a 2x2 square
    for vertex in puzzle.points.vertices() {
        cs.add(ctx.or(
            vertex
                .iter()
                .map(|p| grid[p].eq(&ctx, ctx.int(0)))
                .collect::<Vec<_>>(),
        ));
    }

    // All shaded cells form an orthogonally contiguous area
    cs.add_all_connected(&puzzle.points, |p| grid[&p].eq(&ctx, ctx.int(1)));

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

/// A 3 by 3 instance whose clues pin the middle column exactly.
#[must_use]
pub fn sample() -> (Puzzle, Solution) {
    let mut puzzle = Puzzle::rectangle(3, 3);
    puzzle.texts.insert(Point::new(0, 0), "1".to_owned());
    puzzle.texts.insert(Point::new(1, 0), "1".to_owned());
    puzzle.texts.insert(Point::new(1, 2), "1".to_owned());
    puzzle.texts.insert(Point::new(2, 2), "1".to_owned());
    let mut solution = Solution::new();
    for y in 0..3 {
        solution.shaded.insert(Point::new(y, 1));
    }
    (puzzle, solution)
}
