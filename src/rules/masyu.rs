//! Masyu: draw a single loop through the circled cells. The loop turns
//! on every black circle and runs straight through both neighboring
//! cells; it runs straight through every white circle and turns in at
//! least one of the two cells beside it.

use crate::constraints::Constraints;
use crate::context::{Bool, Context};
use crate::geometry::Point;
use crate::puzzle::{Puzzle, Solution, Symbol};
use std::time::Duration;

pub fn solve(puzzle: &Puzzle, budget: Option<Duration>) -> Option<Solution> {
    let ctx = Context::new();
    let cs = Constraints::new(&ctx);

    // Draw lines through orthogonally adjacent cells to form a loop
    let (grid, root) = cs.single_loop_grid(&puzzle.points);

    // Optimization: start the loop at a specific circle
    let anchor = puzzle
        .symbols
        .keys()
        .next()
        .copied()
        .or_else(|| puzzle.points.iter().next())?;
    cs.add(root.is(&ctx, &anchor));

    // The loop goes through every circle
    for (p, _) in &puzzle.symbols {
        cs.add(ctx.not(grid[p].is_empty(&ctx)));
    }

    for (p, symbol) in &puzzle.symbols {
        if symbol.is_black() {
            // The loop must turn on black circles and travel straight
            // through the cells before and after the circle
            cs.add(ctx.not(grid[p].is_straight(&ctx)));
            for (q, v) in puzzle.points.edge_sharing_neighbors(*p) {
                cs.add(ctx.implies(
                    grid[p].has_direction(&ctx, v),
                    grid[&q].is(&ctx, &[v, v.negate()]),
                ));
            }
        } else {
            // The loop must go straight through white circles, and turn in
            // at least one of the cells on either side
            let arms: Vec<Bool> = puzzle
                .points
                .lattice()
                .opposite_directions()
                .into_iter()
                .filter(|(v, w)| {
                    grid.contains_key(&p.translate(*v)) && grid.contains_key(&p.translate(*w))
                })
                .map(|(v, w)| {
                    let straight = grid[p].is(&ctx, &[v, w]);
                    let bend_beside = ctx.or([
                        ctx.not(grid[&p.translate(v)].is(&ctx, &[v, w])),
                        ctx.not(grid[&p.translate(w)].is(&ctx, &[v, w])),
                    ]);
                    ctx.and([straight, bend_beside])
                })
                .collect();
            cs.add(ctx.or(arms));
        }
    }

    let model = cs.solve_blocking(budget).solution()?;

    // Fill in solved loop
    let mut solution = Solution::new();
    for (p, var) in &grid {
        let index = model.get(&ctx, var.arith());
        for v in var.directions(index) {
            solution.lines.insert((*p, p.translate(*v)));
        }
    }
    Some(solution)
}

/// A 3 by 3 instance whose circles force the loop around the border.
#[must_use]
pub fn sample() -> (Puzzle, Solution) {
    let mut puzzle = Puzzle::rectangle(3, 3);
    puzzle
        .symbols
        .insert(Point::new(0, 0), Symbol::black_circle());
    puzzle
        .symbols
        .insert(Point::new(0, 1), Symbol::white_circle());
    puzzle
        .symbols
        .insert(Point::new(2, 1), Symbol::white_circle());
    let ring = [
        Point::new(0, 0),
        Point::new(0, 1),
        Point::new(0, 2),
        Point::new(1, 2),
        Point::new(2, 2),
        Point::new(2, 1),
        Point::new(2, 0),
        Point::new(1, 0),
    ];
    let mut solution = Solution::new();
    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[(i + 1) % ring.len()]);
        solution.lines.insert((a, b));
        solution.lines.insert((b, a));
    }
    (puzzle, solution)
}
