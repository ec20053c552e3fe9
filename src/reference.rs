//! Single-process Jacobi solver over the whole grid, without any decomposition.
//!
//! Used to cross-check the distributed solver and to inspect small problems directly.

use std::mem;

use crate::config::RunConfig;
use crate::error::SolverResult;
use crate::stencil::Stencil;
use crate::types::Grid;

/// Solve `config` as a run on `ranks` ranks would, on a single grid.
///
/// `ranks` only sizes the grid in points-per-rank mode and is validated like any run.
pub fn solve(config: &RunConfig, ranks: usize) -> SolverResult<Grid> {
    let problem = config.resolve(ranks)?;
    let n = problem.n();
    let stencil = Stencil::new(n, problem.delta, problem.theta);

    let mut current = Grid::zeros(n);
    let mut next = Grid::zeros(n);
    for _ in 0..problem.iters {
        for row in 1..n.saturating_sub(1) {
            for col in 1..n - 1 {
                let value = stencil.cell(
                    current.get(row - 1, col),
                    current.get(row + 1, col),
                    current.get(row, col - 1),
                    current.get(row, col + 1),
                );
                next.set(row, col, value);
            }
        }
        mem::swap(&mut current, &mut next);
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProblemSize;
    use approx::assert_relative_eq;

    #[test]
    fn test_symmetric_solution() {
        let config = RunConfig {
            series_id: 0,
            size: ProblemSize::GridPoints(9),
            side_length: 2.0,
            theta: 1.0,
            iters: 30,
        };
        let grid = solve(&config, 1).unwrap();

        for row in 0..9 {
            for col in 0..9 {
                assert_eq!(grid.get(row, col), grid.get(8 - row, col));
                assert_relative_eq!(grid.get(row, col), grid.get(col, row), epsilon = 1e-12);
            }
        }
        assert!(grid.boundary_is_zero());
        // Positive forcing pulls the membrane below zero, deepest in the middle.
        assert!(grid.get(4, 4) < grid.get(2, 2));
        assert!(grid.get(2, 2) < 0.0);
    }

    #[test]
    fn test_points_per_rank_sized_by_rank_count() {
        let config = RunConfig {
            series_id: 0,
            size: ProblemSize::PointsPerRank(3),
            side_length: 1.0,
            theta: 1.0,
            iters: 2,
        };
        assert_eq!(solve(&config, 1).unwrap().n(), 3);
        assert_eq!(solve(&config, 4).unwrap().n(), 12);
    }
}
