//! End-to-end runs of the threads backend against the reference solver.

use membrane::config::{ProblemSize, RunConfig};
use membrane::reference;
use membrane::solver::run_on_threads;
use membrane::types::Grid;

fn config(n: usize, side_length: f64, theta: f64, iters: usize) -> RunConfig {
    RunConfig {
        series_id: 0,
        size: ProblemSize::GridPoints(n),
        side_length,
        theta,
        iters,
    }
}

fn solve(config: &RunConfig, ranks: usize) -> Grid {
    run_on_threads(config, ranks).unwrap().grid
}

#[test]
fn result_does_not_depend_on_rank_count() {
    let cfg = config(12, 1.0, 1.5, 40);
    let single = solve(&cfg, 1);

    for ranks in [2, 3, 4, 5, 7, 12] {
        let grid = solve(&cfg, ranks);
        assert_eq!(grid, single, "grid differs with {ranks} ranks");
    }
}

#[test]
fn single_rank_matches_reference_solver() {
    let cfg = config(10, 2.0, -3.0, 25);
    assert_eq!(solve(&cfg, 1), reference::solve(&cfg, 1).unwrap());
}

#[test]
fn many_ranks_match_reference_solver() {
    let cfg = config(9, 1.0, 1.0, 17);
    assert_eq!(solve(&cfg, 4), reference::solve(&cfg, 4).unwrap());
}

#[test]
fn boundary_ring_stays_zero() {
    for ranks in [1, 2, 3, 8] {
        for iters in [1, 2, 9] {
            let grid = solve(&config(8, 1.0, 5.0, iters), ranks);
            assert!(grid.boundary_is_zero(), "{ranks} ranks, {iters} iterations");
        }
    }
}

#[test]
fn zero_iterations_leave_zero_grid() {
    for ranks in [1, 3] {
        let grid = solve(&config(7, 1.0, 2.0, 0), ranks);
        assert_eq!(grid, Grid::zeros(7));
    }
}

#[test]
fn no_forcing_keeps_membrane_flat() {
    let grid = solve(&config(4, 1.0, 0.0, 5), 1);
    assert_eq!(grid, Grid::zeros(4));
}

#[test]
fn one_iteration_on_five_by_five() {
    let grid = solve(&config(5, 1.0, 1.0, 1), 1);
    let delta: f64 = 1.0 / 4.0;
    let expected = (0.0 + 0.0 + 0.0 + 0.0 - delta * delta) / 4.0;

    assert_eq!(grid.get(2, 2), expected);
    assert_eq!(grid.get(2, 2), -1.0 / 64.0);
    assert!(grid.boundary_is_zero());
}

#[test]
fn points_per_rank_builds_the_same_grid() {
    let per_rank = RunConfig {
        size: ProblemSize::PointsPerRank(3),
        ..config(0, 1.0, 1.0, 12)
    };
    let report = run_on_threads(&per_rank, 4).unwrap();

    assert_eq!(report.record.problem_size, 3);
    assert_eq!(report.grid_points, 12);
    assert_eq!(report.grid, solve(&config(12, 1.0, 1.0, 12), 4));
    assert_eq!(report.grid, reference::solve(&per_rank, 4).unwrap());
}

#[test]
fn deflection_stays_bounded_for_known_good_parameters() {
    let (side, theta) = (1.0, 4.0);
    let grid = solve(&config(16, side, theta, 500), 4);

    // The 1D profile theta * x * (a - x) / 2 bounds the 2D discrete solution.
    let bound = theta.abs() * side * side / 8.0;
    assert!(grid.values().iter().all(|v| v.is_finite()));
    assert!(grid.max_abs() <= bound);
    assert!(grid.max_abs() > 0.0);
}
