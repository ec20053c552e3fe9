//! Per-rank driver: partition, iterate, gather, report.
//!
//! Every rank walks the same states:
//! `INIT -> {RECEIVE_HALO (not at i = 0) -> COMPUTE -> SEND_HALO} x iters -> GATHER`,
//! and the coordinator additionally builds the run report.

use std::mem;

use crate::assemble::{self, COORDINATOR};
use crate::comm::Communicator;
use crate::config::{Problem, RunConfig};
use crate::error::{SolverError, SolverResult};
use crate::halo::HaloExchanger;
use crate::stencil::Stencil;
use crate::timer::RunTimer;
use crate::types::{RunReport, Stripe, TimingRecord};

/// Run the Jacobi iterations on this rank's stripe and return its final state.
///
/// Two buffers are ping-ponged: each iteration reads only `current` and the halo,
/// writes all of `next`, then the two swap roles.
pub fn iterate<C: Communicator>(comm: &mut C, problem: &Problem) -> SolverResult<Stripe> {
    let rank = comm.rank();
    let partition = &problem.partition;
    let n = partition.n();
    let first_row = partition.first_row(rank);
    let rows = partition.rows_of(rank);

    let exchanger = HaloExchanger::new(partition, rank);
    let stencil = Stencil::new(n, problem.delta, problem.theta);
    let mut current = Stripe::zeros(first_row, rows, n);
    let mut next = Stripe::zeros(first_row, rows, n);

    for iteration in 0..problem.iters {
        let halo = exchanger.exchange(comm, &current, iteration)?;
        stencil.apply(&current, &halo, rank, &mut next)?;
        mem::swap(&mut current, &mut next);
    }

    Ok(current)
}

/// Execute one complete run on this rank.
///
/// The configuration is resolved against the communicator size before any message is
/// sent. Returns the run report on the coordinator and `None` on every other rank.
pub fn run_rank<C: Communicator>(comm: &mut C, config: &RunConfig) -> SolverResult<Option<RunReport>> {
    let problem = config.resolve(comm.size())?;
    let rank = comm.rank();
    log::debug!(
        "rank {}/{}: rows {}..{} of {}",
        rank,
        problem.ranks(),
        problem.partition.first_row(rank),
        problem.partition.first_row(rank) + problem.partition.rows_of(rank),
        problem.n()
    );

    let mut timer = RunTimer::start();
    let stripe = iterate(comm, &problem)?;
    timer.loop_finished();
    let grid = assemble::assemble(comm, &problem.partition, stripe)?;

    let Some(grid) = grid else {
        log::debug!("rank {rank}: stripe handed to coordinator");
        return Ok(None);
    };
    let elapsed = timer.stop();
    log::debug!(
        "compute {:.3} ms, gather {:.3} ms",
        elapsed.compute_ms,
        elapsed.gather_ms
    );

    Ok(Some(RunReport {
        record: TimingRecord {
            rank_count: problem.ranks(),
            problem_size: problem.problem_size,
            series_id: problem.series_id,
            elapsed_ms: elapsed.total_ms,
        },
        grid_points: problem.n(),
        side_length: problem.side_length,
        theta: problem.theta,
        iters: problem.iters,
        started_at: elapsed.started_at,
        finished_at: elapsed.finished_at,
        compute_ms: elapsed.compute_ms,
        gather_ms: elapsed.gather_ms,
        grid,
    }))
}

/// Run `config` on `ranks` threads of this process and return the coordinator's report.
pub fn run_on_threads(config: &RunConfig, ranks: usize) -> SolverResult<RunReport> {
    // Fail before spawning anything; every rank would reject the same configuration.
    config.resolve(ranks)?;
    log::info!("solving on {ranks} thread rank(s)");

    let mut reports = crate::comm::run_threads(ranks, |comm| run_rank(comm, config))?;
    reports
        .get_mut(COORDINATOR)
        .and_then(Option::take)
        .ok_or_else(|| SolverError::backend("coordinator finished without a report"))
}
