//! Scaling sweep on the threads backend.
//!
//! Runs the same problem on 1..=N ranks, repeated over several series, and prints a
//! complete CSV with the header expected by the scaling analysis tool.
//!
//! ## Usage
//!
//! ```bash
//! # Default sweep: 256x256 grid, 1..=4 ranks, 3 series, 200 iterations
//! cargo run --release --example scaling_series > timings.csv
//!
//! # Custom grid size and maximum rank count
//! cargo run --release --example scaling_series -- --size 512 --max-ranks 8
//! ```
//!
//! For process-per-rank numbers use the binary under mpirun instead:
//!
//! ```bash
//! mpirun -n 4 membrane run --backend mpi -s 0 --grid-points 512 -a 1 --theta 1 --iters 200 --csv timings.csv
//! ```

use membrane::config::{ProblemSize, RunConfig};
use membrane::csv_writer::{TIMING_HEADER, format_record};
use membrane::solver::run_on_threads;
use std::env;

/// Default grid side length
const DEFAULT_PROBLEM_SIZE: usize = 256;

/// Default largest rank count in the sweep
const DEFAULT_MAX_RANKS: usize = 4;

const SERIES: u64 = 3;

const ITERATIONS: usize = 200;

fn flag_value(args: &[String], flag: &str) -> Option<usize> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|value| value.parse().ok())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let problem_size = flag_value(&args, "--size").unwrap_or(DEFAULT_PROBLEM_SIZE);
    let max_ranks = flag_value(&args, "--max-ranks")
        .unwrap_or(DEFAULT_MAX_RANKS)
        .min(problem_size);

    println!("{}", TIMING_HEADER);
    for series_id in 0..SERIES {
        for ranks in 1..=max_ranks {
            let config = RunConfig {
                series_id,
                size: ProblemSize::GridPoints(problem_size),
                side_length: 1.0,
                theta: 1.0,
                iters: ITERATIONS,
            };
            let report = run_on_threads(&config, ranks)?;
            println!("{}", format_record(&report.record));
        }
    }

    Ok(())
}
