use anyhow::{Context, Result};
use clap::Parser;
use membrane::cli::{Backend, Cli, Commands, ProblemArgs};
use membrane::config::{RunConfig, RunSettings};
use membrane::csv_writer;
use membrane::reference;
use membrane::reporter;
use membrane::solver;
use membrane::types::RunReport;
use std::path::PathBuf;
use std::process;

/// Where the coordinator sends its results
struct OutputOptions {
    grid: bool,
    json: bool,
    csv: Option<PathBuf>,
    summary: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            problem,
            ranks,
            backend,
            grid,
            json,
            csv,
            summary,
        } => {
            let output = OutputOptions {
                grid,
                json,
                csv,
                summary,
            };
            run_command(problem, ranks, backend, output)
        }
        Commands::Reference { problem, ranks } => reference_command(problem, ranks),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn load_settings(args: ProblemArgs, ranks: Option<usize>) -> Result<RunSettings> {
    let file = match &args.config {
        Some(path) => RunSettings::load(path)
            .context(format!("Failed to load config file: {}", path.display()))?,
        None => RunSettings::default(),
    };

    let flags = RunSettings {
        series: args.series,
        grid_points: args.grid_points,
        points_per_rank: args.points_per_rank,
        side_length: args.side_length,
        theta: args.theta,
        iters: args.iters,
        ranks,
    };

    Ok(file.overlay(flags))
}

fn run_command(
    problem: ProblemArgs,
    ranks: Option<usize>,
    backend: Backend,
    output: OutputOptions,
) -> Result<()> {
    let settings = load_settings(problem, ranks)?;
    let ranks = settings.ranks;
    let config = settings.into_config()?;

    let report = match backend {
        Backend::Threads => Some(solver::run_on_threads(&config, ranks.unwrap_or(1))?),
        Backend::Mpi => {
            if ranks.is_some() {
                log::warn!("--ranks is ignored by the mpi backend; the rank count comes from mpirun");
            }
            run_mpi(&config)?
        }
    };

    // Only the coordinator holds a report.
    if let Some(report) = report {
        emit(&report, &output)?;
    }

    Ok(())
}

#[cfg(feature = "mpi")]
fn run_mpi(config: &RunConfig) -> Result<Option<RunReport>> {
    use membrane::assemble::COORDINATOR;
    use membrane::comm::{Communicator, MpiComm};

    let mut comm = MpiComm::init()?;
    let problem = config.resolve(comm.size())?;
    comm.attach_halo_buffer(problem.n());
    if comm.is_root(COORDINATOR) {
        log::info!("solving on {} MPI rank(s)", comm.size());
    }
    Ok(solver::run_rank(&mut comm, config)?)
}

#[cfg(not(feature = "mpi"))]
fn run_mpi(_config: &RunConfig) -> Result<Option<RunReport>> {
    anyhow::bail!("This build has no MPI support; rebuild with `--features mpi` and launch under mpirun")
}

fn emit(report: &RunReport, output: &OutputOptions) -> Result<()> {
    log::info!(
        "{} rank(s), {}x{} grid, {} iterations: {:.3} ms",
        report.record.rank_count,
        report.grid_points,
        report.grid_points,
        report.iters,
        report.record.elapsed_ms
    );

    if output.grid {
        reporter::print_grid(&report.grid)?;
    } else if output.json {
        reporter::print_json(report)?;
    } else {
        println!("{}", csv_writer::format_record(&report.record));
    }

    if let Some(path) = &output.csv {
        csv_writer::append_timing_csv(&report.record, path)?;
    }

    if output.summary {
        reporter::print_summary(report)?;
    }

    Ok(())
}

fn reference_command(problem: ProblemArgs, ranks: Option<usize>) -> Result<()> {
    let settings = load_settings(problem, ranks)?;
    let ranks = settings.ranks.unwrap_or(1);
    let config = settings.into_config()?;
    let grid = reference::solve(&config, ranks)?;
    reporter::print_grid(&grid)
}
