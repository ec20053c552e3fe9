use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "membrane")]
#[command(about = "Distributed Jacobi solver for membrane deflection", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Solve on several ranks and emit one timing record
    Run {
        #[command(flatten)]
        problem: ProblemArgs,

        /// Number of ranks for the threads backend (mpi takes it from mpirun)
        #[arg(short = 'n', long)]
        ranks: Option<usize>,

        /// Message-passing backend
        #[arg(long, value_enum, default_value_t = Backend::Threads)]
        backend: Backend,

        /// Print the assembled grid instead of the timing record
        #[arg(long, conflicts_with = "json")]
        grid: bool,

        /// Print a JSON run report instead of the timing record
        #[arg(long)]
        json: bool,

        /// Also append the timing record to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Print a human-readable summary to stderr
        #[arg(long)]
        summary: bool,
    },
    /// Solve in a single process without decomposition and print the grid
    Reference {
        #[command(flatten)]
        problem: ProblemArgs,

        /// Rank count the grid is sized for with --points-per-rank (N = K * ranks)
        #[arg(short = 'n', long)]
        ranks: Option<usize>,
    },
}

#[derive(Args)]
pub struct ProblemArgs {
    /// TOML file with run settings; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Id of the series (does not repeat the computation)
    #[arg(short, long)]
    pub series: Option<u64>,

    /// Grid points along one side; the grid has this value squared points
    #[arg(long, conflicts_with = "points_per_rank")]
    pub grid_points: Option<usize>,

    /// Grid rows per rank; the grid side becomes this value times the rank count
    #[arg(long)]
    pub points_per_rank: Option<usize>,

    /// Side length of the membrane
    #[arg(short = 'a', long = "side")]
    pub side_length: Option<f64>,

    /// Right-hand side of the equation
    #[arg(long, allow_negative_numbers = true)]
    pub theta: Option<f64>,

    /// Number of Jacobi iterations
    #[arg(long)]
    pub iters: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// One thread per rank inside this process
    Threads,
    /// One MPI process per rank (requires the `mpi` feature and mpirun)
    Mpi,
}
