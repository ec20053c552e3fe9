//! Startup configuration: command-line flags layered over an optional TOML file.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{SolverError, SolverResult};
use crate::partition::RowPartition;

/// How the grid side length is specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemSize {
    /// Total grid side `N`, split over however many ranks run.
    GridPoints(usize),
    /// Rows per rank `K`; the grid side becomes `K · P`.
    PointsPerRank(usize),
}

impl ProblemSize {
    /// Value written to the `problem_size` column of the timing record.
    pub fn reported(&self) -> usize {
        match *self {
            ProblemSize::GridPoints(n) | ProblemSize::PointsPerRank(n) => n,
        }
    }

    fn grid_side(&self, ranks: usize) -> SolverResult<usize> {
        match *self {
            ProblemSize::GridPoints(0) => Err(SolverError::invalid("grid points must be at least 1")),
            ProblemSize::GridPoints(n) => Ok(n),
            ProblemSize::PointsPerRank(0) => {
                Err(SolverError::invalid("points per rank must be at least 1"))
            }
            ProblemSize::PointsPerRank(k) => k.checked_mul(ranks).ok_or_else(|| {
                SolverError::invalid(format!("{k} points per rank on {ranks} ranks overflows"))
            }),
        }
    }
}

/// Complete run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Run identifier; never affects the computation.
    pub series_id: u64,
    pub size: ProblemSize,
    /// Physical side length of the membrane.
    pub side_length: f64,
    /// Forcing term.
    pub theta: f64,
    /// Fixed number of Jacobi iterations.
    pub iters: usize,
}

/// A configuration checked against a concrete rank count.
#[derive(Debug, Clone)]
pub struct Problem {
    pub series_id: u64,
    pub problem_size: usize,
    pub partition: RowPartition,
    pub side_length: f64,
    pub theta: f64,
    pub delta: f64,
    pub iters: usize,
}

impl Problem {
    pub fn n(&self) -> usize {
        self.partition.n()
    }

    pub fn ranks(&self) -> usize {
        self.partition.ranks()
    }
}

impl RunConfig {
    /// Validate against `ranks` and derive the grid geometry.
    ///
    /// Depends only on its inputs, so every rank reaches the same verdict before any
    /// message is exchanged.
    pub fn resolve(&self, ranks: usize) -> SolverResult<Problem> {
        if !self.side_length.is_finite() || self.side_length <= 0.0 {
            return Err(SolverError::invalid(format!(
                "side length must be a positive finite number, got {}",
                self.side_length
            )));
        }
        if !self.theta.is_finite() {
            return Err(SolverError::invalid(format!("theta must be finite, got {}", self.theta)));
        }

        let n = self.size.grid_side(ranks)?;
        let partition = RowPartition::new(n, ranks)?;
        // A 1 × 1 grid is all boundary; its spacing is never used.
        let delta = if n > 1 { self.side_length / (n - 1) as f64 } else { 0.0 };

        Ok(Problem {
            series_id: self.series_id,
            problem_size: self.size.reported(),
            partition,
            side_length: self.side_length,
            theta: self.theta,
            delta,
            iters: self.iters,
        })
    }
}

/// Partially specified configuration, as read from a TOML file or the command line.
#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RunSettings {
    pub series: Option<u64>,
    pub grid_points: Option<usize>,
    pub points_per_rank: Option<usize>,
    pub side_length: Option<f64>,
    pub theta: Option<f64>,
    pub iters: Option<usize>,
    pub ranks: Option<usize>,
}

impl RunSettings {
    pub fn from_toml(text: &str) -> SolverResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> SolverResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Layer `over` on top of `self`; values present in `over` win.
    ///
    /// The two size options are treated as one setting, so a size given on the command
    /// line replaces whichever size the file specified.
    pub fn overlay(self, over: RunSettings) -> RunSettings {
        let size_overridden = over.grid_points.is_some() || over.points_per_rank.is_some();
        let (grid_points, points_per_rank) = if size_overridden {
            (over.grid_points, over.points_per_rank)
        } else {
            (self.grid_points, self.points_per_rank)
        };

        RunSettings {
            series: over.series.or(self.series),
            grid_points,
            points_per_rank,
            side_length: over.side_length.or(self.side_length),
            theta: over.theta.or(self.theta),
            iters: over.iters.or(self.iters),
            ranks: over.ranks.or(self.ranks),
        }
    }

    pub fn into_config(self) -> SolverResult<RunConfig> {
        let size = match (self.grid_points, self.points_per_rank) {
            (Some(n), None) => ProblemSize::GridPoints(n),
            (None, Some(k)) => ProblemSize::PointsPerRank(k),
            (Some(_), Some(_)) => {
                return Err(SolverError::invalid(
                    "grid_points and points_per_rank are mutually exclusive",
                ));
            }
            (None, None) => return Err(missing("grid_points or points_per_rank")),
        };

        Ok(RunConfig {
            series_id: self.series.ok_or_else(|| missing("series"))?,
            size,
            side_length: self.side_length.ok_or_else(|| missing("side_length"))?,
            theta: self.theta.ok_or_else(|| missing("theta"))?,
            iters: self.iters.ok_or_else(|| missing("iters"))?,
        })
    }
}

fn missing(option: &str) -> SolverError {
    SolverError::invalid(format!("missing required option: {option}"))
}
