use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One boundary row handed between row-adjacent ranks. Always an owned copy.
pub type HaloRow = Vec<f64>;

/// Full `n × n` displacement grid, row-major.
///
/// Only ever materialized on the coordinating rank after the gather, or by the
/// reference solver.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    n: usize,
    values: Vec<f64>,
}

impl Grid {
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            values: vec![0.0; n * n],
        }
    }

    /// Wrap row-major values. Returns `None` when `values.len() != n * n`.
    pub fn from_values(n: usize, values: Vec<f64>) -> Option<Self> {
        (values.len() == n * n).then_some(Self { n, values })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.n + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.values[row * self.n + col] = value;
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.values[row * self.n..(row + 1) * self.n]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.n.max(1))
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Largest absolute value in the grid (0 for an empty grid).
    pub fn max_abs(&self) -> f64 {
        self.values.iter().fold(0.0, |acc, v| acc.max(v.abs()))
    }

    /// Whether the outer ring (first/last row and column) is exactly zero.
    pub fn boundary_is_zero(&self) -> bool {
        let n = self.n;
        if n == 0 {
            return true;
        }
        (0..n).all(|i| {
            self.get(0, i) == 0.0
                && self.get(n - 1, i) == 0.0
                && self.get(i, 0) == 0.0
                && self.get(i, n - 1) == 0.0
        })
    }
}

/// Contiguous block of full-width rows owned by exactly one rank.
#[derive(Debug, Clone, PartialEq)]
pub struct Stripe {
    first_row: usize,
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl Stripe {
    pub fn zeros(first_row: usize, rows: usize, cols: usize) -> Self {
        Self {
            first_row,
            rows,
            cols,
            values: vec![0.0; rows * cols],
        }
    }

    /// Global index of the stripe's first row.
    pub fn first_row(&self) -> usize {
        self.first_row
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row(&self, local: usize) -> &[f64] {
        &self.values[local * self.cols..(local + 1) * self.cols]
    }

    pub fn row_mut(&mut self, local: usize) -> &mut [f64] {
        &mut self.values[local * self.cols..(local + 1) * self.cols]
    }

    pub fn first(&self) -> &[f64] {
        self.row(0)
    }

    pub fn last(&self) -> &[f64] {
        self.row(self.rows - 1)
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

/// Performance record emitted once per run by the coordinating rank.
///
/// Column order and naming are fixed by the downstream analysis tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingRecord {
    pub rank_count: usize,
    pub problem_size: usize,
    pub series_id: u64,
    pub elapsed_ms: f64,
}

/// Everything the coordinator knows after a run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub record: TimingRecord,
    pub grid_points: usize,
    pub side_length: f64,
    pub theta: f64,
    pub iters: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub compute_ms: f64,
    pub gather_ms: f64,
    #[serde(skip)]
    pub grid: Grid,
}
