use crate::error::{SolverError, SolverResult};

/// Number of grid rows owned by `rank` when `n` rows are split over `ranks`.
///
/// The first `n % ranks` ranks take one extra row each.
pub fn local_rows(n: usize, ranks: usize, rank: usize) -> usize {
    let base = n / ranks;
    if rank < n % ranks { base + 1 } else { base }
}

/// Static row decomposition of an `n × n` grid over `ranks` ranks.
///
/// Stripes are ordered by rank id and compose top to bottom without gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowPartition {
    n: usize,
    rows: Vec<usize>,
}

impl RowPartition {
    pub fn new(n: usize, ranks: usize) -> SolverResult<Self> {
        if ranks < 1 {
            return Err(SolverError::invalid("rank count must be at least 1"));
        }
        if ranks > n {
            return Err(SolverError::invalid(format!(
                "{ranks} ranks cannot share a grid of {n} rows; every rank needs at least one row"
            )));
        }

        let rows = (0..ranks).map(|rank| local_rows(n, ranks, rank)).collect();
        Ok(Self { n, rows })
    }

    /// Grid side length.
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn ranks(&self) -> usize {
        self.rows.len()
    }

    pub fn rows_of(&self, rank: usize) -> usize {
        self.rows[rank]
    }

    /// Global index of the first row owned by `rank`.
    pub fn first_row(&self, rank: usize) -> usize {
        self.rows[..rank].iter().sum()
    }

    /// Number of values each rank contributes to the final gather.
    pub fn value_counts(&self) -> Vec<usize> {
        self.rows.iter().map(|rows| rows * self.n).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.iter().copied()
    }
}
