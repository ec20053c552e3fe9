//! Rank context: who this rank is, how many ranks exist, and how rows move between them.
//!
//! Every solver component takes the context explicitly. A context lives for one run:
//! it is created before the iteration loop and dropped after the final gather.

use crate::error::SolverResult;
use crate::types::HaloRow;

#[cfg(feature = "mpi")]
pub mod mpi;
pub mod threads;

#[cfg(feature = "mpi")]
pub use self::mpi::MpiComm;
pub use threads::{ThreadComm, run_threads};

/// Message-passing capabilities of one rank.
pub trait Communicator {
    fn rank(&self) -> usize;

    fn size(&self) -> usize;

    fn is_root(&self, root: usize) -> bool {
        self.rank() == root
    }

    /// Hand `row` to rank `dest` under `tag` and return without waiting for the receiver.
    ///
    /// The row is moved in, so the caller can never touch the in-flight buffer again.
    fn post_row(&mut self, dest: usize, tag: usize, row: HaloRow) -> SolverResult<()>;

    /// Block until the row posted by `source` under `tag` arrives. There is no timeout.
    fn recv_row(&mut self, source: usize, tag: usize) -> SolverResult<HaloRow>;

    /// Collective gather of every rank's `local` buffer to `root`, in rank order.
    ///
    /// `counts[r]` is the number of values rank `r` contributes. Returns the
    /// concatenation on `root` and `None` everywhere else.
    fn gather_to_root(
        &mut self,
        root: usize,
        local: Vec<f64>,
        counts: &[usize],
    ) -> SolverResult<Option<Vec<f64>>>;
}
