//! Boundary row exchange between row-adjacent ranks.
//!
//! The exchange is a two-phase primitive: post private copies of this rank's edge rows,
//! then block for the neighbours' edge rows. Both carry the tag of the iteration that
//! produced them, so iteration `i` only ever sees neighbour data from iteration `i - 1`.

use crate::comm::Communicator;
use crate::error::{SolverError, SolverResult};
use crate::partition::RowPartition;
use crate::types::{HaloRow, Stripe};

/// Rows bordering a stripe, as of the previous iteration.
///
/// A side is `None` when the rank has no neighbour there.
#[derive(Debug, Clone, PartialEq)]
pub struct Halo {
    pub upper: Option<HaloRow>,
    pub lower: Option<HaloRow>,
}

#[derive(Debug, Clone)]
pub struct HaloExchanger {
    rank: usize,
    ranks: usize,
    cols: usize,
}

impl HaloExchanger {
    pub fn new(partition: &RowPartition, rank: usize) -> Self {
        Self {
            rank,
            ranks: partition.ranks(),
            cols: partition.n(),
        }
    }

    /// Neighbour owning the rows directly above this stripe.
    pub fn upper(&self) -> Option<usize> {
        (self.rank > 0).then(|| self.rank - 1)
    }

    /// Neighbour owning the rows directly below this stripe.
    pub fn lower(&self) -> Option<usize> {
        (self.rank + 1 < self.ranks).then(|| self.rank + 1)
    }

    /// Halo seen by iteration 0: every neighbour still holds its zero-initialized stripe.
    pub fn initial(&self) -> Halo {
        Halo {
            upper: self.upper().map(|_| vec![0.0; self.cols]),
            lower: self.lower().map(|_| vec![0.0; self.cols]),
        }
    }

    /// Phase one: post copies of `stripe`'s first and last rows to the neighbours, tagged `tag`.
    pub fn post<C: Communicator>(&self, comm: &mut C, stripe: &Stripe, tag: usize) -> SolverResult<()> {
        if let Some(upper) = self.upper() {
            comm.post_row(upper, tag, stripe.first().to_vec())?;
        }
        if let Some(lower) = self.lower() {
            comm.post_row(lower, tag, stripe.last().to_vec())?;
        }
        Ok(())
    }

    /// Phase two: block for the neighbours' rows tagged `tag`.
    pub fn receive<C: Communicator>(&self, comm: &mut C, tag: usize) -> SolverResult<Halo> {
        let upper = self
            .upper()
            .map(|peer| self.checked(peer, comm.recv_row(peer, tag)?))
            .transpose()?;
        let lower = self
            .lower()
            .map(|peer| self.checked(peer, comm.recv_row(peer, tag)?))
            .transpose()?;
        Ok(Halo { upper, lower })
    }

    /// Full exchange ahead of computing `iteration` from `stripe`, the result of `iteration - 1`.
    ///
    /// Iteration 0 has nothing to exchange and gets [`HaloExchanger::initial`].
    pub fn exchange<C: Communicator>(
        &self,
        comm: &mut C,
        stripe: &Stripe,
        iteration: usize,
    ) -> SolverResult<Halo> {
        let Some(produced_at) = iteration.checked_sub(1) else {
            return Ok(self.initial());
        };
        self.post(comm, stripe, produced_at)?;
        self.receive(comm, produced_at)
    }

    fn checked(&self, peer: usize, row: HaloRow) -> SolverResult<HaloRow> {
        if row.len() != self.cols {
            return Err(SolverError::HaloShape {
                peer,
                got: row.len(),
                expected: self.cols,
            });
        }
        Ok(row)
    }
}
