use crate::comm::Communicator;
use crate::error::{SolverError, SolverResult};
use crate::partition::RowPartition;
use crate::types::{Grid, Stripe};

/// Rank that receives the gathered grid and emits the timing record.
pub const COORDINATOR: usize = 0;

/// Gather every rank's final stripe to the coordinator and stack them in rank order.
///
/// Consumes the stripe. Returns the full grid on the coordinator and `None` on every
/// other rank.
pub fn assemble<C: Communicator>(
    comm: &mut C,
    partition: &RowPartition,
    stripe: Stripe,
) -> SolverResult<Option<Grid>> {
    let counts = partition.value_counts();
    let gathered = comm.gather_to_root(COORDINATOR, stripe.into_values(), &counts)?;

    gathered
        .map(|values| {
            let n = partition.n();
            let len = values.len();
            Grid::from_values(n, values).ok_or_else(|| {
                SolverError::backend(format!("gathered {len} values for a {n} x {n} grid"))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm::run_threads;

    #[test]
    fn test_stripes_stack_top_to_bottom() {
        let partition = RowPartition::new(5, 2).unwrap();
        let grids = run_threads(2, |comm| {
            let rank = comm.rank();
            let mut stripe = Stripe::zeros(partition.first_row(rank), partition.rows_of(rank), 5);
            for local in 0..stripe.rows() {
                let global = stripe.first_row() + local;
                stripe.row_mut(local).fill(global as f64);
            }
            assemble(comm, &partition, stripe)
        })
        .unwrap();

        let grid = grids[0].as_ref().unwrap();
        for row in 0..5 {
            assert_eq!(grid.row(row), &[row as f64; 5]);
        }
        assert!(grids[1].is_none());
    }

    /// Coordinator whose gather hands back a fixed buffer.
    struct FixedGather(Vec<f64>);

    impl Communicator for FixedGather {
        fn rank(&self) -> usize {
            COORDINATOR
        }

        fn size(&self) -> usize {
            1
        }

        fn post_row(&mut self, _dest: usize, _tag: usize, _row: crate::types::HaloRow) -> SolverResult<()> {
            Ok(())
        }

        fn recv_row(&mut self, _source: usize, _tag: usize) -> SolverResult<crate::types::HaloRow> {
            Ok(Vec::new())
        }

        fn gather_to_root(
            &mut self,
            _root: usize,
            _local: Vec<f64>,
            _counts: &[usize],
        ) -> SolverResult<Option<Vec<f64>>> {
            Ok(Some(self.0.clone()))
        }
    }

    #[test]
    fn test_short_gather_is_a_backend_error() {
        let partition = RowPartition::new(3, 1).unwrap();
        let mut comm = FixedGather(vec![0.0; 8]);
        let err = assemble(&mut comm, &partition, Stripe::zeros(0, 3, 3)).unwrap_err();

        assert!(matches!(&err, SolverError::Backend(message) if message.contains("8 values")));
        assert_eq!(err.to_string(), "Message passing backend error: gathered 8 values for a 3 x 3 grid");
    }
}
