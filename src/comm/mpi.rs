//! MPI backend: one process per rank, launched with `mpirun`.
//!
//! `post_row`, `recv_row` and `gather_to_root` need a real MPI world, so their test is
//! ignored by a plain `cargo test`. Run it under the launcher:
//!
//! ```text
//! cargo test --features mpi --lib --no-run
//! mpirun -n 4 target/debug/deps/membrane-<hash> --ignored --exact comm::mpi::tests::test_world_matches_reference
//! ```

use mpi::collective::Root;
use mpi::datatype::PartitionMut;
use mpi::environment::Universe;
use mpi::point_to_point::{Destination, Source};
use mpi::topology::Communicator as MpiCommunicator;
use mpi::{Count, Tag};

use super::Communicator;
use crate::error::{SolverError, SolverResult};
use crate::types::HaloRow;

/// Smallest upper bound on tags that every MPI implementation guarantees, plus one.
const TAG_SPAN: usize = 32_768;

/// Buffered rows a rank may have in flight towards one neighbour.
const PIPELINE_DEPTH: usize = 4;

/// Per-message bookkeeping allowance for `MPI_Bsend`.
const BSEND_OVERHEAD: usize = 1024;

/// Context of one MPI process. Dropping it finalizes MPI.
pub struct MpiComm {
    universe: Universe,
    rank: usize,
    size: usize,
}

impl MpiComm {
    pub fn init() -> SolverResult<Self> {
        let universe = mpi::initialize()
            .ok_or_else(|| SolverError::backend("MPI has already been initialized in this process"))?;
        let (rank, size) = {
            let world = universe.world();
            (world.rank() as usize, world.size() as usize)
        };
        Ok(Self { universe, rank, size })
    }

    /// Attach the buffer that backs non-blocking halo posts of `cols`-wide rows.
    pub fn attach_halo_buffer(&mut self, cols: usize) {
        let per_row = cols * std::mem::size_of::<f64>() + BSEND_OVERHEAD;
        self.universe.set_buffer_size(2 * PIPELINE_DEPTH * per_row);
    }

    fn world(&self) -> impl MpiCommunicator {
        self.universe.world()
    }
}

fn mpi_tag(tag: usize) -> Tag {
    (tag % TAG_SPAN) as Tag
}

impl Communicator for MpiComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn post_row(&mut self, dest: usize, tag: usize, row: HaloRow) -> SolverResult<()> {
        // Bsend copies into the attached buffer, so `row` can be dropped right away.
        self.world()
            .process_at_rank(dest as i32)
            .buffered_send_with_tag(&row[..], mpi_tag(tag));
        Ok(())
    }

    fn recv_row(&mut self, source: usize, tag: usize) -> SolverResult<HaloRow> {
        let (row, _status) = self
            .world()
            .process_at_rank(source as i32)
            .receive_vec_with_tag::<f64>(mpi_tag(tag));
        Ok(row)
    }

    fn gather_to_root(
        &mut self,
        root: usize,
        local: Vec<f64>,
        counts: &[usize],
    ) -> SolverResult<Option<Vec<f64>>> {
        let world = self.world();
        let root_process = world.process_at_rank(root as i32);

        if self.rank != root {
            root_process.gather_varcount_into(&local[..]);
            return Ok(None);
        }

        let counts: Vec<Count> = counts.iter().map(|&c| c as Count).collect();
        let displacements: Vec<Count> = counts
            .iter()
            .scan(0, |acc, &c| {
                let start = *acc;
                *acc += c;
                Some(start)
            })
            .collect();
        let total = counts.iter().sum::<Count>() as usize;

        let mut assembled = vec![0.0f64; total];
        {
            let mut partition = PartitionMut::new(&mut assembled[..], counts, &displacements[..]);
            root_process.gather_varcount_into_root(&local[..], &mut partition);
        }

        Ok(Some(assembled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_wrap_below_guaranteed_bound() {
        assert_eq!(mpi_tag(0), 0);
        assert_eq!(mpi_tag(32_767), 32_767);
        assert_eq!(mpi_tag(32_768), 0);
        assert_eq!(mpi_tag(100_000), (100_000 % 32_768) as Tag);
    }

    #[test]
    #[ignore = "needs an MPI world; run under mpirun"]
    fn test_world_matches_reference() {
        use crate::assemble::COORDINATOR;
        use crate::config::{ProblemSize, RunConfig};

        let config = RunConfig {
            series_id: 0,
            size: ProblemSize::PointsPerRank(3),
            side_length: 1.0,
            theta: 1.0,
            iters: 25,
        };
        let mut comm = MpiComm::init().unwrap();
        let ranks = comm.size();
        comm.attach_halo_buffer(config.resolve(ranks).unwrap().n());

        let report = crate::solver::run_rank(&mut comm, &config).unwrap();

        if comm.is_root(COORDINATOR) {
            let report = report.unwrap();
            assert_eq!(report.record.rank_count, ranks);
            assert_eq!(report.grid, crate::reference::solve(&config, ranks).unwrap());
        } else {
            assert!(report.is_none());
        }
    }
}
