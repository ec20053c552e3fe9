//! In-process backend: every rank is an OS thread that owns its own stripe.
//!
//! Ranks share no grid memory. Each ordered pair of ranks has its own FIFO channel and
//! every message carries an owned buffer, so a row handed to a neighbour is a copy the
//! sender can no longer reach.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use super::Communicator;
use crate::error::{SolverError, SolverResult};
use crate::types::HaloRow;

enum Message {
    Halo { tag: usize, row: HaloRow },
    Stripe(Vec<f64>),
}

/// Context of one thread-backed rank.
pub struct ThreadComm {
    rank: usize,
    size: usize,
    /// `txs[peer]` carries this rank's messages to `peer`.
    txs: Vec<Sender<Message>>,
    /// `rxs[peer]` carries `peer`'s messages to this rank.
    rxs: Vec<Receiver<Message>>,
}

impl ThreadComm {
    /// Build `size` fully connected contexts, indexed by rank.
    pub fn world(size: usize) -> Vec<ThreadComm> {
        let mut txs: Vec<Vec<Sender<Message>>> = (0..size).map(|_| Vec::with_capacity(size)).collect();
        let mut rxs: Vec<Vec<Receiver<Message>>> = (0..size).map(|_| Vec::with_capacity(size)).collect();

        for src in 0..size {
            for dst in 0..size {
                let (tx, rx) = mpsc::channel();
                txs[src].push(tx);
                rxs[dst].push(rx);
            }
        }

        txs.into_iter()
            .zip(rxs)
            .enumerate()
            .map(|(rank, (txs, rxs))| ThreadComm { rank, size, txs, rxs })
            .collect()
    }

    fn lost(&self, peer: usize, message: impl Into<String>) -> SolverError {
        SolverError::Communication {
            rank: self.rank,
            peer,
            message: message.into(),
        }
    }

    fn send(&self, dest: usize, message: Message) -> SolverResult<()> {
        self.txs[dest]
            .send(message)
            .map_err(|_| self.lost(dest, "peer has already shut down"))
    }

    fn recv(&self, source: usize) -> SolverResult<Message> {
        self.rxs[source]
            .recv()
            .map_err(|_| self.lost(source, "peer shut down before sending"))
    }
}

impl Communicator for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn post_row(&mut self, dest: usize, tag: usize, row: HaloRow) -> SolverResult<()> {
        log::trace!("rank {} -> rank {}: halo tag {}", self.rank, dest, tag);
        self.send(dest, Message::Halo { tag, row })
    }

    fn recv_row(&mut self, source: usize, tag: usize) -> SolverResult<HaloRow> {
        match self.recv(source)? {
            Message::Halo { tag: got, row } if got == tag => Ok(row),
            Message::Halo { tag: got, .. } => {
                Err(self.lost(source, format!("expected halo tag {tag}, received tag {got}")))
            }
            Message::Stripe(_) => {
                Err(self.lost(source, format!("expected halo tag {tag}, received a gathered stripe")))
            }
        }
    }

    fn gather_to_root(
        &mut self,
        root: usize,
        local: Vec<f64>,
        counts: &[usize],
    ) -> SolverResult<Option<Vec<f64>>> {
        if self.rank != root {
            self.send(root, Message::Stripe(local))?;
            return Ok(None);
        }

        let mut assembled = Vec::with_capacity(counts.iter().sum());
        let mut local = Some(local);
        for (source, &expected) in counts.iter().enumerate() {
            let values = if source == root {
                local.take().unwrap_or_default()
            } else {
                match self.recv(source)? {
                    Message::Stripe(values) => values,
                    Message::Halo { tag, .. } => {
                        return Err(self.lost(
                            source,
                            format!("expected a gathered stripe, received halo tag {tag}"),
                        ));
                    }
                }
            };
            if values.len() != expected {
                return Err(self.lost(
                    source,
                    format!("gathered stripe has {} values, expected {}", values.len(), expected),
                ));
            }
            assembled.extend_from_slice(&values);
        }

        Ok(Some(assembled))
    }
}

/// Run `body` once per rank, each on its own thread, and collect the results in rank order.
///
/// A rank that panics is reported as a backend failure naming that rank.
pub fn run_threads<T, F>(size: usize, body: F) -> SolverResult<Vec<T>>
where
    T: Send,
    F: Fn(&mut ThreadComm) -> SolverResult<T> + Sync,
{
    let comms = ThreadComm::world(size);
    let body = &body;

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(size);
        for mut comm in comms {
            let handle = thread::Builder::new()
                .name(format!("rank-{}", comm.rank))
                .spawn_scoped(scope, move || body(&mut comm))?;
            handles.push(handle);
        }

        handles
            .into_iter()
            .enumerate()
            .map(|(rank, handle)| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(SolverError::backend(format!("rank {rank} thread panicked"))))
            })
            .collect()
    })
}
