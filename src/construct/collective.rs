//! All-gather between construction workers
//!
//! A worker posts the rows of its own block once and receives every other
//! worker's block in exchange. Instead of a block, a worker may post an abort,
//! which makes every peer's gather fail without a forest.

use std::cell::Cell;
use std::fmt;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

use tracing::{trace, warn};

use crate::IstError;

/// Rows computed by one worker: `rows.len() / (n - 1)` vertices starting at
/// `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Worker that produced the block.
    pub worker: usize,
    /// First vertex of the block.
    pub start: usize,
    /// Vertex-major parent rows.
    pub rows: Vec<u32>,
}

/// Message-passing group that the distributed constructor merges through.
///
/// Worker identity and group size come from the collective, never from
/// process-global state.
pub trait Collective {
    /// This worker's id in `0..worker_count()`.
    fn worker_id(&self) -> usize;

    /// Number of workers in the group.
    fn worker_count(&self) -> usize;

    /// Post this worker's block and wait until every worker's block has been
    /// received. Returns all blocks, this worker's included, in worker order.
    fn all_gather(&self, block: Block) -> Result<Vec<Arc<Block>>, IstError>;

    /// Tell every peer that this worker will not post a block.
    fn abort(&self);
}

enum Message {
    Block(Arc<Block>),
    Abort { worker: usize },
}

/// In-process collective over `std::sync::mpsc` channels.
///
/// Dropping an endpoint that has neither gathered nor aborted broadcasts an
/// abort, so a worker that panics cannot leave its peers waiting.
pub struct ChannelCollective {
    worker_id: usize,
    peers: Vec<Option<Sender<Message>>>,
    inbox: Receiver<Message>,
    posted: Cell<bool>,
}

impl ChannelCollective {
    /// One endpoint per worker, fully connected.
    pub fn group(worker_count: usize) -> Result<Vec<Self>, IstError> {
        if worker_count == 0 {
            return Err(IstError::InvalidWorkerCount(
                "at least one worker is required".to_string(),
            ));
        }

        let (senders, receivers): (Vec<_>, Vec<_>) =
            (0..worker_count).map(|_| channel::<Message>()).unzip();

        Ok(receivers
            .into_iter()
            .enumerate()
            .map(|(worker_id, inbox)| {
                let peers = senders
                    .iter()
                    .enumerate()
                    .map(|(peer, sender)| (peer != worker_id).then(|| sender.clone()))
                    .collect();
                Self {
                    worker_id,
                    peers,
                    inbox,
                    posted: Cell::new(false),
                }
            })
            .collect())
    }

    fn broadcast(&self, make: impl Fn() -> Message) {
        for (peer, sender) in self.peers.iter().enumerate() {
            if let Some(sender) = sender {
                // A peer that already returned has dropped its inbox.
                if sender.send(make()).is_err() {
                    trace!(worker = self.worker_id, peer, "peer inbox closed");
                }
            }
        }
    }
}

impl Collective for ChannelCollective {
    fn worker_id(&self) -> usize {
        self.worker_id
    }

    fn worker_count(&self) -> usize {
        self.peers.len()
    }

    fn all_gather(&self, block: Block) -> Result<Vec<Arc<Block>>, IstError> {
        if self.posted.replace(true) {
            return Err(IstError::CollectiveDisconnected(format!(
                "worker {} posted twice",
                self.worker_id
            )));
        }

        // Blocks are filed by sender, so the stamp must be ours.
        let own = Arc::new(Block {
            worker: self.worker_id,
            ..block
        });
        self.broadcast(|| Message::Block(Arc::clone(&own)));

        let mut blocks: Vec<Option<Arc<Block>>> = vec![None; self.worker_count()];
        blocks[self.worker_id] = Some(own);
        let mut missing = self.worker_count() - 1;

        while missing > 0 {
            match self.inbox.recv() {
                Ok(Message::Block(block)) => {
                    let slot = blocks.get_mut(block.worker).ok_or_else(|| {
                        IstError::CollectiveDisconnected(format!(
                            "block from unknown worker {}",
                            block.worker
                        ))
                    })?;
                    if slot.is_some() {
                        return Err(IstError::CollectiveDisconnected(format!(
                            "worker {} received two blocks from worker {}",
                            self.worker_id, block.worker
                        )));
                    }
                    *slot = Some(block);
                    missing -= 1;
                }
                Ok(Message::Abort { worker }) => {
                    warn!(worker = self.worker_id, peer = worker, "peer aborted construction");
                    return Err(IstError::WorkerAborted { worker });
                }
                Err(_) => {
                    return Err(IstError::CollectiveDisconnected(format!(
                        "worker {} lost its peers with {} blocks outstanding",
                        self.worker_id, missing
                    )));
                }
            }
        }

        Ok(blocks.into_iter().flatten().collect())
    }

    fn abort(&self) {
        if !self.posted.replace(true) {
            let worker = self.worker_id;
            self.broadcast(|| Message::Abort { worker });
        }
    }
}

impl Drop for ChannelCollective {
    fn drop(&mut self) {
        self.abort();
    }
}

impl fmt::Debug for ChannelCollective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelCollective")
            .field("worker_id", &self.worker_id)
            .field("worker_count", &self.peers.len())
            .field("posted", &self.posted.get())
            .finish()
    }
}
