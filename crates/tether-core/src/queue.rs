//! Reclamation queues.
//!
//! A [`ReclaimQueue`] receives one payload per watched object once that
//! object has been collected. Consumers drain it with a bounded,
//! non-blocking poll; nothing ever waits for a future collection.

use crossbeam_channel::{Receiver, Sender};
use smallvec::SmallVec;

/// Batch of payloads returned by [`ReclaimQueue::drain`].
pub type DrainBatch<P> = SmallVec<[P; 16]>;

/// Unbounded multi-producer queue of reclamation notices.
pub struct ReclaimQueue<P> {
    tx: Sender<P>,
    rx: Receiver<P>,
}

impl<P> ReclaimQueue<P> {
    /// Create an empty queue.
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { tx, rx }
    }

    /// Number of notices waiting to be drained.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether no notices are waiting.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Take up to `limit` notices already queued. Never blocks.
    pub fn drain(&self, limit: usize) -> DrainBatch<P> {
        self.rx.try_iter().take(limit).collect()
    }

    pub(crate) fn sender(&self) -> Sender<P> {
        self.tx.clone()
    }
}

impl<P> Default for ReclaimQueue<P> {
    fn default() -> Self {
        Self::new()
    }
}
