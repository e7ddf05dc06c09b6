//! Gate state

use std::collections::VecDeque;
use std::time::Instant;
use tokio::sync::oneshot;

/// Retry hint attached to queue overflow and queue timeout rejections
pub(super) const QUEUE_RETRY_HINT_MS: u64 = 1_000;

/// A caller waiting for a slot
#[derive(Debug)]
pub(super) struct Waiter {
    pub(super) id: u64,
    pub(super) enqueued_at: Instant,
    pub(super) grant: oneshot::Sender<()>,
}

/// Everything the gate mutates, behind one lock
#[derive(Debug, Default)]
pub(super) struct GateState {
    pub(super) active: usize,
    pub(super) queue: VecDeque<Waiter>,
    pub(super) next_id: u64,
}

impl GateState {
    /// Remove a waiter by id; false when it already left the queue
    pub(super) fn remove_waiter(&mut self, id: u64) -> bool {
        match self.queue.iter().position(|waiter| waiter.id == id) {
            Some(pos) => {
                self.queue.remove(pos);
                true
            }
            None => false,
        }
    }
}
