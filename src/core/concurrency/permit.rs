//! Gate permits and queued tickets

use super::gate::ConcurrencyGate;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

/// One upstream slot; released explicitly or on drop
#[derive(Debug)]
pub struct GatePermit {
    gate: Option<Arc<ConcurrencyGate>>,
    queue_wait: Duration,
}

impl GatePermit {
    pub(super) fn new(gate: Arc<ConcurrencyGate>, queue_wait: Duration) -> Self {
        Self {
            gate: Some(gate),
            queue_wait,
        }
    }

    /// Permit from a disabled gate; releasing it does nothing
    pub(super) fn noop() -> Self {
        Self {
            gate: None,
            queue_wait: Duration::ZERO,
        }
    }

    /// How long the holder waited in the queue
    pub fn queue_wait(&self) -> Duration {
        self.queue_wait
    }

    /// Whether this permit still holds a slot
    pub fn is_held(&self) -> bool {
        self.gate.is_some()
    }

    /// Return the slot; calling it again is a no-op
    pub fn release(&mut self) {
        if let Some(gate) = self.gate.take() {
            gate.release_slot();
        }
    }
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        self.release();
    }
}

/// Queue membership of an `acquire` in flight
///
/// Dropping an unsettled ticket (the acquire future was cancelled) removes the
/// waiter, or returns the slot if it had already been granted. The receiver
/// lives here so a grant can never be sent into a dropped channel unnoticed.
pub(super) struct QueuedTicket<'a> {
    gate: &'a ConcurrencyGate,
    id: u64,
    grant: oneshot::Receiver<()>,
    settled: bool,
}

impl<'a> QueuedTicket<'a> {
    pub(super) fn new(gate: &'a ConcurrencyGate, id: u64, grant: oneshot::Receiver<()>) -> Self {
        Self {
            gate,
            id,
            grant,
            settled: false,
        }
    }

    pub(super) fn grant_mut(&mut self) -> &mut oneshot::Receiver<()> {
        &mut self.grant
    }

    pub(super) fn settle(&mut self) {
        self.settled = true;
    }
}

impl Drop for QueuedTicket<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.gate.abandon(self.id);
        }
    }
}
