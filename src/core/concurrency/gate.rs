//! Concurrency gate implementation

use super::permit::{GatePermit, QueuedTicket};
use super::types::{GateState, QUEUE_RETRY_HINT_MS, Waiter};
use crate::config::ConcurrencyConfig;
use crate::monitoring::metrics::GatewayMetrics;
use crate::utils::error::AdmissionRejection;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::debug;

/// Bounds simultaneous upstream operations, queueing the overflow
#[derive(Debug)]
pub struct ConcurrencyGate {
    config: ConcurrencyConfig,
    state: Mutex<GateState>,
    metrics: Option<Arc<GatewayMetrics>>,
}

impl ConcurrencyGate {
    pub fn new(config: ConcurrencyConfig) -> Self {
        Self {
            config,
            state: Mutex::new(GateState::default()),
            metrics: None,
        }
    }

    /// Publish gauges and queue waits to the given metrics
    pub fn with_metrics(mut self, metrics: Arc<GatewayMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Upstream calls currently holding a slot
    pub fn active(&self) -> usize {
        self.state.lock().active
    }

    /// Callers currently waiting for a slot
    pub fn queue_len(&self) -> usize {
        self.state.lock().queue.len()
    }

    pub fn max_concurrent(&self) -> usize {
        self.config.max_concurrent
    }

    pub fn max_queue_length(&self) -> usize {
        self.config.max_queue_length
    }

    /// Acquire a slot, waiting in the FIFO queue if all slots are taken
    pub async fn acquire(self: &Arc<Self>) -> Result<GatePermit, AdmissionRejection> {
        if !self.config.enabled {
            return Ok(GatePermit::noop());
        }

        let started = Instant::now();
        let (id, grant) = {
            let mut state = self.state.lock();

            if state.active < self.config.max_concurrent {
                state.active += 1;
                self.publish(&state);
                drop(state);
                return Ok(self.granted(started));
            }

            if state.queue.len() >= self.config.max_queue_length {
                debug!(
                    queue_len = state.queue.len(),
                    "Upstream queue full, rejecting"
                );
                return Err(AdmissionRejection::queue_overflow(QUEUE_RETRY_HINT_MS));
            }

            let id = state.next_id;
            state.next_id = state.next_id.wrapping_add(1);
            let (tx, rx) = oneshot::channel();
            state.queue.push_back(Waiter {
                id,
                enqueued_at: started,
                grant: tx,
            });
            self.publish(&state);
            (id, rx)
        };

        let mut ticket = QueuedTicket::new(self, id, grant);
        let outcome = tokio::time::timeout(self.config.queue_timeout(), ticket.grant_mut()).await;

        match outcome {
            Ok(Ok(())) => {
                ticket.settle();
                Ok(self.granted(started))
            }
            // Timed out, or the sender vanished: whichever happened first under the lock wins
            Ok(Err(_)) | Err(_) => {
                let still_queued = {
                    let mut state = self.state.lock();
                    let removed = state.remove_waiter(id);
                    if removed {
                        self.publish(&state);
                    }
                    removed
                };
                ticket.settle();

                if still_queued {
                    debug!(
                        waited_ms = started.elapsed().as_millis() as u64,
                        "Queued request timed out"
                    );
                    Err(AdmissionRejection::queue_timeout(QUEUE_RETRY_HINT_MS))
                } else {
                    // A release granted us the slot just before the timeout fired
                    Ok(self.granted(started))
                }
            }
        }
    }

    fn granted(self: &Arc<Self>, started: Instant) -> GatePermit {
        let waited = started.elapsed();
        if let Some(metrics) = &self.metrics {
            metrics.observe_queue_wait(waited.as_secs_f64());
        }
        GatePermit::new(Arc::clone(self), waited)
    }

    /// Return a slot and hand it to the next waiters
    pub(super) fn release_slot(&self) {
        let mut state = self.state.lock();
        state.active = state.active.saturating_sub(1);
        self.pump(&mut state);
        self.publish(&state);
    }

    /// A queued caller went away before settling
    pub(super) fn abandon(&self, id: u64) {
        let mut state = self.state.lock();
        if state.remove_waiter(id) {
            self.publish(&state);
            return;
        }
        // Already granted: give the slot back
        state.active = state.active.saturating_sub(1);
        self.pump(&mut state);
        self.publish(&state);
    }

    /// Grant queued waiters in FIFO order while capacity allows
    fn pump(&self, state: &mut GateState) {
        while state.active < self.config.max_concurrent {
            let Some(waiter) = state.queue.pop_front() else {
                break;
            };
            if waiter.grant.send(()).is_ok() {
                state.active += 1;
                debug!(
                    queued_ms = waiter.enqueued_at.elapsed().as_millis() as u64,
                    "Granted queued request"
                );
            }
        }
    }

    fn publish(&self, state: &GateState) {
        if let Some(metrics) = &self.metrics {
            metrics.set_gate_gauges(state.active, state.queue.len());
        }
    }

    /// Time a fresh request would have to wait at most
    pub fn queue_timeout(&self) -> Duration {
        self.config.queue_timeout()
    }
}
