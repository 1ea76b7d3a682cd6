//! Customer inactivity timers.
//!
//! Each actively-chatting customer carries a cancellable, rearmable timer.
//! Expiry does not evict directly: the customer id is queued on an eviction
//! channel and a dedicated worker runs the same removal path as an explicit
//! disconnect, so timer callbacks never touch the registry from inside a
//! timer task.
//!
//! Cancellation can race a timer that has already fired. Every armed timer
//! carries a generation number; an expiry only wins if its generation still
//! matches the supervisor's table ([`TimeoutSupervisor::claim`]), and the
//! removal path itself is idempotent, so a stale expiry is harmless.

use super::conn::ConnId;
use super::lifecycle::ChatEngine;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// A fired inactivity timer, pending adjudication by [`TimeoutSupervisor::claim`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiry {
    pub customer: ConnId,
    generation: u64,
}

struct ArmedTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Arms, rearms, and cancels per-customer inactivity timers.
pub struct TimeoutSupervisor {
    window: Duration,
    evict_tx: mpsc::UnboundedSender<Expiry>,
    timers: DashMap<ConnId, ArmedTimer>,
    generations: AtomicU64,
}

impl TimeoutSupervisor {
    /// Create a supervisor evicting after `window` of silence, plus the
    /// receiving end of its eviction channel (see [`spawn_eviction_worker`]).
    pub fn new(window: Duration) -> (Arc<Self>, mpsc::UnboundedReceiver<Expiry>) {
        let (evict_tx, evict_rx) = mpsc::unbounded_channel();
        let supervisor = Arc::new(Self {
            window,
            evict_tx,
            timers: DashMap::new(),
            generations: AtomicU64::new(0),
        });
        (supervisor, evict_rx)
    }

    /// Start (or restart) the inactivity timer for a customer.
    ///
    /// Any previously armed timer for the same customer is superseded: its
    /// task is aborted, and if it already fired its expiry will fail to
    /// claim.
    pub fn arm(&self, customer: ConnId) {
        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        let tx = self.evict_tx.clone();
        let window = self.window;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            // Receiver gone means shutdown; nothing left to evict.
            let _ = tx.send(Expiry {
                customer,
                generation,
            });
        });

        if let Some(previous) = self.timers.insert(customer, ArmedTimer { generation, handle }) {
            previous.handle.abort();
        }
    }

    /// Tear down a customer's timer without firing it.
    pub fn cancel(&self, customer: ConnId) {
        if let Some((_, timer)) = self.timers.remove(&customer) {
            timer.handle.abort();
        }
    }

    /// Try to claim a fired expiry.
    ///
    /// Succeeds only if the expiry's generation is still the one armed for
    /// that customer; a rearm or cancel in the meantime invalidates it. The
    /// check and the table removal are one atomic step, so an expiry can be
    /// claimed at most once.
    pub fn claim(&self, expiry: Expiry) -> bool {
        self.timers
            .remove_if(&expiry.customer, |_, timer| {
                timer.generation == expiry.generation
            })
            .is_some()
    }
}

/// Drain fired timers and evict the customers they belong to.
///
/// Runs until the supervisor (and with it the channel's send side) is
/// dropped.
pub fn spawn_eviction_worker(
    engine: Arc<ChatEngine>,
    supervisor: Arc<TimeoutSupervisor>,
    mut evict_rx: mpsc::UnboundedReceiver<Expiry>,
) {
    tokio::spawn(async move {
        while let Some(expiry) = evict_rx.recv().await {
            if supervisor.claim(expiry) {
                engine.evict(expiry.customer);
            } else {
                debug!(customer = expiry.customer, "stale timer expiry ignored");
            }
        }
    });
}
