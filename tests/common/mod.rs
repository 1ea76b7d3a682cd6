//! Integration test common infrastructure.
//!
//! Drives the chat engine in-process with a recording delivery collaborator
//! instead of real sockets, so suites can assert on exactly which frames
//! each connection would have received.

// Each suite uses a subset of the harness.
#![allow(dead_code)]

use desk_proto::ServerFrame;
use deskd::state::{
    spawn_eviction_worker, ChatEngine, ConnId, Push, TimeoutSupervisor,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records every pushed frame instead of delivering it.
pub struct RecordingPush {
    frames: Mutex<Vec<(ConnId, ServerFrame)>>,
}

impl RecordingPush {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            frames: Mutex::new(Vec::new()),
        })
    }

    /// All frames pushed to `id`, in delivery order.
    pub fn for_conn(&self, id: ConnId) -> Vec<ServerFrame> {
        self.frames
            .lock()
            .unwrap()
            .iter()
            .filter(|(to, _)| *to == id)
            .map(|(_, frame)| frame.clone())
            .collect()
    }

    /// The most recent frame pushed to `id`.
    pub fn last_for(&self, id: ConnId) -> Option<ServerFrame> {
        self.for_conn(id).pop()
    }

    /// Total number of frames pushed so far.
    pub fn total(&self) -> usize {
        self.frames.lock().unwrap().len()
    }
}

impl Push for RecordingPush {
    fn push(&self, id: ConnId, frame: ServerFrame) {
        self.frames.lock().unwrap().push((id, frame));
    }
}

/// An engine wired to a recording pusher and a live eviction worker.
pub struct TestHarness {
    pub engine: Arc<ChatEngine>,
    pub pusher: Arc<RecordingPush>,
}

impl TestHarness {
    /// Harness with the default 60s idle window.
    pub fn new() -> Self {
        Self::with_idle_timeout(Duration::from_secs(60))
    }

    /// Harness with a custom idle window. Must be created inside a tokio
    /// runtime (the eviction worker is spawned immediately).
    pub fn with_idle_timeout(window: Duration) -> Self {
        let (timeouts, evict_rx) = TimeoutSupervisor::new(window);
        let pusher = RecordingPush::new();
        let engine = Arc::new(ChatEngine::new(
            Arc::clone(&timeouts),
            Arc::clone(&pusher) as Arc<dyn Push>,
            "Staff",
        ));
        spawn_eviction_worker(Arc::clone(&engine), timeouts, evict_rx);
        Self { engine, pusher }
    }
}

/// Let spawned timer and eviction tasks run to quiescence.
///
/// With the clock paused, everything due has already been woken; a handful
/// of yields lets the expiry hop through the eviction channel and worker.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}
