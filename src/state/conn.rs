//! Connection identity and the outbound delivery seam.

use desk_proto::ServerFrame;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a connection, assigned by the gateway.
pub type ConnId = u64;

/// Generates unique connection ids.
///
/// Ids start at 1 so that 0 can never collide with a live connection in
/// logs or tests.
pub struct ConnIdGenerator {
    counter: AtomicU64,
}

impl ConnIdGenerator {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(1),
        }
    }

    /// Generate the next unique connection id.
    pub fn next(&self) -> ConnId {
        self.counter.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for ConnIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Outbound delivery collaborator.
///
/// Fire-and-forget: pushing to a connection that no longer exists silently
/// drops the frame. Implementations must not block; the engine calls `push`
/// from synchronous code, after its registry critical sections commit.
pub trait Push: Send + Sync + 'static {
    fn push(&self, id: ConnId, frame: ServerFrame);
}
