//! Outbound delivery: connection id to writer-task channel routing.

use crate::state::{ConnId, Push};
use dashmap::DashMap;
use desk_proto::ServerFrame;
use tokio::sync::mpsc;
use tracing::trace;

/// Maps live connections to their outgoing frame channels.
///
/// This is the process-internal implementation of the [`Push`] delivery
/// contract: fire-and-forget, no acknowledgment. Frames for connections
/// that have unregistered (or whose writer task died) are dropped.
pub struct SenderTable {
    senders: DashMap<ConnId, mpsc::UnboundedSender<ServerFrame>>,
}

impl SenderTable {
    pub fn new() -> Self {
        Self {
            senders: DashMap::new(),
        }
    }

    /// Register a connection's outgoing channel for routing.
    pub fn register(&self, id: ConnId, sender: mpsc::UnboundedSender<ServerFrame>) {
        self.senders.insert(id, sender);
    }

    /// Unregister a connection's outgoing channel.
    pub fn unregister(&self, id: ConnId) {
        self.senders.remove(&id);
    }

    /// Number of registered connections.
    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}

impl Default for SenderTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Push for SenderTable {
    fn push(&self, id: ConnId, frame: ServerFrame) {
        match self.senders.get(&id) {
            Some(sender) => {
                if sender.send(frame).is_err() {
                    trace!(conn_id = id, "push to closing connection dropped");
                }
            }
            None => trace!(conn_id = id, "push to unknown connection dropped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_routes_to_registered_connection() {
        let table = SenderTable::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        table.register(3, tx);

        table.push(3, ServerFrame::text("hi"));
        assert_eq!(rx.try_recv().unwrap(), ServerFrame::text("hi"));
    }

    #[test]
    fn push_to_unknown_connection_is_dropped() {
        let table = SenderTable::new();
        // Must not panic or error.
        table.push(99, ServerFrame::text("hi"));
    }

    #[test]
    fn unregister_stops_routing() {
        let table = SenderTable::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        table.register(3, tx);
        table.unregister(3);

        table.push(3, ServerFrame::text("hi"));
        assert!(rx.try_recv().is_err());
        assert!(table.is_empty());
    }
}
