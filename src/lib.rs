//! deskd - customer service chat router.
//!
//! Routes real-time WebSocket chat connections between customers seeking
//! help and the staff who answer them. Staff announce themselves online;
//! customers are matched to a free staff member or queued against the
//! least-loaded busy one; idle customers are evicted after a configurable
//! window; everything tears down cleanly on disconnect.
//!
//! The interesting part lives in [`state`]: the connection registry, the
//! matching and queueing rules, and the inactivity timers. [`network`] is
//! the thin WebSocket shim around it.

pub mod config;
pub mod error;
pub mod network;
pub mod state;
