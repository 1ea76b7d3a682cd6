//! Shared chat state: the registry, matching, queueing, timers, and the
//! lifecycle engine that ties them together.

mod conn;
mod lifecycle;
pub mod matching;
pub mod queue;
mod registry;
mod timeout;

pub use conn::{ConnId, ConnIdGenerator, Push};
pub use lifecycle::ChatEngine;
pub use registry::{CustomerRecord, Registry, StaffRecord};
pub use timeout::{spawn_eviction_worker, Expiry, TimeoutSupervisor};
