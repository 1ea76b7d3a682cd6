//! Network layer: WebSocket gateway, per-connection tasks, and outbound
//! delivery.

mod connection;
mod gateway;
mod limit;
mod sender;

pub use connection::Connection;
pub use gateway::Gateway;
pub use limit::RateLimiter;
pub use sender::SenderTable;
