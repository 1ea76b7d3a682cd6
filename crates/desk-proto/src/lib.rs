//! # desk-proto
//!
//! Wire protocol for the deskd chat router.
//!
//! Every WebSocket text frame carries exactly one JSON envelope. Inbound
//! frames (client to server) are decoded into [`ClientFrame`]; outbound
//! frames (server to client) are built as [`ServerFrame`] values and encoded
//! back to JSON. Both are closed tagged unions: unknown actions are a decode
//! error, never an open-ended dictionary.
//!
//! ## Envelope shape
//!
//! ```json
//! {"action": "staffOnline", "payload": {"name": "Ann"}}
//! {"action": "customerConnect"}
//! {"action": "message", "payload": {"message": "hello"}}
//! ```
//!
//! Outbound:
//!
//! ```json
//! {"action": "message", "payload": {"message": "hi", "from": "staff"}}
//! {"action": "chat_close", "payload": {"message": "..."}}
//! {"action": "queue_close", "payload": {"message": "..."}}
//! ```
//!
//! Missing optional fields get defaults at the boundary (`message` defaults
//! to the empty string); optional outbound fields are omitted when absent.

mod frame;

pub use frame::{ClientFrame, CloseBody, MessageBody, Party, ProtoError, ServerFrame};
