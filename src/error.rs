//! Unified error handling for deskd.
//!
//! The engine itself has no recoverable failures: lookups of unknown ids
//! are silent no-ops, malformed payloads get defaults at the wire boundary,
//! and lost-update conflicts are prevented structurally by the registry's
//! atomic update contract. What remains is the transport edge, which is
//! where these types live.

use thiserror::Error;

/// Errors that can end a connection task.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("websocket transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("outbound frame could not be encoded: {0}")]
    Encode(#[from] desk_proto::ProtoError),
}

impl ConnectionError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport_error",
            Self::Encode(_) => "encode_error",
        }
    }
}

/// Result type for connection tasks.
pub type ConnectionResult = Result<(), ConnectionError>;
