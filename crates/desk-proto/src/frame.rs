//! Inbound and outbound chat envelopes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while decoding or encoding an envelope.
#[derive(Debug, Error)]
pub enum ProtoError {
    #[error("invalid envelope: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown action: {0}")]
    UnknownAction(String),
}

/// A frame received from a connected client.
///
/// The sender's role is not trusted from the frame alone: `StaffOnline`
/// declares the connection a staff connection, `CustomerConnect` declares it
/// a customer, and `Message` is valid from either side. Identity
/// verification is a deliberate non-goal; the `name` field is where a login
/// token would go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientFrame {
    /// A staff member announces itself as ready to serve.
    StaffOnline {
        /// Display label; `None` means the server default applies.
        name: Option<String>,
    },
    /// An end user asks to be matched with a staff member.
    CustomerConnect,
    /// A chat message from whichever party the connection belongs to.
    Message { message: String },
}

/// Raw envelope as it appears on the wire, before action validation.
#[derive(Debug, Default, Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    action: String,
    #[serde(default)]
    payload: RawPayload,
}

/// Union of all inbound payload fields; per-action validation picks the
/// ones that apply and defaults the rest.
#[derive(Debug, Default, Deserialize)]
struct RawPayload {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ClientFrame {
    /// Decode one inbound JSON envelope.
    ///
    /// Missing optional fields are defaulted (`message` to `""`); an
    /// unrecognized `action` is an error so the transport can log and drop
    /// the frame.
    pub fn decode(raw: &str) -> Result<Self, ProtoError> {
        let envelope: RawEnvelope = serde_json::from_str(raw)?;
        match envelope.action.as_str() {
            "staffOnline" => Ok(Self::StaffOnline {
                name: envelope.payload.name,
            }),
            "customerConnect" => Ok(Self::CustomerConnect),
            "message" => Ok(Self::Message {
                message: envelope.payload.message.unwrap_or_default(),
            }),
            other => Err(ProtoError::UnknownAction(other.to_string())),
        }
    }
}

/// Which party originated a forwarded chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Party {
    Customer,
    Staff,
}

/// Payload of an outbound `message` frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
    /// 1-based queue position, present on queueing notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue: Option<usize>,
    /// Originating party, present on forwarded chat messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Party>,
}

/// Payload of the `chat_close` / `queue_close` frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseBody {
    pub message: String,
}

/// A frame pushed to a connected client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Informational text or a forwarded chat message.
    Message(MessageBody),
    /// The active chat has ended.
    ChatClose(CloseBody),
    /// The wait queue has been dissolved.
    QueueClose(CloseBody),
}

impl ServerFrame {
    /// Plain informational text.
    pub fn text(message: impl Into<String>) -> Self {
        Self::Message(MessageBody {
            message: message.into(),
            queue: None,
            from: None,
        })
    }

    /// Text carrying a 1-based queue position.
    pub fn queued(message: impl Into<String>, position: usize) -> Self {
        Self::Message(MessageBody {
            message: message.into(),
            queue: Some(position),
            from: None,
        })
    }

    /// A chat message forwarded on behalf of `from`.
    pub fn forwarded(message: impl Into<String>, from: Party) -> Self {
        Self::Message(MessageBody {
            message: message.into(),
            queue: None,
            from: Some(from),
        })
    }

    /// The active chat has ended.
    pub fn chat_close(message: impl Into<String>) -> Self {
        Self::ChatClose(CloseBody {
            message: message.into(),
        })
    }

    /// The wait queue has been dissolved.
    pub fn queue_close(message: impl Into<String>) -> Self {
        Self::QueueClose(CloseBody {
            message: message.into(),
        })
    }

    /// Encode to a JSON envelope for one WebSocket text frame.
    pub fn encode(&self) -> Result<String, ProtoError> {
        Ok(serde_json::to_string(self)?)
    }
}
