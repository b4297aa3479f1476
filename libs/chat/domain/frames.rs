//! Wire frames exchanged over the chat socket
//!
//! Outbound: `{"message": "...", "recipient_id": "..."}`
//!
//! Inbound, one of:
//! - `{"error": "..."}`
//! - a chat payload `{"id", "sender", "sender_id", "content", "timestamp"}`
//! - a control notice such as `{"type": "connection_established", "message": "..."}`

use super::message::ChatMessage;
use super::peer::PeerId;
use chatsocket::WsMessage;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Unrecognised frame: {0}")]
    Unrecognised(String),
}

pub type Result<T> = std::result::Result<T, FrameError>;

/// Message submitted by the local user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundFrame {
    pub message: String,
    pub recipient_id: PeerId,
}

impl OutboundFrame {
    pub fn new(message: impl Into<String>, recipient_id: PeerId) -> Self {
        Self {
            message: message.into(),
            recipient_id,
        }
    }

    pub fn to_ws_message(&self) -> Result<WsMessage> {
        Ok(WsMessage::Text(serde_json::to_string(self)?))
    }
}

/// Frame received from the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    /// Server-side rejection of something we sent
    Error(String),
    /// A chat message addressed to, or sent by, the local user
    Message(ChatMessage),
    /// Protocol notice with no content to render
    Control { kind: String, message: Option<String> },
}

impl InboundFrame {
    /// Classify a text frame
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let object = value
            .as_object()
            .ok_or_else(|| FrameError::Unrecognised("frame is not a JSON object".to_string()))?;

        // Any truthy `error` wins over everything else in the frame
        match object.get("error") {
            None | Some(Value::Null) | Some(Value::Bool(false)) => {}
            Some(Value::String(error)) if error.is_empty() => {}
            Some(Value::String(error)) => return Ok(InboundFrame::Error(error.clone())),
            Some(other) => return Ok(InboundFrame::Error(other.to_string())),
        }

        if object.contains_key("content") {
            return Ok(InboundFrame::Message(ChatMessage::deserialize(&value)?));
        }

        if let Some(kind) = object.get("type").and_then(Value::as_str) {
            return Ok(InboundFrame::Control {
                kind: kind.to_string(),
                message: object
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            });
        }

        Err(FrameError::Unrecognised(text.to_string()))
    }
}
