//! Wire types for the chat REST API

use crate::domain::{ChatMessage, PeerId};
use serde::{Deserialize, Serialize};

/// One row of `GET /api/messages/?user_id=<peer>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    /// Sender user id
    pub sender: PeerId,
    #[serde(default)]
    pub sender_username: Option<String>,
    pub recipient: PeerId,
    #[serde(default)]
    pub recipient_username: Option<String>,
    pub content: String,
    pub timestamp: String,
    #[serde(default)]
    pub is_read: bool,
}

impl From<HistoryRecord> for ChatMessage {
    fn from(record: HistoryRecord) -> Self {
        ChatMessage {
            id: Some(record.id),
            sender_name: record.sender_username,
            sender_id: record.sender,
            content: record.content,
            timestamp: record.timestamp,
        }
    }
}
