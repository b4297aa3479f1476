use super::peer::PeerId;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Name shown when a message carries no sender name
const UNKNOWN_SENDER: &str = "Unknown";

/// A chat message as delivered over the socket
///
/// Transient: handed to the presenter and then dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Sender display name
    #[serde(rename = "sender", default)]
    pub sender_name: Option<String>,
    pub sender_id: PeerId,
    pub content: String,
    /// ISO-8601 timestamp as sent by the server
    pub timestamp: String,
}

impl ChatMessage {
    /// Sender name, or "Unknown" when the server sent none
    pub fn display_sender(&self) -> &str {
        match self.sender_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => UNKNOWN_SENDER,
        }
    }

    /// Whether `user_id` wrote this message
    pub fn is_from(&self, user_id: &PeerId) -> bool {
        self.sender_id.as_str().trim() == user_id.as_str().trim()
    }

    /// Parse the timestamp; offset-less timestamps are taken as UTC
    pub fn parsed_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(&self.timestamp) {
            return Some(ts);
        }
        NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| Utc.from_utc_datetime(&naive).into())
    }

    /// Calendar day of the message in `tz`
    pub fn date_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<NaiveDate> {
        self.parsed_timestamp()
            .map(|ts| ts.with_timezone(tz).date_naive())
    }

    /// `HH:MM` in `tz`, or an empty string if the timestamp is unreadable
    pub fn time_label<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: Display,
    {
        self.parsed_timestamp()
            .map(|ts| ts.with_timezone(tz).format("%H:%M").to_string())
            .unwrap_or_default()
    }
}
