use super::message::ChatMessage;
use chrono::{NaiveDate, TimeZone};

/// Messages of one calendar day, in server order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayGroup {
    /// `None` collects messages whose timestamp could not be read
    pub date: Option<NaiveDate>,
    pub messages: Vec<ChatMessage>,
}

impl DayGroup {
    /// Separator label, e.g. "2024-03-01"
    pub fn label(&self) -> String {
        self.date
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "Unknown date".to_string())
    }
}

/// What the conversation pane should show for the selected peer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryView {
    /// Fetch in progress
    Loading,
    /// Fetch succeeded with zero messages ("no messages yet")
    Empty,
    /// Fetch succeeded
    Loaded(Vec<DayGroup>),
    /// Fetch failed; unrelated to the socket state
    LoadError(String),
}

impl HistoryView {
    /// Build the view for a successful fetch
    pub fn from_messages<Tz: TimeZone>(messages: Vec<ChatMessage>, tz: &Tz) -> Self {
        if messages.is_empty() {
            HistoryView::Empty
        } else {
            HistoryView::Loaded(group_by_day(messages, tz))
        }
    }
}

/// Bucket messages by calendar day in `tz`
///
/// Groups appear in order of their first message and keep message order
/// within a day.
pub fn group_by_day<Tz: TimeZone>(messages: Vec<ChatMessage>, tz: &Tz) -> Vec<DayGroup> {
    let mut groups: Vec<DayGroup> = Vec::new();

    for message in messages {
        let date = message.date_in(tz);
        match groups.iter_mut().find(|group| group.date == date) {
            Some(group) => group.messages.push(message),
            None => groups.push(DayGroup {
                date,
                messages: vec![message],
            }),
        }
    }

    groups
}
