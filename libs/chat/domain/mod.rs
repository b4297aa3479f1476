//! Domain Layer
//!
//! Contains the chat entities and the wire frames exchanged with the server.
//! This layer has no dependencies on infrastructure or application layers.

pub mod directory;
pub mod frames;
pub mod history;
pub mod message;
pub mod peer;

// Re-export domain entities
pub use directory::{filter_users, UserSummary};
pub use frames::{FrameError, InboundFrame, OutboundFrame};
pub use history::{group_by_day, DayGroup, HistoryView};
pub use message::ChatMessage;
pub use peer::PeerId;
