//! Chat client core
//!
//! Connection lifecycle, message frames and history for a one-to-one chat
//! server reached over a websocket.
//!
//! # Layers
//!
//! - `domain`: messages, frames, peers, day grouping (no I/O)
//! - `application`: the connection state machine and its tokio driver
//! - `infrastructure`: REST client, YAML config, logging

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use infrastructure::{config, logging};

// Re-export commonly used items
pub use application::{
    ChannelPresenter, ChatClient, ChatEvent, CloseReason, ConnectionManager, ConnectionState,
    ConnectionStatus, HistorySource, ManagerSettings, Presenter, ReconnectScheduler, TimerToken,
    AUTH_REQUIRED_CLOSE_CODE,
};
pub use domain::{
    filter_users, group_by_day, ChatMessage, DayGroup, HistoryView, InboundFrame, OutboundFrame,
    PeerId, UserSummary,
};
pub use infrastructure::{init_tracing, ChatApiClient, ChatApiError, ChatConfig, ConfigError};
