//! Application Layer
//!
//! Drives the connection lifecycle and turns socket activity into
//! presentation events. Depends on the domain and infrastructure layers.

pub mod client;
pub mod connection;
pub mod presenter;

pub use client::{ChatClient, HistorySource};
pub use connection::{
    CloseReason, ConnectionManager, ConnectionState, ManagerSettings, ReconnectScheduler,
    TimerToken, AUTH_REQUIRED_CLOSE_CODE,
};
pub use presenter::{ChannelPresenter, ChatEvent, ConnectionStatus, Presenter};
