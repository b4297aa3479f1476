//! HTTP API client for the chat server

pub mod rest;
pub mod types;

pub use rest::{ChatApiClient, ChatApiError, Result};
pub use types::HistoryRecord;
