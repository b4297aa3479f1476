//! Infrastructure Layer
//!
//! REST client, configuration loading and logging setup.
//! This layer depends on the domain layer but not on the application layer.

pub mod client;
pub mod config;
pub mod logging;

pub use client::{ChatApiClient, ChatApiError, HistoryRecord};
pub use config::{ChatConfig, ConfigError, ReconnectConfig, ServerConfig};
pub use logging::init_tracing;
