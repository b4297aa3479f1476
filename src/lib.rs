//! Chat Client - Main Library
//!
//! ## Architecture
//!
//! - **bin_common**: Common utilities for binary executables (CLI, runners)
//! - **chat**: Connection lifecycle, frames, history (re-exported from workspace)
//! - **chatsocket**: WebSocket transport library (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust
//! use chat_client::bin_common::{load_config_from_env, ConfigType};
//! use chat_client::chat::ChatConfig;
//! ```

// Re-export workspace libraries for convenience
pub use chat;
pub use chatsocket;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;
    pub mod commands;
    pub mod runner;

    pub use cli::{load_config_from_env, parse_args, ConfigType};
    pub use commands::{parse_command, InputCommand};
    pub use runner::{BinaryRunner, RunConfig};
}
