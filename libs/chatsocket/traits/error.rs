use thiserror::Error;

/// Main error type for chatsocket
#[derive(Error, Debug)]
pub enum ChatSocketError {
    /// WebSocket protocol or I/O error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Connection closed unexpectedly
    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    /// The socket could not be constructed for this URL
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Channel send error (the socket task is gone)
    #[error("Channel send error: {0}")]
    ChannelSend(String),

    /// Frame parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for chatsocket operations
pub type Result<T> = std::result::Result<T, ChatSocketError>;
