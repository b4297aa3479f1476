use std::fmt;

/// Why the last socket closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Closed on purpose by this client (tab hidden, unload)
    Intentional,
    /// Dropped or refused; eligible for backoff
    Failure,
    /// Closed with the auth-required code; never retried automatically
    Unauthorized,
}

/// Lifecycle state of the chat connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Never connected
    Idle,
    /// Socket constructed, handshake pending
    Connecting,
    /// Handshake done, frames flowing
    Open,
    /// No socket
    Closed(CloseReason),
    /// Backoff ceiling reached; waits for an external reset
    ExhaustedRetries,
}

impl ConnectionState {
    #[inline]
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }
}

impl Default for ConnectionState {
    fn default() -> Self {
        ConnectionState::Idle
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Idle => write!(f, "idle"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Open => write!(f, "open"),
            ConnectionState::Closed(CloseReason::Intentional) => write!(f, "closed (intentional)"),
            ConnectionState::Closed(CloseReason::Failure) => write!(f, "closed (failure)"),
            ConnectionState::Closed(CloseReason::Unauthorized) => write!(f, "closed (unauthorized)"),
            ConnectionState::ExhaustedRetries => write!(f, "retries exhausted"),
        }
    }
}
