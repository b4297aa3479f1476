//! # ChatSocket Traits
//!
//! Core traits and types shared by every chatsocket transport:
//!
//! - **Transport**: Open an identified socket to a URL
//! - **SocketHandle**: Send frames to, or close, one open socket
//! - **ReconnectionStrategy**: Control reconnection pacing
//!
//! ## Example
//!
//! ```rust,ignore
//! use chatsocket::*;
//!
//! let strategy = ExponentialBackoff::new(
//!     Duration::from_secs(1),
//!     Duration::from_secs(10),
//!     Some(5),
//! );
//! assert_eq!(strategy.next_delay(3), Some(Duration::from_secs(8)));
//! ```

pub mod error;
pub mod message;
pub mod reconnect;
pub mod transport;

// Re-export commonly used types
pub use error::{ChatSocketError, Result};
pub use message::WsMessage;
pub use reconnect::{ExponentialBackoff, FixedDelay, NeverReconnect, ReconnectionStrategy};
pub use transport::{HandshakeHeaders, SocketHandle, Transport};
