//! # ChatSocket
//!
//! Websocket plumbing for the chat client: a transport seam that opens
//! identified sockets, reports everything that happens to them as
//! [`SocketEvent`]s, and the reconnection strategies used to pace retries.
//!
//! ## Features
//!
//! - **Explicit socket identity**: every socket carries a [`SocketId`] so late
//!   callbacks from a superseded socket can be recognised and dropped
//! - **Single event stream**: open, frame, error and close notifications all
//!   arrive on one channel, in the order the socket produced them
//! - **Pluggable transport**: the [`Transport`] trait lets the state machine run
//!   against a fake in tests and tokio-tungstenite in production

pub mod traits;
pub mod core;

// Re-export all traits
pub use traits::*;

// Re-export core transport functionality
pub use core::{
    socket, tungstenite,
    socket::{CloseInfo, SocketEvent, SocketEventKind, SocketId},
    tungstenite::{TungsteniteSocket, TungsteniteTransport},
};

/// Type alias for Result with ChatSocketError
pub type Result<T> = std::result::Result<T, traits::ChatSocketError>;
