//! # ChatSocket Core
//!
//! Socket identity, the event vocabulary every transport speaks, and the
//! tokio-tungstenite transport.
//!
//! ## Example
//!
//! ```rust,ignore
//! use chatsocket::*;
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let (event_tx, mut event_rx) = mpsc::unbounded_channel();
//!     let mut transport = TungsteniteTransport::new(event_tx);
//!
//!     let socket = transport.open("ws://127.0.0.1:8001/ws/chat/", SocketId::new(1))?;
//!
//!     while let Some(event) = event_rx.recv().await {
//!         match event.kind {
//!             SocketEventKind::Opened => socket.send(WsMessage::from("hello"))?,
//!             SocketEventKind::Closed(info) => break,
//!             other => println!("{:?}", other),
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod socket;
pub mod tungstenite;

// Re-export main types
pub use socket::{CloseInfo, SocketEvent, SocketEventKind, SocketId};
pub use tungstenite::{TungsteniteSocket, TungsteniteTransport};

// Re-export traits for convenience
pub use crate::traits::*;
