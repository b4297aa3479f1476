//! Common test utilities for ChatSocket integration tests
//!
//! This module provides a local websocket server for exercising the
//! tungstenite transport.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Notify;

use chatsocket::SocketEvent;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

/// A simple mock chat server for testing
///
/// Echoes text and binary frames back. A text frame of the form
/// `close:<code>` makes the server close the socket with that code.
pub struct MockWsServer {
    pub addr: SocketAddr,
    shutdown: Arc<Notify>,
}

impl MockWsServer {
    /// Create and start a new mock server
    pub async fn start() -> Self {
        Self::start_with_close_on_accept(None).await
    }

    /// Start a server that closes every socket with `code` right after the
    /// handshake, the way the chat server rejects anonymous users
    pub async fn start_with_close_on_accept(code: Option<u16>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, _)) => {
                                let shutdown = shutdown_clone.clone();
                                tokio::spawn(async move {
                                    Self::handle_connection(stream, shutdown, code).await;
                                });
                            }
                            Err(e) => {
                                eprintln!("Accept error: {}", e);
                                break;
                            }
                        }
                    }
                    _ = shutdown_clone.notified() => {
                        break;
                    }
                }
            }
        });

        Self { addr, shutdown }
    }

    async fn handle_connection(
        stream: tokio::net::TcpStream,
        shutdown: Arc<Notify>,
        close_on_accept: Option<u16>,
    ) {
        use futures::{SinkExt, StreamExt};
        use tokio_tungstenite::accept_async;
        use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
        use tokio_tungstenite::tungstenite::protocol::CloseFrame;
        use tokio_tungstenite::tungstenite::Message;

        let ws_stream = match accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                eprintln!("WebSocket handshake failed: {}", e);
                return;
            }
        };

        let (mut write, mut read) = ws_stream.split();

        let close_with = |code: u16| {
            Message::Close(Some(CloseFrame {
                code: CloseCode::from(code),
                reason: "".into(),
            }))
        };

        if let Some(code) = close_on_accept {
            let _ = write.send(close_with(code)).await;
            // Drain until the client answers the close
            while let Some(Ok(_)) = read.next().await {}
            return;
        }

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if let Some(code) = text.strip_prefix("close:") {
                                let code = code.parse().unwrap_or(1000);
                                let _ = write.send(close_with(code)).await;
                                while let Some(Ok(_)) = read.next().await {}
                                break;
                            }
                            if write.send(Message::Text(text)).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(msg)) => {
                            if msg.is_binary() {
                                if write.send(msg).await.is_err() {
                                    break;
                                }
                            } else if msg.is_close() {
                                break;
                            }
                        }
                        Some(Err(_)) | None => break,
                    }
                }
                _ = shutdown.notified() => {
                    break;
                }
            }
        }
    }

    /// Get the websocket URL for this server
    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws/chat/", self.addr)
    }

    /// Shutdown the server
    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}

impl Drop for MockWsServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Wait for the next socket event, failing the test after five seconds
pub async fn next_event(event_rx: &mut UnboundedReceiver<SocketEvent>) -> SocketEvent {
    tokio::time::timeout(Duration::from_secs(5), event_rx.recv())
        .await
        .expect("timed out waiting for socket event")
        .expect("event channel closed")
}
