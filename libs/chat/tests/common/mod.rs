//! Common test utilities for chat client integration tests

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use async_trait::async_trait;
use chat::{ChatApiError, ChatClient, ChatEvent, ChatMessage, ConnectionState, HistorySource, PeerId};

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

/// Mock chat server
///
/// Answers every `{message, recipient_id}` frame with a chat message from
/// the recipient echoing the content. The content `/kick <code>` closes the
/// socket with that code instead.
pub struct ChatMockServer {
    pub addr: SocketAddr,
    shutdown: Arc<Notify>,
}

impl ChatMockServer {
    pub async fn start() -> Self {
        Self::start_with_close_on_accept(None).await
    }

    /// Close every socket with `code` right after the handshake
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
                            Err(_) => break,
                        }
                    }
                    _ = shutdown_clone.notified() => break,
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

        let Ok(ws_stream) = accept_async(stream).await else {
            return;
        };
        let (mut write, mut read) = ws_stream.split();

        let close_with = |code: u16| {
            Message::Close(Some(CloseFrame {
                code: CloseCode::from(code),
                reason: "".into(),
            }))
        };

        let _ = write
            .send(Message::Text(
                r#"{"type":"connection_established","message":"Connected to chat server"}"#
                    .to_string(),
            ))
            .await;

        if let Some(code) = close_on_accept {
            let _ = write.send(close_with(code)).await;
            while let Some(Ok(_)) = read.next().await {}
            return;
        }

        loop {
            tokio::select! {
                msg = read.next() => {
                    let text = match msg {
                        Some(Ok(Message::Text(text))) => text,
                        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                        Some(Ok(_)) => continue,
                    };

                    let frame: serde_json::Value = match serde_json::from_str(&text) {
                        Ok(frame) => frame,
                        Err(_) => {
                            let _ = write.send(Message::Text(r#"{"error":"Invalid JSON"}"#.to_string())).await;
                            continue;
                        }
                    };
                    let content = frame["message"].as_str().unwrap_or_default().to_string();

                    if let Some(code) = content.strip_prefix("/kick ") {
                        let code = code.parse().unwrap_or(1011);
                        let _ = write.send(close_with(code)).await;
                        while let Some(Ok(_)) = read.next().await {}
                        break;
                    }

                    let reply = serde_json::json!({
                        "id": 1,
                        "sender": "echo",
                        "sender_id": frame["recipient_id"],
                        "content": content,
                        "timestamp": "2024-03-01T10:00:00+00:00",
                    });
                    if write.send(Message::Text(reply.to_string())).await.is_err() {
                        break;
                    }
                }
                _ = shutdown.notified() => break,
            }
        }
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws/chat/", self.addr)
    }

    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}

impl Drop for ChatMockServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// History source with a canned answer
pub struct StaticHistory {
    pub messages: Vec<ChatMessage>,
    pub fail: bool,
}

impl StaticHistory {
    pub fn empty() -> Self {
        Self { messages: Vec::new(), fail: false }
    }

    pub fn failing() -> Self {
        Self { messages: Vec::new(), fail: true }
    }
}

#[async_trait]
impl HistorySource for StaticHistory {
    async fn fetch_history(&self, _peer: &PeerId) -> Result<Vec<ChatMessage>, ChatApiError> {
        if self.fail {
            return Err(ChatApiError::ApiError("Failed to fetch messages (500)".to_string()));
        }
        Ok(self.messages.clone())
    }
}

/// Collect events until one matches, failing the test after five seconds
pub async fn wait_for_event<F>(client: &ChatClient, mut matches: F) -> ChatEvent
where
    F: FnMut(&ChatEvent) -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        while let Some(event) = client.try_recv_event() {
            if matches(&event) {
                return event;
            }
        }
        assert!(tokio::time::Instant::now() < deadline, "timed out waiting for event");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Poll the mirrored state until it equals `state`
pub async fn wait_for_state(client: &ChatClient, state: ConnectionState) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while client.connection_state() != state {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {}, still {}",
            state,
            client.connection_state()
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
