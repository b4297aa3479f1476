//! tokio-tungstenite transport
//!
//! # Architecture
//!
//! Each call to [`TungsteniteTransport::open`] spawns one Tokio task that owns
//! the socket for its whole life:
//!
//! ```text
//! ┌──────────────────┐   SocketCommand    ┌──────────────────────┐
//! │ TungsteniteSocket│ ─────────────────> │  Socket Task         │
//! │ (handle)         │   (send / close)   │  1. Handshake        │
//! └──────────────────┘                    │  2. Read/write loop  │
//!                                         │  3. Report close     │
//!                                         └──────────┬───────────┘
//!                                                    │ SocketEvent (tagged with SocketId)
//!                                                    v
//!                                          shared event channel
//! ```
//!
//! Every task writes into the same event channel, so the owner sees events
//! from old and new sockets interleaved and tells them apart by id.

use crate::core::socket::{CloseInfo, SocketEvent, SocketEventKind, SocketId};
use crate::traits::*;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

/// Close code reported when a close frame carried no status
const NO_STATUS_RECEIVED: u16 = 1005;

/// Internal command messages for the socket task
#[derive(Debug)]
enum SocketCommand {
    /// Send a frame to the server
    Send(WsMessage),
    /// Close the socket
    Close,
}

/// Transport that opens sockets with tokio-tungstenite
///
/// Must be used from inside a Tokio runtime.
pub struct TungsteniteTransport {
    event_tx: UnboundedSender<SocketEvent>,
    headers: HandshakeHeaders,
}

impl TungsteniteTransport {
    /// Create a transport that reports all socket events on `event_tx`
    pub fn new(event_tx: UnboundedSender<SocketEvent>) -> Self {
        Self {
            event_tx,
            headers: HandshakeHeaders::new(),
        }
    }

    /// Add a header sent with every handshake
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Add several handshake headers
    pub fn headers(mut self, headers: HandshakeHeaders) -> Self {
        self.headers.extend(headers);
        self
    }

    fn build_request(&self, url: &str) -> Result<Request> {
        let mut request = url
            .into_client_request()
            .map_err(|e| ChatSocketError::InvalidUrl {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        for (key, value) in &self.headers {
            match key.parse::<http::header::HeaderName>() {
                Ok(header_name) => match value.parse::<http::header::HeaderValue>() {
                    Ok(header_value) => {
                        request.headers_mut().insert(header_name, header_value);
                    }
                    Err(_) => {
                        warn!("Invalid header value for key '{}'", key);
                    }
                },
                Err(_) => {
                    warn!("Invalid header name: {}", key);
                }
            }
        }

        Ok(request)
    }
}

impl Transport for TungsteniteTransport {
    type Socket = TungsteniteSocket;

    fn open(&mut self, url: &str, id: SocketId) -> Result<Self::Socket> {
        let request = self.build_request(url)?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ChatSocketError::Configuration(e.to_string()))?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let event_tx = self.event_tx.clone();

        debug!(socket_id = %id, "Opening socket to {}", url);
        runtime.spawn(run_socket(request, id, command_rx, event_tx));

        Ok(TungsteniteSocket { id, command_tx })
    }
}

/// Handle to one tokio-tungstenite socket
///
/// Dropping every handle closes the socket.
#[derive(Debug, Clone)]
pub struct TungsteniteSocket {
    id: SocketId,
    command_tx: UnboundedSender<SocketCommand>,
}

impl SocketHandle for TungsteniteSocket {
    fn id(&self) -> SocketId {
        self.id
    }

    fn send(&self, message: WsMessage) -> Result<()> {
        self.command_tx
            .send(SocketCommand::Send(message))
            .map_err(|e| ChatSocketError::ChannelSend(e.to_string()))
    }

    fn close(&self) {
        // Already-finished tasks have dropped their receiver; nothing to close
        let _ = self.command_tx.send(SocketCommand::Close);
    }
}

/// Socket task: handshake, then pump frames until either side closes
async fn run_socket(
    request: Request,
    id: SocketId,
    mut command_rx: UnboundedReceiver<SocketCommand>,
    event_tx: UnboundedSender<SocketEvent>,
) {
    let emit = |kind: SocketEventKind| {
        // The owner may already be gone during shutdown
        let _ = event_tx.send(SocketEvent::new(id, kind));
    };

    let connect = connect_async(request);
    tokio::pin!(connect);

    let ws_stream = loop {
        tokio::select! {
            result = &mut connect => {
                match result {
                    Ok((ws_stream, _response)) => break ws_stream,
                    Err(e) => {
                        error!(socket_id = %id, "Failed to connect: {}", e);
                        emit(SocketEventKind::Error(e.to_string()));
                        emit(SocketEventKind::Closed(CloseInfo::abnormal(e.to_string())));
                        return;
                    }
                }
            }
            cmd = command_rx.recv() => {
                match cmd {
                    Some(SocketCommand::Send(_)) => {
                        warn!(socket_id = %id, "Dropping frame sent before handshake completed");
                    }
                    Some(SocketCommand::Close) | None => {
                        debug!(socket_id = %id, "Closed before handshake completed");
                        emit(SocketEventKind::Closed(CloseInfo::abnormal(
                            "closed before handshake completed",
                        )));
                        return;
                    }
                }
            }
        }
    };

    info!(socket_id = %id, "Socket open");
    emit(SocketEventKind::Opened);

    let (mut write, mut read) = ws_stream.split();

    let close_info = loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Close(frame))) => {
                        let info = close_info_from_frame(frame);
                        debug!(socket_id = %id, code = info.code, "Server closed socket");
                        break info;
                    }
                    Some(Ok(msg)) => {
                        if let Some(ws_msg) = tungstenite_to_ws_message(msg) {
                            emit(SocketEventKind::Frame(ws_msg));
                        }
                    }
                    Some(Err(e)) => {
                        error!(socket_id = %id, "WebSocket error: {}", e);
                        emit(SocketEventKind::Error(e.to_string()));
                        break CloseInfo::abnormal(e.to_string());
                    }
                    None => {
                        warn!(socket_id = %id, "WebSocket stream closed");
                        break CloseInfo::abnormal("stream ended");
                    }
                }
            }
            cmd = command_rx.recv() => {
                match cmd {
                    Some(SocketCommand::Send(msg)) => {
                        if let Err(e) = write.send(ws_message_to_tungstenite(msg)).await {
                            error!(socket_id = %id, "Failed to send frame: {}", e);
                            emit(SocketEventKind::Error(e.to_string()));
                            break CloseInfo::abnormal(e.to_string());
                        }
                    }
                    Some(SocketCommand::Close) | None => {
                        debug!(socket_id = %id, "Closing socket");
                        let frame = CloseFrame {
                            code: CloseCode::Normal,
                            reason: "".into(),
                        };
                        let _ = write.send(Message::Close(Some(frame))).await;
                        let _ = write.close().await;
                        break CloseInfo::new(u16::from(CloseCode::Normal), "");
                    }
                }
            }
        }
    };

    emit(SocketEventKind::Closed(close_info));
}

fn close_info_from_frame(frame: Option<CloseFrame<'_>>) -> CloseInfo {
    match frame {
        Some(frame) => CloseInfo::new(u16::from(frame.code), frame.reason.into_owned()),
        None => CloseInfo::new(NO_STATUS_RECEIVED, ""),
    }
}

/// Convert WsMessage to tungstenite Message
fn ws_message_to_tungstenite(msg: WsMessage) -> Message {
    match msg {
        WsMessage::Text(text) => Message::Text(text),
        WsMessage::Binary(data) => Message::Binary(data),
    }
}

/// Convert tungstenite Message to WsMessage
fn tungstenite_to_ws_message(msg: Message) -> Option<WsMessage> {
    match msg {
        Message::Text(text) => Some(WsMessage::Text(text)),
        Message::Binary(data) => Some(WsMessage::Binary(data)),
        Message::Ping(_) | Message::Pong(_) | Message::Close(_) | Message::Frame(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_frame_code_is_reported() {
        let frame = CloseFrame {
            code: CloseCode::from(4001),
            reason: "auth".into(),
        };
        let info = close_info_from_frame(Some(frame));
        assert_eq!(info, CloseInfo::new(4001, "auth"));
    }

    #[test]
    fn test_missing_close_frame_is_no_status() {
        assert_eq!(close_info_from_frame(None).code, 1005);
    }

    #[test]
    fn test_control_frames_are_not_data() {
        assert!(tungstenite_to_ws_message(Message::Ping(vec![1])).is_none());
        assert_eq!(
            tungstenite_to_ws_message(Message::Text("hi".to_string())),
            Some(WsMessage::Text("hi".to_string()))
        );
    }

    #[test]
    fn test_invalid_url_is_construction_failure() {
        let (event_tx, _event_rx) = mpsc::unbounded_channel();
        let transport = TungsteniteTransport::new(event_tx);
        let err = transport.build_request("not a url").unwrap_err();
        assert!(matches!(err, ChatSocketError::InvalidUrl { .. }));
    }

    #[test]
    fn test_open_outside_runtime_fails() {
        let (event_tx, _event_rx) = mpsc::unbounded_channel();
        let mut transport = TungsteniteTransport::new(event_tx);
        let result = transport.open("ws://127.0.0.1:1/ws/chat/", SocketId::new(1));
        assert!(matches!(result, Err(ChatSocketError::Configuration(_))));
    }

    #[test]
    fn test_headers_are_applied() {
        let (event_tx, _event_rx) = mpsc::unbounded_channel();
        let transport = TungsteniteTransport::new(event_tx).header("Cookie", "sessionid=abc");
        let request = transport.build_request("ws://localhost:8001/ws/chat/").unwrap();
        assert_eq!(request.headers().get("cookie").unwrap(), "sessionid=abc");
    }
}
