use crate::core::socket::SocketId;
use crate::error::Result;
use crate::message::WsMessage;
use std::collections::HashMap;

/// HTTP headers sent with the websocket handshake
pub type HandshakeHeaders = HashMap<String, String>;

/// Trait for opening sockets
///
/// `open` must return quickly: it only constructs the socket. The handshake
/// and everything after it are reported asynchronously as
/// [`SocketEvent`](crate::SocketEvent)s carrying the same `id`.
///
/// # Errors
/// Returns an error when the socket cannot even be constructed (bad URL,
/// no runtime). Failures after construction are events, never errors here.
pub trait Transport: Send {
    /// Handle type for one open socket
    type Socket: SocketHandle;

    /// Construct a socket to `url` and start its handshake
    fn open(&mut self, url: &str, id: SocketId) -> Result<Self::Socket>;
}

/// Handle to a single socket produced by a [`Transport`]
pub trait SocketHandle: Send {
    /// Identity assigned when the socket was opened
    fn id(&self) -> SocketId;

    /// Queue a frame for transmission
    fn send(&self, message: WsMessage) -> Result<()>;

    /// Start closing the socket
    ///
    /// A `Closed` event for this socket follows once the close completes.
    fn close(&self);
}
