use crate::traits::WsMessage;
use std::fmt;

/// Close code used when the socket ended without a close frame
/// (network drop, failed handshake)
pub const ABNORMAL_CLOSURE: u16 = 1006;

/// Identity of one socket instance
///
/// Assigned by the owner from a monotonic counter, so two sockets opened
/// one after another never share an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SocketId(u64);

impl SocketId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The id that follows this one
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for SocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Close code and reason reported when a socket ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    pub code: u16,
    pub reason: String,
}

impl CloseInfo {
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// Close without a close frame from the peer
    pub fn abnormal(reason: impl Into<String>) -> Self {
        Self::new(ABNORMAL_CLOSURE, reason)
    }
}

/// Something that happened to a socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEventKind {
    /// Handshake completed
    Opened,
    /// Data frame received
    Frame(WsMessage),
    /// Transport error; a `Closed` event always follows
    Error(String),
    /// Socket is gone; no further events for this id
    Closed(CloseInfo),
}

/// Event tagged with the socket it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketEvent {
    pub socket_id: SocketId,
    pub kind: SocketEventKind,
}

impl SocketEvent {
    pub fn new(socket_id: SocketId, kind: SocketEventKind) -> Self {
        Self { socket_id, kind }
    }
}
