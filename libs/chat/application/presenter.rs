//! Presentation seam
//!
//! The connection manager never renders anything. It describes what
//! happened as [`ChatEvent`]s and hands them to a [`Presenter`].

use crate::domain::{ChatMessage, HistoryView, PeerId};
use crossbeam_channel::Sender;
use std::time::Duration;
use tracing::debug;

/// Connection status line shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Socket open (only reported while a peer is selected)
    Connected,
    /// Socket lost unexpectedly
    Disconnected,
    /// Reconnect scheduled
    Reconnecting { attempt: u32, delay: Duration },
    /// Gave up; needs an external reset
    RetriesExhausted,
    /// Server refused the session; never retried automatically
    AuthRequired,
    /// Socket could not even be constructed
    ConnectFailed(String),
}

/// Event delivered to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    Status(ConnectionStatus),
    MessageReceived(ChatMessage),
    ServerError(String),
    History { peer: PeerId, view: HistoryView },
}

/// Receiver of presentation events
pub trait Presenter: Send {
    fn present(&mut self, event: ChatEvent);
}

/// Presenter that forwards events over an unbounded crossbeam channel
pub struct ChannelPresenter {
    tx: Sender<ChatEvent>,
}

impl ChannelPresenter {
    pub fn new(tx: Sender<ChatEvent>) -> Self {
        Self { tx }
    }
}

impl Presenter for ChannelPresenter {
    fn present(&mut self, event: ChatEvent) {
        if self.tx.send(event).is_err() {
            debug!("Presentation channel closed, dropping event");
        }
    }
}
