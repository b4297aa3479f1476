//! Connection lifecycle state machine
//!
//! ```text
//!            connect()                 on_open
//!   Idle ───────────────> Connecting ───────────> Open
//!    ^                      │   ^                   │
//!    │              on_close│   │timer fires        │ on_close
//!    │                      v   │ (attempt += 1)    v
//!    │            Closed(Failure) <─────────────────┤ (unrequested)
//!    │                      │                       │
//!    │      ceiling reached │                       ├──> Closed(Intentional)
//!    │                      v                       └──> Closed(Unauthorized)
//!    └── visible ──── ExhaustedRetries
//! ```
//!
//! The manager is a plain owned value. Every input arrives through one of
//! the named transition functions; every output leaves through the
//! [`Transport`], the [`ReconnectScheduler`] or the [`Presenter`].

use super::scheduler::{ReconnectScheduler, TimerToken};
use super::state::{CloseReason, ConnectionState};
use crate::application::presenter::{ChatEvent, ConnectionStatus, Presenter};
use crate::domain::{InboundFrame, OutboundFrame, PeerId};
use chatsocket::{
    CloseInfo, ExponentialBackoff, ReconnectionStrategy, SocketHandle, SocketId, Transport,
    WsMessage,
};
use tracing::{debug, error, info, warn};

/// Close code the chat server uses for "authentication required"
pub const AUTH_REQUIRED_CLOSE_CODE: u16 = 4001;

/// Static settings for a [`ConnectionManager`]
pub struct ManagerSettings {
    pub url: String,
    pub auth_close_code: u16,
    pub strategy: Box<dyn ReconnectionStrategy>,
}

impl ManagerSettings {
    /// Defaults: 1s doubling to 10s, five attempts, auth code 4001
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth_close_code: AUTH_REQUIRED_CLOSE_CODE,
            strategy: Box::new(ExponentialBackoff::default()),
        }
    }

    pub fn strategy(mut self, strategy: impl ReconnectionStrategy + 'static) -> Self {
        self.strategy = Box::new(strategy);
        self
    }

    pub fn auth_close_code(mut self, code: u16) -> Self {
        self.auth_close_code = code;
        self
    }
}

/// Owns the chat socket and its reconnect policy
pub struct ConnectionManager<T, S, P>
where
    T: Transport,
    S: ReconnectScheduler,
    P: Presenter,
{
    settings: ManagerSettings,
    transport: T,
    scheduler: S,
    presenter: P,
    state: ConnectionState,
    socket: Option<T::Socket>,
    last_socket_id: SocketId,
    reconnect_attempt: u32,
    is_connecting: bool,
    intentional_close: bool,
    pending_reconnect: Option<TimerToken>,
    last_timer: TimerToken,
    selected_peer: Option<PeerId>,
}

impl<T, S, P> ConnectionManager<T, S, P>
where
    T: Transport,
    S: ReconnectScheduler,
    P: Presenter,
{
    pub fn new(settings: ManagerSettings, transport: T, scheduler: S, presenter: P) -> Self {
        Self {
            settings,
            transport,
            scheduler,
            presenter,
            state: ConnectionState::Idle,
            socket: None,
            last_socket_id: SocketId::new(0),
            reconnect_attempt: 0,
            is_connecting: false,
            intentional_close: false,
            pending_reconnect: None,
            last_timer: TimerToken::new(0),
            selected_peer: None,
        }
    }

    #[inline]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    #[inline]
    pub fn reconnect_attempt(&self) -> u32 {
        self.reconnect_attempt
    }

    /// Id of the socket currently owned, if any
    pub fn socket_id(&self) -> Option<SocketId> {
        self.socket.as_ref().map(SocketHandle::id)
    }

    pub fn has_pending_reconnect(&self) -> bool {
        self.pending_reconnect.is_some()
    }

    pub fn selected_peer(&self) -> Option<&PeerId> {
        self.selected_peer.as_ref()
    }

    /// Change the selected conversation; inbound rendering is gated on it
    pub fn select_peer(&mut self, peer: Option<PeerId>) {
        debug!(peer = ?peer, "Selected peer changed");
        self.selected_peer = peer;
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Open a socket unless one is already in flight or open
    pub fn connect(&mut self) {
        if self.is_connecting {
            debug!("Connection attempt already in flight");
            return;
        }
        if self.state.is_open() {
            debug!("Socket already open");
            return;
        }

        self.is_connecting = true;
        self.intentional_close = false;
        self.cancel_pending_reconnect();

        if let Some(previous) = self.socket.take() {
            debug!(socket_id = %previous.id(), "Closing superseded socket");
            previous.close();
        }

        let id = self.last_socket_id.next();
        self.last_socket_id = id;

        info!(socket_id = %id, "Attempting to connect to {}", self.settings.url);

        match self.transport.open(&self.settings.url, id) {
            Ok(socket) => {
                self.socket = Some(socket);
                self.state = ConnectionState::Connecting;
            }
            Err(e) => {
                error!("Error creating socket: {}", e);
                self.is_connecting = false;
                self.state = ConnectionState::Closed(CloseReason::Failure);
                self.presenter
                    .present(ChatEvent::Status(ConnectionStatus::ConnectFailed(e.to_string())));
            }
        }
    }

    /// Handshake completed
    ///
    /// Returns `true` when the event belonged to the current socket.
    pub fn on_open(&mut self, id: SocketId) -> bool {
        if !self.is_current(id) {
            debug!(socket_id = %id, "Ignoring open from stale socket");
            return false;
        }

        info!(socket_id = %id, "Connection established");
        self.is_connecting = false;
        self.reconnect_attempt = 0;
        self.state = ConnectionState::Open;

        if self.selected_peer.is_some() {
            self.presenter
                .present(ChatEvent::Status(ConnectionStatus::Connected));
        }
        true
    }

    /// Data frame received
    pub fn on_frame(&mut self, id: SocketId, message: WsMessage) {
        if !self.is_current(id) {
            debug!(socket_id = %id, "Ignoring frame from stale socket");
            return;
        }

        let Some(text) = message.as_text() else {
            warn!(socket_id = %id, bytes = message.len(), "Ignoring binary frame");
            return;
        };

        match InboundFrame::parse(text) {
            Ok(InboundFrame::Error(error)) => {
                warn!("Received error: {}", error);
                if self.selected_peer.is_some() {
                    self.presenter.present(ChatEvent::ServerError(error));
                }
            }
            Ok(InboundFrame::Message(message)) => {
                debug!(sender = %message.sender_id, "Received message");
                if self.selected_peer.is_some() {
                    self.presenter.present(ChatEvent::MessageReceived(message));
                }
            }
            Ok(InboundFrame::Control { kind, message }) => {
                debug!(kind = %kind, message = ?message, "Received control frame");
            }
            Err(e) => {
                warn!("Error processing message: {}", e);
            }
        }
    }

    /// Transport error; a close for the same socket follows
    pub fn on_error(&mut self, id: SocketId, error: &str) {
        if !self.is_current(id) {
            debug!(socket_id = %id, "Ignoring error from stale socket");
            return;
        }

        error!(socket_id = %id, "WebSocket error: {}", error);
        self.is_connecting = false;
    }

    /// Socket closed
    pub fn on_close(&mut self, id: SocketId, info: &CloseInfo) {
        if !self.is_current(id) {
            debug!(socket_id = %id, "Ignoring close from stale socket");
            return;
        }

        info!(
            socket_id = %id,
            code = info.code,
            reason = %info.reason,
            "WebSocket connection closed"
        );
        self.socket = None;
        self.is_connecting = false;

        if info.code == self.settings.auth_close_code {
            warn!("Server requires authentication, not reconnecting");
            self.cancel_pending_reconnect();
            self.state = ConnectionState::Closed(CloseReason::Unauthorized);
            self.presenter
                .present(ChatEvent::Status(ConnectionStatus::AuthRequired));
            return;
        }

        if self.intentional_close {
            info!("Connection closed intentionally");
            self.state = ConnectionState::Closed(CloseReason::Intentional);
            return;
        }

        self.presenter
            .present(ChatEvent::Status(ConnectionStatus::Disconnected));
        self.schedule_reconnect();
    }

    /// Reconnect timer elapsed
    pub fn on_reconnect_due(&mut self, token: TimerToken) {
        if self.pending_reconnect != Some(token) {
            debug!(token = %token, "Ignoring stale reconnect timer");
            return;
        }

        self.pending_reconnect = None;
        self.reconnect_attempt += 1;
        info!(attempt = self.reconnect_attempt, "Attempting to reconnect");
        self.connect();
    }

    /// Host visibility changed (tab hidden / shown)
    pub fn on_visibility_change(&mut self, visible: bool) {
        if !visible {
            if self.state.is_open() {
                debug!("Hidden, closing connection");
                self.mark_intentional_close();
                self.close();
            }
            return;
        }

        if !self.state.is_open() {
            debug!("Visible again, reconnecting");
            self.reconnect_attempt = 0;
            self.connect();
        }
    }

    /// Host is going away
    pub fn on_unload(&mut self) {
        self.mark_intentional_close();
        self.close();
    }

    /// Flag the next close as requested by this client
    pub fn mark_intentional_close(&mut self) {
        self.intentional_close = true;
    }

    /// Close the current socket
    ///
    /// After [`mark_intentional_close`](Self::mark_intentional_close) this also
    /// cancels any pending reconnect.
    pub fn close(&mut self) {
        if self.intentional_close && self.pending_reconnect.is_some() {
            self.cancel_pending_reconnect();
            if self.socket.is_none() {
                self.state = ConnectionState::Closed(CloseReason::Intentional);
            }
        }

        if let Some(socket) = &self.socket {
            debug!(socket_id = %socket.id(), "Closing socket");
            socket.close();
        }
    }

    /// Send `text` to the selected peer
    ///
    /// Returns `false` (and transmits nothing) unless the socket is open and
    /// a peer is selected. Nothing is queued.
    pub fn send(&mut self, text: &str) -> bool {
        let Some(peer) = self.selected_peer.clone() else {
            debug!("Dropping message: no peer selected");
            return false;
        };
        if !self.state.is_open() {
            debug!(state = %self.state, "Dropping message: socket not open");
            return false;
        }
        let Some(socket) = &self.socket else {
            return false;
        };

        let frame = OutboundFrame::new(text, peer);
        let message = match frame.to_ws_message() {
            Ok(message) => message,
            Err(e) => {
                error!("Error encoding message: {}", e);
                return false;
            }
        };

        match socket.send(message) {
            Ok(()) => true,
            Err(e) => {
                error!("Error sending message: {}", e);
                false
            }
        }
    }

    fn is_current(&self, id: SocketId) -> bool {
        self.socket_id() == Some(id)
    }

    fn schedule_reconnect(&mut self) {
        match self.settings.strategy.next_delay(self.reconnect_attempt) {
            Some(delay) => {
                let token = self.last_timer.next();
                self.last_timer = token;
                self.pending_reconnect = Some(token);
                self.state = ConnectionState::Closed(CloseReason::Failure);

                info!("Reconnecting in {:?} (attempt {})", delay, self.reconnect_attempt + 1);
                self.scheduler.schedule(token, delay);
                self.presenter
                    .present(ChatEvent::Status(ConnectionStatus::Reconnecting {
                        attempt: self.reconnect_attempt + 1,
                        delay,
                    }));
            }
            None => {
                warn!(attempts = self.reconnect_attempt, "Max reconnection attempts reached");
                self.state = ConnectionState::ExhaustedRetries;
                self.presenter
                    .present(ChatEvent::Status(ConnectionStatus::RetriesExhausted));
            }
        }
    }

    fn cancel_pending_reconnect(&mut self) {
        if let Some(token) = self.pending_reconnect.take() {
            debug!(token = %token, "Cancelling pending reconnect");
            self.scheduler.cancel(token);
        }
    }
}
