//! Async driver for the connection manager
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐  DriverEvent (commands)   ┌──────────────────────────────┐
//! │ ChatClient │ ────────────────────────> │  Driver Task                 │
//! │  (handle)  │                           │   owns ConnectionManager     │
//! └─────┬──────┘                           │   select! {                  │
//!       ^                                  │     socket events            │
//!       │ ChatEvent (crossbeam)            │     commands / timers /      │
//!       └───────────────────────────────── │     history results }        │
//!                                          └──────────────────────────────┘
//! ```
//!
//! The manager is only ever touched from the driver task, so it needs no
//! locking. The connection state is mirrored into an `RwLock` for readers.

use super::connection::{
    ConnectionManager, ConnectionState, ManagerSettings, ReconnectScheduler, TimerToken,
};
use super::presenter::{ChannelPresenter, ChatEvent, Presenter};
use crate::domain::{ChatMessage, HistoryView, PeerId};
use crate::infrastructure::{ChatApiClient, ChatApiError, ChatConfig};
use async_trait::async_trait;
use chatsocket::{
    ChatSocketError, HandshakeHeaders, SocketEvent, SocketEventKind, TungsteniteTransport,
};
use crossbeam_channel::{unbounded, Receiver};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Source of conversation history
#[async_trait]
pub trait HistorySource: Send + Sync + 'static {
    async fn fetch_history(&self, peer: &PeerId) -> Result<Vec<ChatMessage>, ChatApiError>;
}

#[async_trait]
impl HistorySource for ChatApiClient {
    async fn fetch_history(&self, peer: &PeerId) -> Result<Vec<ChatMessage>, ChatApiError> {
        ChatApiClient::fetch_history(self, peer).await
    }
}

/// Caller requests forwarded to the driver task
#[derive(Debug)]
pub(crate) enum ClientCommand {
    SelectPeer(PeerId),
    ClearSelection,
    Send(String),
    VisibilityChanged(bool),
    Unload,
    Shutdown,
}

/// Everything the driver reacts to besides socket events
#[derive(Debug)]
pub(crate) enum DriverEvent {
    Command(ClientCommand),
    ReconnectDue(TimerToken),
    HistoryLoaded {
        peer: PeerId,
        result: Result<Vec<ChatMessage>, String>,
    },
}

/// Reconnect timers backed by `tokio::time::sleep`
pub(crate) struct TokioScheduler {
    tx: UnboundedSender<DriverEvent>,
    timers: HashMap<TimerToken, JoinHandle<()>>,
}

impl TokioScheduler {
    pub(crate) fn new(tx: UnboundedSender<DriverEvent>) -> Self {
        Self {
            tx,
            timers: HashMap::new(),
        }
    }
}

impl ReconnectScheduler for TokioScheduler {
    fn schedule(&mut self, token: TimerToken, delay: Duration) {
        self.timers.retain(|_, handle| !handle.is_finished());

        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(DriverEvent::ReconnectDue(token));
        });
        self.timers.insert(token, handle);
    }

    fn cancel(&mut self, token: TimerToken) {
        if let Some(handle) = self.timers.remove(&token) {
            handle.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.timers.drain() {
            handle.abort();
        }
    }
}

type LiveManager = ConnectionManager<TungsteniteTransport, TokioScheduler, ChannelPresenter>;

struct Driver<H: HistorySource> {
    manager: LiveManager,
    history: Arc<H>,
    driver_tx: UnboundedSender<DriverEvent>,
    state: Arc<RwLock<ConnectionState>>,
}

impl<H: HistorySource> Driver<H> {
    async fn run(
        mut self,
        mut socket_rx: UnboundedReceiver<SocketEvent>,
        mut driver_rx: UnboundedReceiver<DriverEvent>,
    ) {
        self.manager.connect();
        self.publish_state();

        loop {
            tokio::select! {
                Some(event) = socket_rx.recv() => {
                    self.on_socket_event(event);
                }
                event = driver_rx.recv() => match event {
                    Some(DriverEvent::Command(ClientCommand::Shutdown)) | None => {
                        info!("Chat client shutting down");
                        self.manager.on_unload();
                        self.publish_state();
                        break;
                    }
                    Some(event) => self.on_driver_event(event),
                },
            }
            self.publish_state();
        }
    }

    fn publish_state(&self) {
        *self.state.write() = self.manager.state();
    }

    fn on_socket_event(&mut self, event: SocketEvent) {
        let id = event.socket_id;
        match event.kind {
            SocketEventKind::Opened => {
                if self.manager.on_open(id) {
                    if let Some(peer) = self.manager.selected_peer().cloned() {
                        self.load_history(peer);
                    }
                }
            }
            SocketEventKind::Frame(message) => self.manager.on_frame(id, message),
            SocketEventKind::Error(error) => self.manager.on_error(id, &error),
            SocketEventKind::Closed(info) => self.manager.on_close(id, &info),
        }
    }

    fn on_driver_event(&mut self, event: DriverEvent) {
        match event {
            DriverEvent::Command(command) => self.on_command(command),
            DriverEvent::ReconnectDue(token) => self.manager.on_reconnect_due(token),
            DriverEvent::HistoryLoaded { peer, result } => {
                if self.manager.selected_peer() != Some(&peer) {
                    debug!(peer = %peer, "Discarding history for deselected peer");
                    return;
                }
                let view = match result {
                    Ok(messages) => HistoryView::from_messages(messages, &chrono::Local),
                    Err(e) => {
                        warn!(peer = %peer, "Error loading messages: {}", e);
                        HistoryView::LoadError(e)
                    }
                };
                self.manager
                    .presenter_mut()
                    .present(ChatEvent::History { peer, view });
            }
        }
    }

    fn on_command(&mut self, command: ClientCommand) {
        match command {
            ClientCommand::SelectPeer(peer) => {
                self.manager.select_peer(Some(peer.clone()));
                self.load_history(peer);
            }
            ClientCommand::ClearSelection => self.manager.select_peer(None),
            ClientCommand::Send(text) => {
                let text = text.trim();
                if text.is_empty() {
                    debug!("Ignoring empty message");
                    return;
                }
                self.manager.send(text);
            }
            ClientCommand::VisibilityChanged(visible) => {
                self.manager.on_visibility_change(visible)
            }
            ClientCommand::Unload => self.manager.on_unload(),
            // Handled by the run loop
            ClientCommand::Shutdown => {}
        }
    }

    fn load_history(&mut self, peer: PeerId) {
        self.manager.presenter_mut().present(ChatEvent::History {
            peer: peer.clone(),
            view: HistoryView::Loading,
        });

        let history = Arc::clone(&self.history);
        let tx = self.driver_tx.clone();
        tokio::spawn(async move {
            let result = history
                .fetch_history(&peer)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(DriverEvent::HistoryLoaded { peer, result });
        });
    }
}

/// Handle to a running chat connection
///
/// Presentation events arrive on an unbounded crossbeam channel; read them
/// with [`try_recv_event`](Self::try_recv_event) or
/// [`recv_event`](Self::recv_event).
pub struct ChatClient {
    command_tx: UnboundedSender<DriverEvent>,
    event_rx: Receiver<ChatEvent>,
    state: Arc<RwLock<ConnectionState>>,
    task_handle: Option<JoinHandle<()>>,
}

impl ChatClient {
    /// Spawn the driver task and start connecting
    ///
    /// Must be called from inside a Tokio runtime.
    pub fn start<H: HistorySource>(
        settings: ManagerSettings,
        headers: HandshakeHeaders,
        history: H,
    ) -> Self {
        let (socket_tx, socket_rx) = mpsc::unbounded_channel();
        let (driver_tx, driver_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = unbounded();
        let state = Arc::new(RwLock::new(ConnectionState::Idle));

        let transport = TungsteniteTransport::new(socket_tx).headers(headers);
        let manager = ConnectionManager::new(
            settings,
            transport,
            TokioScheduler::new(driver_tx.clone()),
            ChannelPresenter::new(event_tx),
        );

        let driver = Driver {
            manager,
            history: Arc::new(history),
            driver_tx: driver_tx.clone(),
            state: Arc::clone(&state),
        };
        let task_handle = tokio::spawn(driver.run(socket_rx, driver_rx));

        Self {
            command_tx: driver_tx,
            event_rx,
            state,
            task_handle: Some(task_handle),
        }
    }

    /// Start a client for the configured server, using its REST API for history
    pub fn from_config(config: &ChatConfig) -> Result<Self, ChatApiError> {
        let api = ChatApiClient::new(config.http_base_url(), config.session_cookie.as_deref())?;

        let mut headers = HandshakeHeaders::new();
        if let Some(cookie) = &config.session_cookie {
            headers.insert("Cookie".to_string(), cookie.clone());
        }

        let mut settings = ManagerSettings::new(config.ws_url())
            .auth_close_code(config.reconnect.auth_close_code);
        settings.strategy = config.reconnection_strategy();

        Ok(Self::start(settings, headers, api))
    }

    /// Switch the conversation and load its history
    pub fn select_peer(&self, peer: impl Into<PeerId>) -> chatsocket::Result<()> {
        self.command(ClientCommand::SelectPeer(peer.into()))
    }

    pub fn clear_selection(&self) -> chatsocket::Result<()> {
        self.command(ClientCommand::ClearSelection)
    }

    /// Send to the selected peer; blank text is dropped
    ///
    /// Nothing is queued: text sent while the socket is not open is lost.
    pub fn send(&self, text: impl Into<String>) -> chatsocket::Result<()> {
        self.command(ClientCommand::Send(text.into()))
    }

    pub fn visibility_changed(&self, visible: bool) -> chatsocket::Result<()> {
        self.command(ClientCommand::VisibilityChanged(visible))
    }

    pub fn unload(&self) -> chatsocket::Result<()> {
        self.command(ClientCommand::Unload)
    }

    #[inline]
    pub fn connection_state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Try to receive an event (non-blocking)
    pub fn try_recv_event(&self) -> Option<ChatEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Receive an event (blocking)
    pub fn recv_event(&self) -> std::result::Result<ChatEvent, crossbeam_channel::RecvError> {
        self.event_rx.recv()
    }

    /// Clone of the event receiver, for a dedicated rendering thread
    pub fn events(&self) -> Receiver<ChatEvent> {
        self.event_rx.clone()
    }

    /// Close the socket and stop the driver task
    pub async fn shutdown(mut self) {
        info!("Shutting down chat client");
        let _ = self.command_tx.send(DriverEvent::Command(ClientCommand::Shutdown));
        if let Some(handle) = self.task_handle.take() {
            let _ = handle.await;
        }
    }

    fn command(&self, command: ClientCommand) -> chatsocket::Result<()> {
        self.command_tx
            .send(DriverEvent::Command(command))
            .map_err(|e| ChatSocketError::ChannelSend(e.to_string()))
    }
}

impl Drop for ChatClient {
    /// The driver holds senders to its own channel, so it never sees the
    /// handle go away; tell it to stop explicitly.
    fn drop(&mut self) {
        if self.task_handle.is_some() {
            debug!("Chat client dropped without shutdown, stopping driver");
            let _ = self.command_tx.send(DriverEvent::Command(ClientCommand::Shutdown));
        }
    }
}
