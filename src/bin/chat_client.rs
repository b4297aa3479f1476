use anyhow::Result;
use chat::{
    filter_users, init_tracing, ChatApiClient, ChatClient, ChatConfig, ChatEvent, ChatMessage,
    ConnectionStatus, HistoryView, PeerId,
};
use chat_client::bin_common::{
    load_config_from_env, parse_args, parse_command, BinaryRunner, ConfigType, InputCommand,
    RunConfig,
};
use std::thread;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

struct ChatApp {
    config: ChatConfig,
    run_config: RunConfig,
    api: ChatApiClient,
}

impl ChatApp {
    fn new(config: ChatConfig) -> Result<Self> {
        let api = ChatApiClient::new(config.http_base_url(), config.session_cookie.as_deref())?;
        Ok(Self {
            config,
            run_config: RunConfig::new("Chat client").with_heartbeat(60),
            api,
        })
    }

    async fn list_users(&self, term: Option<&str>) {
        match self.api.fetch_users().await {
            Ok(users) => {
                let matches = filter_users(&users, term.unwrap_or(""));
                if matches.is_empty() {
                    println!("-- no users found --");
                }
                for user in matches {
                    println!("  [{}] {}", user.id, user.username);
                }
            }
            Err(e) => error!("Error loading users: {}", e),
        }
    }
}

impl BinaryRunner for ChatApp {
    async fn run(&mut self) -> Result<()> {
        let client = ChatClient::from_config(&self.config)?;

        // Render on a dedicated thread; exits when the client's driver stops
        let events = client.events();
        let me = self.config.current_user_id.clone();
        let renderer = thread::spawn(move || {
            while let Ok(event) = events.recv() {
                render(&event, me.as_ref());
            }
        });

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut heartbeat = tokio::time::interval(Duration::from_secs(
            self.run_config.heartbeat_interval_secs.max(1),
        ));
        heartbeat.tick().await;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        info!("stdin closed");
                        break;
                    };
                    match parse_command(&line) {
                        InputCommand::Peer(peer) => client.select_peer(peer)?,
                        InputCommand::Users(term) => self.list_users(term.as_deref()).await,
                        InputCommand::Hide => client.visibility_changed(false)?,
                        InputCommand::Show => client.visibility_changed(true)?,
                        InputCommand::Quit => break,
                        InputCommand::Message(text) => client.send(text)?,
                        InputCommand::Invalid(hint) => warn!("{}", hint),
                    }
                }
                _ = heartbeat.tick(), if self.run_config.heartbeat_interval_secs > 0 => {
                    info!("Heartbeat: connection {}", client.connection_state());
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received Ctrl+C");
                    break;
                }
            }
        }

        client.unload()?;
        client.shutdown().await;
        let _ = renderer.join();
        Ok(())
    }

    fn config(&self) -> &RunConfig {
        &self.run_config
    }
}

fn render(event: &ChatEvent, me: Option<&PeerId>) {
    match event {
        ChatEvent::Status(status) => println!("-- {} --", status_line(status)),
        ChatEvent::MessageReceived(message) => println!("{}", message_line(message, me)),
        ChatEvent::ServerError(error) => println!("-- error: {} --", error),
        ChatEvent::History { peer, view } => match view {
            HistoryView::Loading => println!("-- loading conversation with {} --", peer),
            HistoryView::Empty => println!("-- no messages yet, start a conversation! --"),
            HistoryView::LoadError(e) => println!("-- error loading messages: {} --", e),
            HistoryView::Loaded(groups) => {
                for group in groups {
                    println!("---------- {} ----------", group.label());
                    for message in &group.messages {
                        println!("{}", message_line(message, me));
                    }
                }
            }
        },
    }
}

fn status_line(status: &ConnectionStatus) -> String {
    match status {
        ConnectionStatus::Connected => "connected to chat server".to_string(),
        ConnectionStatus::Disconnected => "disconnected from chat server".to_string(),
        ConnectionStatus::Reconnecting { attempt, delay } => {
            format!("reconnecting in {}ms (attempt {})", delay.as_millis(), attempt)
        }
        ConnectionStatus::RetriesExhausted => {
            "unable to connect to chat server, use /show to retry".to_string()
        }
        ConnectionStatus::AuthRequired => "authentication required, please log in".to_string(),
        ConnectionStatus::ConnectFailed(e) => format!("failed to connect to chat server: {}", e),
    }
}

fn message_line(message: &ChatMessage, me: Option<&PeerId>) -> String {
    let own = me.is_some_and(|me| message.is_from(me));
    let who = if own { "you" } else { message.display_sender() };
    format!("[{}] {}: {}", message.time_label(&chrono::Local), who, message.content)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_type = match parse_args().into_iter().next() {
        Some(path) => ConfigType::Custom(path),
        None => ConfigType::Chat,
    };
    let config_path = load_config_from_env(config_type);

    init_tracing();
    let config = ChatConfig::load(&config_path)?;
    config.log();

    let mut app = ChatApp::new(config)?;
    app.execute().await
}
