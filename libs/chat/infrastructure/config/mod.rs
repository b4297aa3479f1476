use crate::domain::PeerId;
use chatsocket::{ExponentialBackoff, NeverReconnect, ReconnectionStrategy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Chat client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub server: ServerConfig,
    pub reconnect: ReconnectConfig,
    /// Session user; used to tell own messages apart
    pub current_user_id: Option<PeerId>,

    /// Session cookie from .env (not in YAML)
    #[serde(skip)]
    pub session_cookie: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub ws_port: u16,
    pub ws_path: String,
    /// Use wss:// instead of ws://
    pub secure: bool,
    /// REST base URL; derived from `host` when unset
    pub http_base_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            ws_port: 8001,
            ws_path: "/ws/chat/".to_string(),
            secure: false,
            http_base_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    /// `false` disables automatic reconnection entirely
    pub enabled: bool,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_attempts: u32,
    pub auth_close_code: u16,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_delay_ms: 1000,
            max_delay_ms: 10000,
            max_attempts: 5,
            auth_close_code: 4001,
        }
    }
}

impl ChatConfig {
    /// Load configuration from YAML file and .env
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let yaml_content = std::fs::read_to_string(config_path)?;
        let mut config = Self::from_yaml_str(&yaml_content)?;

        // Load .env file
        dotenv::dotenv().ok(); // Don't fail if .env doesn't exist
        config.apply_env_overrides();

        config.validate()?;
        Ok(config)
    }

    /// Parse YAML; an empty document yields the defaults
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Apply `CHAT_*` environment variables on top of the file values
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("CHAT_HOST") {
            info!("Overriding host from environment variable");
            self.server.host = host;
        }
        if let Ok(base_url) = std::env::var("CHAT_HTTP_BASE_URL") {
            info!("Overriding HTTP base URL from environment variable");
            self.server.http_base_url = Some(base_url);
        }
        if let Ok(cookie) = std::env::var("CHAT_SESSION_COOKIE") {
            self.session_cookie = Some(cookie);
        }
        if let Ok(user_id) = std::env::var("CHAT_CURRENT_USER_ID") {
            self.current_user_id = Some(PeerId::new(user_id));
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "server.host cannot be empty".to_string(),
            ));
        }

        if self.server.ws_port == 0 {
            return Err(ConfigError::ValidationError(
                "server.ws_port must be greater than 0".to_string(),
            ));
        }

        if !self.server.ws_path.starts_with('/') {
            return Err(ConfigError::ValidationError(
                "server.ws_path must start with '/'".to_string(),
            ));
        }

        if self.reconnect.base_delay_ms == 0 {
            return Err(ConfigError::ValidationError(
                "reconnect.base_delay_ms must be greater than 0".to_string(),
            ));
        }

        if self.reconnect.max_delay_ms < self.reconnect.base_delay_ms {
            return Err(ConfigError::ValidationError(
                "reconnect.max_delay_ms must be >= base_delay_ms".to_string(),
            ));
        }

        // Standard close codes can't carry an application meaning
        if self.reconnect.auth_close_code < 4000 || self.reconnect.auth_close_code > 4999 {
            return Err(ConfigError::ValidationError(
                "reconnect.auth_close_code must be in 4000..=4999".to_string(),
            ));
        }

        Ok(())
    }

    /// Websocket endpoint, e.g. `ws://localhost:8001/ws/chat/`
    pub fn ws_url(&self) -> String {
        let scheme = if self.server.secure { "wss" } else { "ws" };
        format!(
            "{}://{}:{}{}",
            scheme, self.server.host, self.server.ws_port, self.server.ws_path
        )
    }

    /// REST base URL, defaulting to port 8000 on the same host
    pub fn http_base_url(&self) -> String {
        match &self.server.http_base_url {
            Some(url) => url.clone(),
            None => {
                let scheme = if self.server.secure { "https" } else { "http" };
                format!("{}://{}:8000", scheme, self.server.host)
            }
        }
    }

    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::new(
            Duration::from_millis(self.reconnect.base_delay_ms),
            Duration::from_millis(self.reconnect.max_delay_ms),
            Some(self.reconnect.max_attempts),
        )
    }

    /// Strategy handed to the connection manager
    pub fn reconnection_strategy(&self) -> Box<dyn ReconnectionStrategy> {
        if self.reconnect.enabled {
            Box::new(self.backoff())
        } else {
            Box::new(NeverReconnect)
        }
    }

    /// Log configuration summary
    pub fn log(&self) {
        info!("Configuration loaded:");
        info!("  WebSocket URL: {}", self.ws_url());
        info!("  HTTP base URL: {}", self.http_base_url());
        info!(
            "  Reconnect: {}ms doubling to {}ms, {} attempts",
            self.reconnect.base_delay_ms, self.reconnect.max_delay_ms, self.reconnect.max_attempts
        );
        info!(
            "  Session cookie: {}",
            if self.session_cookie.is_some() { "set" } else { "not set" }
        );
    }
}
