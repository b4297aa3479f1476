//! REST client for message history and the user directory
//!
//! Both endpoints sit behind the server's session auth, so every request
//! carries the configured session cookie when one is set.

use super::types::HistoryRecord;
use crate::domain::{ChatMessage, PeerId, UserSummary};
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ChatApiError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Deserialization failed: {0}")]
    DeserializeFailed(String),

    #[error("Invalid session cookie: {0}")]
    InvalidCookie(String),
}

pub type Result<T> = std::result::Result<T, ChatApiError>;

/// HTTP client for the chat server's JSON API
#[derive(Debug, Clone)]
pub struct ChatApiClient {
    base_url: String,
    client: Client,
}

impl ChatApiClient {
    /// Create a client for `base_url` (e.g. `http://localhost:8000`)
    pub fn new(base_url: impl Into<String>, session_cookie: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = session_cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| ChatApiError::InvalidCookie(e.to_string()))?;
            headers.insert(COOKIE, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Conversation between the session user and `peer`, oldest first
    pub async fn fetch_history(&self, peer: &PeerId) -> Result<Vec<ChatMessage>> {
        let url = format!("{}/api/messages/", self.base_url);
        debug!("GET {} for peer {}", url, peer);

        let response = self
            .client
            .get(&url)
            .query(&[("user_id", peer.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!("History request failed ({})", status);
            return Err(ChatApiError::ApiError(format!(
                "Failed to fetch messages ({}): {}",
                status, error_text
            )));
        }

        let records: Vec<HistoryRecord> = response
            .json()
            .await
            .map_err(|e| ChatApiError::DeserializeFailed(e.to_string()))?;

        debug!("Fetched {} messages with peer {}", records.len(), peer);
        Ok(records.into_iter().map(ChatMessage::from).collect())
    }

    /// All users except the session user
    pub async fn fetch_users(&self) -> Result<Vec<UserSummary>> {
        let url = format!("{}/api/users/", self.base_url);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ChatApiError::ApiError(format!(
                "Failed to fetch users ({}): {}",
                status, error_text
            )));
        }

        let users: Vec<UserSummary> = response
            .json()
            .await
            .map_err(|e| ChatApiError::DeserializeFailed(e.to_string()))?;

        debug!("Fetched {} users", users.len());
        Ok(users)
    }
}
