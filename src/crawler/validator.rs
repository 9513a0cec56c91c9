//! Link validation probes
//!
//! A link is live iff a response arrives within the timeout with a status
//! code below 400. Transport errors, timeouts and 4xx/5xx are all dead.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Outcome of probing one link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    /// Response received with a status below 400
    Live(u16),
    /// Response received with a 4xx or 5xx status
    Dead(u16),
    /// No response (transport error or timeout)
    Unreachable(String),
}

impl LinkStatus {
    /// Classifies a received status code
    pub fn from_status(status_code: u16) -> Self {
        if status_code < 400 {
            Self::Live(status_code)
        } else {
            Self::Dead(status_code)
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }
}

/// Existence probe for candidate links
#[async_trait]
pub trait LinkValidator: Send + Sync {
    async fn probe(&self, url: &str) -> LinkStatus;

    async fn is_live(&self, url: &str) -> bool {
        self.probe(url).await.is_live()
    }
}

/// Validator that issues a GET per link
#[derive(Debug, Clone)]
pub struct HttpLinkValidator {
    client: Client,
    timeout: Duration,
}

impl HttpLinkValidator {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl LinkValidator for HttpLinkValidator {
    async fn probe(&self, url: &str) -> LinkStatus {
        match self.client.get(url).timeout(self.timeout).send().await {
            Ok(response) => LinkStatus::from_status(response.status().as_u16()),
            Err(e) if e.is_timeout() => LinkStatus::Unreachable("Request timeout".to_string()),
            Err(e) => LinkStatus::Unreachable(e.to_string()),
        }
    }
}
