//! Push delivery backends

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

/// Expo-style gateways accept at most this many messages per request
const MAX_BATCH: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum PushError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Push gateway rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Recipient lookup failed: {0}")]
    Lookup(#[from] ranko_common::Error),

    #[error("{0}")]
    Other(String),
}

/// Delivers push notifications to device destinations
#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(&self, destination: &str, message: &PushMessage) -> Result<(), PushError>;

    /// Fan-out; the default sends one message at a time
    async fn send_bulk(
        &self,
        destinations: &[String],
        message: &PushMessage,
    ) -> Result<(), PushError> {
        for destination in destinations {
            self.send(destination, message).await?;
        }
        Ok(())
    }
}

/// Logs notifications instead of delivering them
#[derive(Debug, Clone, Default)]
pub struct LogPushSender;

#[async_trait]
impl PushSender for LogPushSender {
    async fn send(&self, destination: &str, message: &PushMessage) -> Result<(), PushError> {
        info!(
            "Push to {}: {} - {}",
            destination, message.title, message.body
        );
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct GatewayMessage<'a> {
    to: &'a str,
    title: &'a str,
    body: &'a str,
    sound: &'static str,
}

/// Posts JSON batches to an Expo-compatible push gateway
#[derive(Debug, Clone)]
pub struct HttpPushSender {
    client: reqwest::Client,
    endpoint: String,
    access_token: Option<String>,
}

impl HttpPushSender {
    pub fn new(endpoint: impl Into<String>, access_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            access_token,
        }
    }

    async fn post(&self, batch: &[GatewayMessage<'_>]) -> Result<(), PushError> {
        let mut request = self.client.post(&self.endpoint).json(batch);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PushError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Push gateway accepted {} message(s)", batch.len());
        Ok(())
    }
}

#[async_trait]
impl PushSender for HttpPushSender {
    async fn send(&self, destination: &str, message: &PushMessage) -> Result<(), PushError> {
        self.send_bulk(&[destination.to_string()], message).await
    }

    async fn send_bulk(
        &self,
        destinations: &[String],
        message: &PushMessage,
    ) -> Result<(), PushError> {
        for chunk in destinations.chunks(MAX_BATCH) {
            let batch: Vec<GatewayMessage<'_>> = chunk
                .iter()
                .map(|to| GatewayMessage {
                    to,
                    title: &message.title,
                    body: &message.body,
                    sound: "default",
                })
                .collect();
            self.post(&batch).await?;
        }
        Ok(())
    }
}
