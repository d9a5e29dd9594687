//! Slack delivery via `chat.postMessage`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, DeliveryError};
use crate::notify::compose::{Block, SlackMessage};

/// Delivery collaborator. Implementations report failures; callers decide
/// what to do with them.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, channel: &str, message: &SlackMessage) -> Result<(), DeliveryError>;
}

#[derive(Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    blocks: &'a [Block],
    text: &'a str,
}

#[derive(Deserialize)]
struct PostMessageResponse {
    ok: bool,
    error: Option<String>,
}

#[derive(Clone)]
pub struct SlackNotifier {
    base_url: String,
    token: String,
    http: Client,
}

impl SlackNotifier {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            http,
        })
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, channel: &str, message: &SlackMessage) -> Result<(), DeliveryError> {
        let url = format!("{}/api/chat.postMessage", self.base_url);
        let request = PostMessageRequest {
            channel,
            blocks: &message.blocks,
            text: &message.text,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await
            .map_err(|err| DeliveryError::network(err.to_string()))?;

        if !response.status().is_success() {
            return Err(DeliveryError::network(format!(
                "Slack returned HTTP {}",
                response.status()
            )));
        }

        let body = response
            .json::<PostMessageResponse>()
            .await
            .map_err(|err| DeliveryError::format(err.to_string()))?;

        if body.ok {
            Ok(())
        } else {
            Err(DeliveryError::Rejected {
                error: body.error.unwrap_or_else(|| "unknown_error".to_string()),
            })
        }
    }
}
