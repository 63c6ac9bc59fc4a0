//! Best-effort message delivery.
//!
//! The pollers treat delivery as fire-and-forget: a failed post still
//! counts as "fired" in the ledger so a banned channel or closed DM does
//! not turn into a retry storm.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid response from discord")]
    InvalidResponse,
}

#[async_trait]
pub trait DeliveryAdapter: Send + Sync {
    async fn post_to_channel(&self, channel_id: &str, text: &str) -> Result<(), DeliveryError>;

    async fn send_direct_message(&self, user_id: &str, text: &str) -> Result<(), DeliveryError>;
}

/// Discord REST delivery. DMs require opening (or reusing) the DM channel
/// before posting; Discord dedupes the open call server-side.
#[derive(Clone)]
pub struct DiscordRest {
    http: Client,
    base: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct DmChannel {
    id: String,
}

impl DiscordRest {
    pub fn new(token: String, timeout: Duration) -> Result<Self, DeliveryError> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base: "https://discord.com/api/v10".to_string(),
            token,
        })
    }

    async fn post_message(&self, channel_id: &str, text: &str) -> Result<(), DeliveryError> {
        let url = format!("{}/channels/{}/messages", self.base, channel_id);
        self.http
            .post(&url)
            .header("Authorization", format!("Bot {}", self.token))
            .json(&json!({ "content": text }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl DeliveryAdapter for DiscordRest {
    #[instrument(skip(self, text), level = "debug")]
    async fn post_to_channel(&self, channel_id: &str, text: &str) -> Result<(), DeliveryError> {
        self.post_message(channel_id, text).await?;
        debug!("channel message delivered");
        Ok(())
    }

    #[instrument(skip(self, text), level = "debug")]
    async fn send_direct_message(&self, user_id: &str, text: &str) -> Result<(), DeliveryError> {
        let url = format!("{}/users/@me/channels", self.base);
        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bot {}", self.token))
            .json(&json!({ "recipient_id": user_id }))
            .send()
            .await?
            .error_for_status()?;

        let dm: DmChannel = resp.json().await.map_err(|_| DeliveryError::InvalidResponse)?;
        self.post_message(&dm.id, text).await?;

        debug!("direct message delivered");
        Ok(())
    }
}
