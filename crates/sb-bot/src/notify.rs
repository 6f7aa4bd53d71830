//! Discord REST notification sink.
//!
//! Sends embed and plain-text messages to a channel via the Discord HTTP API.
//! Failures are returned to the caller, which logs and drops them; there is
//! no retry.

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use sb_core::ChannelId;

const DISCORD_API_BASE: &str = "https://discord.com/api/v10";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const ERROR_BODY_PREVIEW_CHARS: usize = 256;

/// Embed accent color for session-start notifications.
pub const COLOR_ENTER: u32 = 0x0000_ff00;
/// Embed accent color for session-end notifications.
pub const COLOR_LEAVE: u32 = 0x00ff_0000;
/// Embed accent color for the "left without a recorded start" notification.
pub const COLOR_NO_RECORD: u32 = 0x00ff_a500;

/// Author block of a notification embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedAuthor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// A structured notification message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub author: EmbedAuthor,
    pub description: String,
    pub color: u32,
    pub timestamp: DateTime<Utc>,
}

/// Discord REST client for outbound notifications.
pub struct Notifier {
    http: reqwest::Client,
    bot_token: String,
    api_base: String,
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("bot_token", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl Notifier {
    /// Creates a notifier authenticating with the given bot token.
    pub fn new(bot_token: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build Discord HTTP client")?;

        Ok(Self {
            http,
            bot_token: bot_token.into(),
            api_base: DISCORD_API_BASE.to_string(),
        })
    }

    /// Sends an embed message to the channel.
    pub async fn send_embed(&self, channel: &ChannelId, embed: &Embed) -> Result<()> {
        self.post_message(channel, json!({ "embeds": [embed] }))
            .await
    }

    /// Sends a plain text message to the channel.
    pub async fn send_text(&self, channel: &ChannelId, content: &str) -> Result<()> {
        if content.is_empty() {
            anyhow::bail!("message content cannot be empty");
        }
        self.post_message(channel, json!({ "content": content }))
            .await
    }

    async fn post_message(&self, channel: &ChannelId, payload: serde_json::Value) -> Result<()> {
        let url = format!("{}/channels/{channel}/messages", self.api_base);
        let response = self
            .http
            .post(url)
            .header("Authorization", format!("Bot {}", self.bot_token))
            .json(&payload)
            .send()
            .await
            .context("discord send request failed")?;
        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let preview = body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect::<String>();
        anyhow::bail!("discord send failed: status={status} body={preview}");
    }
}
