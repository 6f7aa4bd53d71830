//! Event dispatch: classify presence changes, drive the session store, and
//! hand results to the notifier.
//!
//! The dispatcher is the single consumer of the gateway queue and the sole
//! owner of the [`SessionStore`], so every store mutation is serialized by
//! construction. Notification and LLM calls happen after the store has been
//! updated; their failures are logged and dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use sb_core::{ChannelId, PresenceUpdate, SessionChange, SessionStore, classify, format_duration};
use sb_llm::PraiseRequest;

use crate::notify::{COLOR_ENTER, COLOR_LEAVE, COLOR_NO_RECORD, Embed, EmbedAuthor, Notifier};

const MS_PER_HOUR: i64 = 3_600_000;
const MS_PER_MINUTE: i64 = 60_000;

/// Events forwarded from the ingress endpoint to the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayEvent {
    /// A member's voice state changed.
    PresenceUpdate(PresenceUpdate),
    /// A slash command was invoked.
    Command(CommandInvocation),
}

/// A slash-command invocation relayed by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandInvocation {
    /// Command name without the leading slash (`log`, `gemini`).
    pub command: String,
    /// Channel to reply in.
    pub channel_id: String,
    /// Display name of the invoking user.
    pub user_name: String,
    /// `/log` option: whole hours studied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<i64>,
    /// `/log` option: whole minutes studied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes: Option<i64>,
    /// `/log` option: free-form note about the session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// `/gemini` option: the prompt to forward.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

/// Classifies one presence event, applies it to the store, and renders the
/// notification to send, if any.
///
/// Pure apart from the store mutation: no I/O, no clock reads. Keeping
/// classification, state transition, and rendering in one synchronous step
/// means a presence event is fully accounted for before the next one is
/// looked at.
pub fn handle_presence(
    store: &mut SessionStore,
    update: &PresenceUpdate,
    watched: &ChannelId,
    now: DateTime<Utc>,
) -> Option<Embed> {
    let transition = classify(update, watched);
    let change = store.apply(transition, now)?;

    let name = display_name(update);
    let (description, color) = match change {
        SessionChange::Entered { .. } => (format!("{name} started studying 📚"), COLOR_ENTER),
        SessionChange::Left {
            duration_ms: Some(ms),
            ..
        } => (
            format!(
                "{name} finished studying 🍵\nTime spent growing: {}",
                format_duration(ms)
            ),
            COLOR_LEAVE,
        ),
        SessionChange::Left {
            duration_ms: None, ..
        } => (
            format!("{name} left the channel (no recorded entry time)"),
            COLOR_NO_RECORD,
        ),
    };

    Some(Embed {
        author: EmbedAuthor {
            name: name.to_string(),
            icon_url: update.avatar_url.clone(),
        },
        description,
        color,
        timestamp: now,
    })
}

/// Total milliseconds for a `/log` invocation, or `None` when the entered
/// time is missing, negative, zero, or absurdly large.
///
/// The options arrive as arbitrary JSON, so the arithmetic is checked:
/// overflow is an invalid study time, not a panic.
#[must_use]
pub fn log_duration_ms(hours: Option<i64>, minutes: Option<i64>) -> Option<i64> {
    let hours = hours.unwrap_or(0);
    let minutes = minutes.unwrap_or(0);
    if hours < 0 || minutes < 0 {
        return None;
    }
    let total = hours
        .checked_mul(MS_PER_HOUR)?
        .checked_add(minutes.checked_mul(MS_PER_MINUTE)?)?;
    (total > 0).then_some(total)
}

fn display_name(update: &PresenceUpdate) -> &str {
    if update.display_name.is_empty() {
        &update.member_id
    } else {
        &update.display_name
    }
}

/// Consumes gateway events and produces notifications.
pub struct Dispatcher {
    store: SessionStore,
    watched: ChannelId,
    notification_channel: ChannelId,
    notifier: Notifier,
    llm: sb_llm::Client,
}

impl Dispatcher {
    pub fn new(
        watched: ChannelId,
        notification_channel: ChannelId,
        notifier: Notifier,
        llm: sb_llm::Client,
    ) -> Self {
        Self {
            store: SessionStore::new(),
            watched,
            notification_channel,
            notifier,
            llm,
        }
    }

    /// Runs until the gateway queue closes. Each event is handled to
    /// completion before the next is received.
    pub async fn run(mut self, mut rx: mpsc::Receiver<GatewayEvent>) {
        while let Some(event) = rx.recv().await {
            match event {
                GatewayEvent::PresenceUpdate(update) => self.on_presence(&update).await,
                GatewayEvent::Command(invocation) => self.on_command(invocation).await,
            }
        }
        tracing::info!("gateway queue closed, dispatcher exiting");
    }

    async fn on_presence(&mut self, update: &PresenceUpdate) {
        let Some(embed) = handle_presence(&mut self.store, update, &self.watched, Utc::now())
        else {
            tracing::trace!(member = %update.member_id, "presence event ignored");
            return;
        };

        tracing::info!(
            member = %update.member_id,
            active = self.store.active_sessions(),
            "session transition"
        );
        if let Err(error) = self
            .notifier
            .send_embed(&self.notification_channel, &embed)
            .await
        {
            tracing::error!(%error, "failed to send presence notification");
        }
    }

    async fn on_command(&self, invocation: CommandInvocation) {
        let Ok(reply_channel) = ChannelId::new(invocation.channel_id.clone()) else {
            tracing::warn!(command = %invocation.command, "command without reply channel dropped");
            return;
        };

        let reply = match invocation.command.as_str() {
            "log" => self.run_log(&invocation).await,
            "gemini" => self.run_gemini(&invocation).await,
            other => {
                tracing::warn!(command = %other, "unknown command");
                "Error: unknown command.".to_string()
            }
        };

        if let Err(error) = self.notifier.send_text(&reply_channel, &reply).await {
            tracing::error!(%error, command = %invocation.command, "failed to send command reply");
        }
    }

    async fn run_log(&self, invocation: &CommandInvocation) -> String {
        let Some(duration_ms) = log_duration_ms(invocation.hours, invocation.minutes) else {
            return "Please enter a valid study time (hours or minutes must be at least 1)."
                .to_string();
        };

        let request = PraiseRequest {
            duration_ms,
            user_name: invocation.user_name.clone(),
            comment: invocation.comment.clone(),
        };
        match self.llm.praise(&request).await {
            Ok(praise) => praise,
            Err(error) => {
                tracing::warn!(%error, "praise generation failed, using fallback");
                sb_llm::fallback_praise()
            }
        }
    }

    async fn run_gemini(&self, invocation: &CommandInvocation) -> String {
        let prompt = invocation.prompt.as_deref().unwrap_or_default();
        if prompt.is_empty() {
            return "Please provide a prompt.".to_string();
        }

        match self.llm.generate(prompt).await {
            Ok(text) => text,
            Err(error) => {
                tracing::error!(%error, "gemini command failed");
                "An error occurred. Please try again.".to_string()
            }
        }
    }
}
