// File: manager/src/notifications/discord.rs
use super::messages::format_datetime;
use super::{Notification, Notifier};
use crate::config::DiscordConfig;
use crate::constants::notifications as consts;
use crate::errors::NotificationError;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct WebhookPayload {
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub timestamp: DateTime<Utc>,
    pub footer: EmbedFooter,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

/// Delivers maintenance notifications as Discord webhook embeds.
pub struct DiscordNotifier {
    webhook_url: String,
    enabled: bool,
    footer: String,
    timezone: Tz,
    client: Client,
}

impl DiscordNotifier {
    pub fn new(config: &DiscordConfig, timezone: Tz) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(consts::WEBHOOK_TIMEOUT_SECONDS))
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client for DiscordNotifier: {}", e))?;

        Ok(Self {
            webhook_url: config.webhook_url.trim().to_string(),
            enabled: config.enabled,
            footer: config.footer().to_string(),
            timezone,
            client,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && !self.webhook_url.is_empty()
    }

    pub fn render(&self, notification: &Notification) -> Embed {
        let when = |instant| format_datetime(instant, self.timezone);
        let details = |description: &str| {
            if description.is_empty() {
                String::new()
            } else {
                format!("\n\n**Details:** {}", description)
            }
        };

        let (title, description, color) = match notification {
            Notification::Scheduled(event) => (
                format!("🔧 Maintenance scheduled: {}", event.title),
                format!(
                    "**Start:** {}\n**Planned end:** {}{}\n\n⚠️ **The server cannot be joined while maintenance is in progress**",
                    when(event.start_time),
                    when(event.end_time),
                    details(&event.description)
                ),
                consts::COLOR_SCHEDULED,
            ),
            Notification::Started(event) => (
                format!("🚧 Maintenance started: {}", event.title),
                "Maintenance is in progress. Please wait until it ends.\n\n⚠️ **The server cannot be joined while maintenance is in progress**".to_string(),
                consts::COLOR_STARTED,
            ),
            Notification::Ended(event) => (
                format!("✅ Maintenance finished: {}", event.title),
                "Maintenance is complete. Thank you for your patience!".to_string(),
                consts::COLOR_ENDED,
            ),
            Notification::Updated { old, new } => (
                format!("🔄 Maintenance rescheduled: {}", new.title),
                format!(
                    "**Before:**\nStart: {}\nEnd: {}\n\n**After:**\nStart: {}\nEnd: {}{}",
                    when(old.start_time),
                    when(old.end_time),
                    when(new.start_time),
                    when(new.end_time),
                    details(&new.description)
                ),
                consts::COLOR_UPDATED,
            ),
            Notification::Cancelled(event) => (
                "❌ Maintenance cancelled".to_string(),
                format!(
                    "The following maintenance has been cancelled.\n\n**Title:** {}\n**Originally planned:** {} - {}",
                    event.title,
                    when(event.start_time),
                    when(event.end_time)
                ),
                consts::COLOR_CANCELLED,
            ),
        };

        Embed {
            title,
            description,
            color,
            timestamp: Utc::now(),
            footer: EmbedFooter {
                text: self.footer.clone(),
            },
        }
    }

    async fn send_webhook(&self, kind: &str, payload: &WebhookPayload) -> Result<()> {
        let failed = |reason: String| NotificationError::DeliveryFailed {
            kind: kind.to_string(),
            reason,
        };

        match timeout(
            Duration::from_secs(consts::WEBHOOK_TIMEOUT_SECONDS),
            self.client.post(&self.webhook_url).json(payload).send(),
        )
        .await
        {
            Ok(Ok(response)) => {
                if response.status().is_success() {
                    info!("Discord notification sent: {}", kind);
                    Ok(())
                } else {
                    warn!("Discord webhook returned status {} for {}", response.status(), kind);
                    Err(failed(format!("status {}", response.status())).into())
                }
            }
            Ok(Err(e)) => {
                warn!("Failed to send Discord notification {}: {}", kind, e);
                Err(failed(e.to_string()).into())
            }
            Err(_) => {
                warn!("Discord webhook timeout for {}", kind);
                Err(failed("timeout".to_string()).into())
            }
        }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        if !self.enabled {
            debug!("Discord notifications disabled, skipping {}", notification.kind());
            return Ok(());
        }

        if self.webhook_url.is_empty() {
            warn!("Discord webhook URL is not configured, skipping {}", notification.kind());
            return Ok(());
        }

        let payload = WebhookPayload {
            embeds: vec![self.render(notification)],
        };

        self.send_webhook(notification.kind(), &payload).await
    }
}
