//! Outbound notification channel.
//!
//! The engine decides *when* something is announced; implementations of
//! [`Notifier`] decide how it is rendered and delivered. Delivery failures are
//! returned to the engine, which logs them and moves on.

pub mod discord;
pub mod messages;

pub use discord::DiscordNotifier;

use crate::event::MaintenanceEvent;
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    Scheduled(MaintenanceEvent),
    Started(MaintenanceEvent),
    Ended(MaintenanceEvent),
    Updated {
        old: MaintenanceEvent,
        new: MaintenanceEvent,
    },
    Cancelled(MaintenanceEvent),
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::Scheduled(_) => "scheduled",
            Notification::Started(_) => "started",
            Notification::Ended(_) => "ended",
            Notification::Updated { .. } => "updated",
            Notification::Cancelled(_) => "cancelled",
        }
    }

    /// The event the notification is about (the new version for updates).
    pub fn event(&self) -> &MaintenanceEvent {
        match self {
            Notification::Scheduled(event)
            | Notification::Started(event)
            | Notification::Ended(event)
            | Notification::Cancelled(event) => event,
            Notification::Updated { new, .. } => new,
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<()>;
}

/// Notifier for deployments without an outbound channel.
#[derive(Debug, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        debug!(
            "No notification channel configured, dropping '{}' for {}",
            notification.kind(),
            notification.event().id
        );
        Ok(())
    }
}
