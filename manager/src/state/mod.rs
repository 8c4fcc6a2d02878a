//! Durable snapshot of the maintenance schedule.
//!
//! The snapshot is a small JSON document rewritten after every mutation of the
//! schedule or the mode. A missing file means "no state"; an unreadable one is
//! treated the same way so a corrupt write can never block startup.

use crate::errors::StateError;
use crate::event::MaintenanceEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info, warn};

/// On-disk shape of the snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub maintenance_mode_active: bool,
    #[serde(default)]
    pub events: Vec<PersistedEvent>,
    #[serde(default)]
    pub notification_sent_map: HashMap<String, bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedEvent {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl From<&MaintenanceEvent> for PersistedEvent {
    fn from(event: &MaintenanceEvent) -> Self {
        Self {
            id: event.id.clone(),
            title: event.title.clone(),
            description: event.description.clone(),
            start_time: event.start_time,
            end_time: event.end_time,
        }
    }
}

impl From<PersistedEvent> for MaintenanceEvent {
    fn from(event: PersistedEvent) -> Self {
        MaintenanceEvent {
            id: event.id,
            title: event.title,
            description: event.description,
            start_time: event.start_time,
            end_time: event.end_time,
        }
    }
}

impl PersistedState {
    pub fn new<'a>(
        maintenance_mode_active: bool,
        events: impl IntoIterator<Item = &'a MaintenanceEvent>,
        notification_sent_map: HashMap<String, bool>,
    ) -> Self {
        Self {
            maintenance_mode_active,
            events: events.into_iter().map(PersistedEvent::from).collect(),
            notification_sent_map,
        }
    }

    pub fn into_events(self) -> Vec<MaintenanceEvent> {
        self.events.into_iter().map(MaintenanceEvent::from).collect()
    }

    pub fn was_announced(&self, event_id: &str) -> bool {
        self.notification_sent_map
            .get(event_id)
            .copied()
            .unwrap_or(false)
    }
}

/// File-backed store for [`PersistedState`].
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> bool {
        fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// Load the snapshot, folding every failure into "no state".
    pub async fn load(&self) -> Option<PersistedState> {
        match self.try_load().await {
            Ok(Some(state)) => {
                info!(
                    "Maintenance state loaded from {} ({} events, maintenance mode: {})",
                    self.path.display(),
                    state.events.len(),
                    state.maintenance_mode_active
                );
                Some(state)
            }
            Ok(None) => {
                debug!("No maintenance state file at {}", self.path.display());
                None
            }
            Err(e) => {
                error!("{} - starting without persisted state", e);
                None
            }
        }
    }

    pub async fn try_load(&self) -> Result<Option<PersistedState>, StateError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StateError::ReadFailed {
                    path: self.path.display().to_string(),
                    reason: e.to_string(),
                })
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| StateError::Corrupt {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })
    }

    /// Write the snapshot through a temporary file so readers never observe a
    /// half-written document.
    pub async fn save(&self, state: &PersistedState) -> Result<(), StateError> {
        let write_failed = |reason: String| StateError::WriteFailed {
            path: self.path.display().to_string(),
            reason,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| write_failed(e.to_string()))?;
        }

        let rendered = serde_json::to_string_pretty(state).map_err(|e| write_failed(e.to_string()))?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, rendered)
            .await
            .map_err(|e| write_failed(e.to_string()))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| write_failed(e.to_string()))?;

        debug!(
            "Maintenance state saved to {} ({} events)",
            self.path.display(),
            state.events.len()
        );
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), StateError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                info!("Maintenance state file {} deleted", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!("Failed to delete {}: {}", self.path.display(), e);
                Err(StateError::ClearFailed {
                    path: self.path.display().to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }
}
