//! Maintenance event model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One maintenance window as reported by the calendar.
///
/// Equality covers every field and is what reconciliation uses to tell an
/// unchanged occurrence from an edited one. Two events describe the same
/// occurrence when only their `id` matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaintenanceEvent {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl MaintenanceEvent {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            start_time,
            end_time,
        }
    }

    #[inline]
    pub fn is_same_occurrence(&self, other: &MaintenanceEvent) -> bool {
        self.id == other.id
    }

    #[inline]
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.start_time <= now
    }

    #[inline]
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.end_time < now
    }

    /// Both bounds lie in the past; such an event can no longer be armed.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.start_time < now && self.end_time < now
    }

    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }
}
