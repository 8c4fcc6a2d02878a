use crate::event::MaintenanceEvent;
use chrono::{DateTime, Utc};

/// Held maintenance windows, sorted ascending by start time with unique ids.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    events: Vec<MaintenanceEvent>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&MaintenanceEvent> {
        self.events.iter().find(|event| event.id == id)
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Insert or replace by id, keeping the start-time order. Events sharing a
    /// start time keep their insertion order.
    pub fn upsert(&mut self, event: MaintenanceEvent) -> Option<MaintenanceEvent> {
        let previous = self.remove(&event.id);
        let position = self
            .events
            .partition_point(|held| held.start_time <= event.start_time);
        self.events.insert(position, event);
        previous
    }

    pub fn remove(&mut self, id: &str) -> Option<MaintenanceEvent> {
        let position = self.events.iter().position(|event| event.id == id)?;
        Some(self.events.remove(position))
    }

    pub fn iter(&self) -> impl Iterator<Item = &MaintenanceEvent> {
        self.events.iter()
    }

    pub fn ids(&self) -> Vec<String> {
        self.events.iter().map(|event| event.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Earliest event that has not started yet.
    pub fn next_upcoming(&self, now: DateTime<Utc>) -> Option<&MaintenanceEvent> {
        self.events.iter().find(|event| event.start_time > now)
    }
}
