//! Calendar feed: the source of maintenance windows.

pub mod google;

pub use google::GoogleCalendarClient;

use crate::event::MaintenanceEvent;
use anyhow::Result;
use async_trait::async_trait;

/// Produces every maintenance window currently visible in the look-ahead
/// window. Each call returns the full set, not a delta.
#[async_trait]
pub trait CalendarFeed: Send + Sync {
    async fn fetch_events(&self) -> Result<Vec<MaintenanceEvent>>;
}
