//! Common test data and constants

use chrono::{DateTime, Duration, TimeZone, Utc};
use maintenance_manager::event::MaintenanceEvent;
use maintenance_manager::gateway::Principal;

/// Fixed "now" every harness starts from.
pub fn anchor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
}

/// Event starting `starts_in` after `now` and lasting `length`.
pub fn event_at(id: &str, now: DateTime<Utc>, starts_in: Duration, length: Duration) -> MaintenanceEvent {
    MaintenanceEvent::new(
        id,
        format!("Maintenance {}", id),
        "",
        now + starts_in,
        now + starts_in + length,
    )
}

/// One-hour window starting `hours` after `now`.
pub fn hourly(id: &str, now: DateTime<Utc>, hours: i64) -> MaintenanceEvent {
    event_at(id, now, Duration::hours(hours), Duration::hours(1))
}

pub fn principal(id: &str) -> Principal {
    Principal::new(id, format!("player-{}", id))
}

/// Common event ids
pub mod events {
    pub const A: &str = "a";
    pub const B: &str = "b";
    pub const C: &str = "c";
}

/// Common notification kinds
pub mod kinds {
    pub const SCHEDULED: &str = "scheduled";
    pub const STARTED: &str = "started";
    pub const ENDED: &str = "ended";
    pub const UPDATED: &str = "updated";
    pub const CANCELLED: &str = "cancelled";
}
