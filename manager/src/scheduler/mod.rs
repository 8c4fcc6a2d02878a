//! Periodic calendar polling.
//!
//! The feed is polled, not pushed: one run shortly after startup and then one
//! every `calendar.check_interval_minutes`. Each run hands the full fetched set
//! to [`MaintenanceEngine::reconcile`](crate::engine::MaintenanceEngine::reconcile).
//!
//! ```toml
//! [calendar]
//! enabled = true
//! api_key = "..."
//! calendar_id = "maintenance@example.com"
//! check_interval_minutes = 30
//! ```

pub mod sync;
pub use sync::CalendarSyncScheduler;
