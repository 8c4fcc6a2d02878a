//! Central repository for timing constants and limits
//!
//! Constants are grouped by the part of the system that consumes them so the
//! engine, the calendar poller and the web surface share one source of truth.

use std::time::Duration;

/// Timer and state machine constants
pub mod timing {
    use super::Duration;

    /// How long after its start time an event may still auto-start
    pub const START_GRACE_SECONDS: i64 = 60;

    /// Lead time of the optional final notice before a maintenance starts
    pub const FINAL_NOTICE_SECONDS: i64 = 30;

    /// How long shutdown waits for in-flight timer callbacks
    pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);
}

/// Calendar feed constants
pub mod calendar {
    use super::Duration;

    /// Delay between startup and the first calendar poll
    pub const INITIAL_SYNC_DELAY: Duration = Duration::from_secs(60);

    /// Size of the look-ahead window requested from the calendar
    pub const LOOKAHEAD_DAYS: i64 = 30;

    /// Maximum number of events requested per poll
    pub const MAX_RESULTS: u32 = 10;

    /// Timeout for a single calendar request
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

    /// Default Google Calendar API root
    pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

    /// Value shipped in the generated config that must be replaced
    pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY_HERE";
}

/// Notification channel constants
pub mod notifications {
    /// Webhook request timeout
    pub const WEBHOOK_TIMEOUT_SECONDS: u64 = 10;

    /// Permission that opts a principal out of in-game maintenance notices
    pub const NOTICE_OPT_OUT_PERMISSION: &str = "maintenance.notice.off";

    /// Embed colours per notification kind
    pub const COLOR_SCHEDULED: u32 = 0xFFA500;
    pub const COLOR_STARTED: u32 = 0xFF0000;
    pub const COLOR_ENDED: u32 = 0x00FF00;
    pub const COLOR_UPDATED: u32 = 0xFFFF00;
    pub const COLOR_CANCELLED: u32 = 0x808080;
}

/// Limits and constraints
pub mod limits {
    /// Maximum number of entries returned by the schedule view
    pub const SCHEDULE_VIEW_LIMIT: usize = 5;
}

/// Default configuration values
pub mod defaults {
    pub const HOST: &str = "0.0.0.0";
    pub const PORT: u16 = 8095;
    pub const STATE_FILE: &str = "data/maintenance-state.json";
    pub const TIMEZONE: &str = "UTC";
    pub const CHECK_INTERVAL_MINUTES: u64 = 30;
    pub const EXEMPT_GROUP: &str = "admin";
    pub const KICK_MESSAGE: &str = "The server is under maintenance. Please wait until it ends.";
    pub const MOTD: &str = "Currently under maintenance\nPlease check back later";
    pub const VERSION_LABEL: &str = "Maintenance";
    pub const DISCORD_FOOTER: &str = "Maintenance Manager";

    /// Pre-maintenance notice lead times in minutes
    pub const NOTIFICATION_OFFSETS_MINUTES: [u32; 12] = [360, 300, 240, 180, 120, 60, 30, 20, 10, 5, 3, 1];
}
