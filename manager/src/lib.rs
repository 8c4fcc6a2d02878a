pub mod calendar;
pub mod clock;
pub mod config;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod gateway;
pub mod notifications;
pub mod scheduler;
pub mod state;
pub mod web;

// Re-export commonly used types
pub use calendar::{CalendarFeed, GoogleCalendarClient};
pub use clock::{Clock, SystemClock, TokioClock};
pub use config::{Config, ConfigManager};
pub use engine::{EngineSettings, MaintenanceEngine, Mode};
pub use event::MaintenanceEvent;
pub use gateway::{ExemptionPolicy, PlayerGateway, Principal, SessionRegistry};
pub use notifications::{DiscordNotifier, Notification, Notifier};
pub use scheduler::CalendarSyncScheduler;
pub use state::{PersistedState, StateStore};
