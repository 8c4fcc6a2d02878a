//! Custom error types for the maintenance manager
//!
//! Provides structured error handling with context for the failure scenarios
//! the engine distinguishes. None of these halt the engine: callers log them and
//! retry on the next cycle.

use std::fmt;

/// Main error type for the maintenance manager
#[derive(Debug)]
pub enum ManagerError {
    /// Configuration-related errors
    Config(ConfigError),

    /// Calendar feed errors
    Feed(FeedError),

    /// Notification channel errors
    Notification(NotificationError),

    /// Persisted state errors
    State(StateError),

    /// Maintenance state machine errors
    Maintenance(MaintenanceError),

    /// Other errors with context
    Other(String),
}

/// Configuration error variants
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to load configuration file
    LoadFailed { path: String, reason: String },

    /// Invalid configuration value
    InvalidValue { field: String, reason: String },

    /// Configuration parsing error
    ParseError { reason: String },
}

/// Calendar feed error variants
#[derive(Debug, PartialEq)]
pub enum FeedError {
    /// Calendar returned a non-success status
    Http { status: u16 },

    /// Event is missing a start or end bound
    MissingBound { event_id: String, field: String },

    /// Event bound could not be parsed
    InvalidTimestamp { event_id: String, value: String },

    /// Event ends before it starts
    InvalidWindow { event_id: String },
}

/// Notification channel error variants
#[derive(Debug)]
pub enum NotificationError {
    /// Webhook request could not be delivered
    DeliveryFailed { kind: String, reason: String },
}

/// Persisted state error variants
#[derive(Debug)]
pub enum StateError {
    /// Reading the state file failed
    ReadFailed { path: String, reason: String },

    /// State file content is not a valid snapshot
    Corrupt { path: String, reason: String },

    /// Writing the state file failed
    WriteFailed { path: String, reason: String },

    /// Removing the state file failed
    ClearFailed { path: String, reason: String },
}

/// Maintenance state machine error variants
#[derive(Debug)]
pub enum MaintenanceError {
    /// No maintenance is active
    NotActive,

    /// Timer pool no longer accepts submissions
    ShuttingDown,
}

impl fmt::Display for ManagerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManagerError::Config(e) => write!(f, "Configuration error: {}", e),
            ManagerError::Feed(e) => write!(f, "Calendar feed error: {}", e),
            ManagerError::Notification(e) => write!(f, "Notification error: {}", e),
            ManagerError::State(e) => write!(f, "State error: {}", e),
            ManagerError::Maintenance(e) => write!(f, "Maintenance error: {}", e),
            ManagerError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path, reason)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
            ConfigError::ParseError { reason } => {
                write!(f, "Failed to parse config: {}", reason)
            }
        }
    }
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Http { status } => write!(f, "Calendar returned status {}", status),
            FeedError::MissingBound { event_id, field } => {
                write!(f, "Event '{}' has no {} time", event_id, field)
            }
            FeedError::InvalidTimestamp { event_id, value } => {
                write!(f, "Event '{}' has an invalid timestamp: {}", event_id, value)
            }
            FeedError::InvalidWindow { event_id } => {
                write!(f, "Event '{}' ends before it starts", event_id)
            }
        }
    }
}

impl fmt::Display for NotificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationError::DeliveryFailed { kind, reason } => {
                write!(f, "Failed to deliver '{}' notification: {}", kind, reason)
            }
        }
    }
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::ReadFailed { path, reason } => {
                write!(f, "Failed to read state file '{}': {}", path, reason)
            }
            StateError::Corrupt { path, reason } => {
                write!(f, "State file '{}' is corrupt: {}", path, reason)
            }
            StateError::WriteFailed { path, reason } => {
                write!(f, "Failed to write state file '{}': {}", path, reason)
            }
            StateError::ClearFailed { path, reason } => {
                write!(f, "Failed to delete state file '{}': {}", path, reason)
            }
        }
    }
}

impl fmt::Display for MaintenanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaintenanceError::NotActive => write!(f, "Maintenance is not active"),
            MaintenanceError::ShuttingDown => write!(f, "Timer pool is shutting down"),
        }
    }
}

impl std::error::Error for ManagerError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for FeedError {}
impl std::error::Error for NotificationError {}
impl std::error::Error for StateError {}
impl std::error::Error for MaintenanceError {}

impl From<anyhow::Error> for ManagerError {
    fn from(err: anyhow::Error) -> Self {
        ManagerError::Other(err.to_string())
    }
}

impl From<ConfigError> for ManagerError {
    fn from(err: ConfigError) -> Self {
        ManagerError::Config(err)
    }
}

impl From<FeedError> for ManagerError {
    fn from(err: FeedError) -> Self {
        ManagerError::Feed(err)
    }
}

impl From<NotificationError> for ManagerError {
    fn from(err: NotificationError) -> Self {
        ManagerError::Notification(err)
    }
}

impl From<StateError> for ManagerError {
    fn from(err: StateError) -> Self {
        ManagerError::State(err)
    }
}

impl From<MaintenanceError> for ManagerError {
    fn from(err: MaintenanceError) -> Self {
        ManagerError::Maintenance(err)
    }
}
