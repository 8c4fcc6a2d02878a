// File: manager/src/config/mod.rs
pub mod manager;
use crate::constants::{calendar, defaults};
use crate::errors::ConfigError;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
pub use manager::ConfigManager;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_state_file")]
    pub state_file: String,
    // IANA zone used for human-readable dates and all-day calendar entries
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    #[serde(default = "default_check_interval")]
    pub check_interval_minutes: u64,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub webhook_url: String,
    pub footer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    #[serde(default = "default_kick_message")]
    pub kick_message: String,
    // Group whose members may stay connected during maintenance; empty disables
    #[serde(default = "default_exempt_group")]
    pub exempt_group: Option<String>,
    pub motd: Option<String>,
    pub version_label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_true")]
    pub login_notification: bool,
    #[serde(default = "default_offsets")]
    pub notification_offsets_minutes: Vec<u32>,
    #[serde(default = "default_true")]
    pub thirty_seconds_before: bool,
}

fn default_host() -> String {
    defaults::HOST.to_string()
}

fn default_port() -> u16 {
    defaults::PORT
}

fn default_state_file() -> String {
    defaults::STATE_FILE.to_string()
}

fn default_timezone() -> String {
    defaults::TIMEZONE.to_string()
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

fn default_check_interval() -> u64 {
    defaults::CHECK_INTERVAL_MINUTES
}

fn default_true() -> bool {
    true
}

fn default_kick_message() -> String {
    defaults::KICK_MESSAGE.to_string()
}

fn default_exempt_group() -> Option<String> {
    Some(defaults::EXEMPT_GROUP.to_string())
}

fn default_offsets() -> Vec<u32> {
    defaults::NOTIFICATION_OFFSETS_MINUTES.to_vec()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            state_file: default_state_file(),
            timezone: default_timezone(),
            calendar: CalendarConfig::default(),
            discord: DiscordConfig::default(),
            maintenance: MaintenanceConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: calendar::PLACEHOLDER_API_KEY.to_string(),
            calendar_id: default_calendar_id(),
            check_interval_minutes: default_check_interval(),
            base_url: None,
        }
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            webhook_url: String::new(),
            footer: None,
        }
    }
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            kick_message: default_kick_message(),
            exempt_group: default_exempt_group(),
            motd: None,
            version_label: None,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            login_notification: true,
            notification_offsets_minutes: default_offsets(),
            thirty_seconds_before: true,
        }
    }
}

impl Config {
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| ConfigError::InvalidValue {
                field: "timezone".to_string(),
                reason: e.to_string(),
            })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timezone()?;

        if self.calendar.check_interval_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "calendar.check_interval_minutes".to_string(),
                reason: "must be at least 1 minute".to_string(),
            });
        }

        if self.notifications.notification_offsets_minutes.contains(&0) {
            return Err(ConfigError::InvalidValue {
                field: "notifications.notification_offsets_minutes".to_string(),
                reason: "offsets must be positive".to_string(),
            });
        }

        if self.state_file.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "state_file".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

impl CalendarConfig {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(calendar::DEFAULT_BASE_URL)
    }

    pub fn has_usable_api_key(&self) -> bool {
        let key = self.api_key.trim();
        !key.is_empty() && key != calendar::PLACEHOLDER_API_KEY
    }
}

impl MaintenanceConfig {
    pub fn exempt_group(&self) -> Option<&str> {
        self.exempt_group
            .as_deref()
            .map(str::trim)
            .filter(|group| !group.is_empty())
    }

    pub fn motd(&self) -> &str {
        self.motd.as_deref().unwrap_or(defaults::MOTD)
    }

    pub fn version_label(&self) -> &str {
        self.version_label.as_deref().unwrap_or(defaults::VERSION_LABEL)
    }
}

impl DiscordConfig {
    pub fn footer(&self) -> &str {
        self.footer.as_deref().unwrap_or(defaults::DISCORD_FOOTER)
    }
}
