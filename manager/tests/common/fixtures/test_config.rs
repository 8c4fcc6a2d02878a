//! Test configuration builder for creating test configs programmatically

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Builder for creating test configurations
pub struct TestConfigBuilder {
    temp_dir: TempDir,
    main_config: MainConfigBuilder,
}

impl TestConfigBuilder {
    /// Create a new test config builder
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self {
            temp_dir,
            main_config: MainConfigBuilder::default(),
        }
    }

    /// Configure main settings
    pub fn with_main_config<F>(mut self, f: F) -> Self
    where
        F: FnOnce(MainConfigBuilder) -> MainConfigBuilder,
    {
        self.main_config = f(self.main_config);
        self
    }

    /// Build and write config files to temp directory
    pub fn build(self) -> TestConfig {
        let config_dir = self.temp_dir.path().join("config");
        fs::create_dir_all(&config_dir).expect("Failed to create config dir");

        let main_toml = self.main_config.to_toml();
        fs::write(config_dir.join("main.toml"), main_toml).expect("Failed to write main.toml");

        TestConfig {
            _temp_dir: self.temp_dir,
            config_dir,
        }
    }

    /// Temp directory without any config file
    pub fn empty() -> TestConfig {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_dir = temp_dir.path().join("config");

        TestConfig {
            _temp_dir: temp_dir,
            config_dir,
        }
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Main configuration builder
#[derive(Clone)]
pub struct MainConfigBuilder {
    port: u16,
    timezone: String,
    check_interval_minutes: u64,
    offsets: Vec<u32>,
    thirty_seconds_before: bool,
    webhook_url: Option<String>,
    exempt_group: Option<String>,
}

impl MainConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn timezone(mut self, timezone: &str) -> Self {
        self.timezone = timezone.to_string();
        self
    }

    pub fn check_interval(mut self, minutes: u64) -> Self {
        self.check_interval_minutes = minutes;
        self
    }

    pub fn offsets(mut self, offsets: &[u32]) -> Self {
        self.offsets = offsets.to_vec();
        self
    }

    pub fn without_thirty_second_notice(mut self) -> Self {
        self.thirty_seconds_before = false;
        self
    }

    pub fn webhook(mut self, url: &str) -> Self {
        self.webhook_url = Some(url.to_string());
        self
    }

    pub fn exempt_group(mut self, group: &str) -> Self {
        self.exempt_group = Some(group.to_string());
        self
    }

    fn to_toml(&self) -> String {
        let offsets = self
            .offsets
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            r#"
port = {}
state_file = "data/test-state.json"
timezone = "{}"

[calendar]
enabled = true
api_key = "test-key"
calendar_id = "maintenance@example.com"
check_interval_minutes = {}

[discord]
enabled = true
webhook_url = "{}"

[maintenance]
kick_message = "Down for {{title}} until {{end}}"
exempt_group = "{}"

[notifications]
login_notification = true
notification_offsets_minutes = [{}]
thirty_seconds_before = {}
"#,
            self.port,
            self.timezone,
            self.check_interval_minutes,
            self.webhook_url.as_deref().unwrap_or(""),
            self.exempt_group.as_deref().unwrap_or(""),
            offsets,
            self.thirty_seconds_before
        )
    }
}

impl Default for MainConfigBuilder {
    fn default() -> Self {
        Self {
            port: 8095,
            timezone: "UTC".to_string(),
            check_interval_minutes: 30,
            offsets: vec![60, 30, 10, 5, 1],
            thirty_seconds_before: true,
            webhook_url: None,
            exempt_group: None,
        }
    }
}

/// Test configuration with temp directory
pub struct TestConfig {
    _temp_dir: TempDir,
    pub config_dir: PathBuf,
}

impl TestConfig {
    pub fn config_dir_string(&self) -> String {
        self.config_dir.to_string_lossy().to_string()
    }

    pub fn main_config_path(&self) -> PathBuf {
        self.config_dir.join("main.toml")
    }
}
