// File: manager/src/config/manager.rs
use super::Config;
use crate::errors::ConfigError;
use anyhow::{anyhow, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{info, warn};

pub struct ConfigManager {
    current_config: Arc<Config>,
}

impl ConfigManager {
    pub async fn new(config_dir: String) -> Result<Self> {
        let config = Self::load_configuration(&config_dir).await?;
        Ok(Self {
            current_config: Arc::new(config),
        })
    }

    pub fn get_current_config(&self) -> Arc<Config> {
        self.current_config.clone()
    }

    async fn load_configuration(config_dir: &str) -> Result<Config> {
        let main_config_path = format!("{}/main.toml", config_dir);

        if !Path::new(&main_config_path).exists() {
            warn!("No config found at {}, writing defaults", main_config_path);
            Self::write_default_config(config_dir, &main_config_path).await?;
        }

        let main_config_content = fs::read_to_string(&main_config_path)
            .await
            .map_err(|e| ConfigError::LoadFailed {
                path: main_config_path.clone(),
                reason: e.to_string(),
            })?;

        let config = Self::parse(&main_config_content)?;

        info!(
            "Loaded configuration: calendar {}, discord {}, {} notice offsets, state file {}",
            if config.calendar.enabled { "enabled" } else { "disabled" },
            if config.discord.enabled { "enabled" } else { "disabled" },
            config.notifications.notification_offsets_minutes.len(),
            config.state_file
        );

        Ok(config)
    }

    /// Parse and validate a `main.toml` document.
    pub fn parse(content: &str) -> Result<Config> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    async fn write_default_config(config_dir: &str, main_config_path: &str) -> Result<()> {
        fs::create_dir_all(config_dir)
            .await
            .map_err(|e| anyhow!("Failed to create config dir {}: {}", config_dir, e))?;

        let rendered = toml::to_string_pretty(&Config::default())
            .map_err(|e| anyhow!("Failed to render default config: {}", e))?;

        fs::write(main_config_path, rendered)
            .await
            .map_err(|e| anyhow!("Failed to write default config {}: {}", main_config_path, e))?;

        info!("Default configuration written to {}", main_config_path);
        Ok(())
    }
}
