//! Configuration infrastructure
//!
//! Contains configuration loading and management for review crawling.
//!
//! Configuration is organized into tiers:
//! 1. Per-run crawl options (also carried by start commands)
//! 2. Page contract: selectors and rating rules for the host widget
//! 3. Timing, output and logging settings (config file only)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, warn};

use crate::domain::CrawlConfig;
use crate::infrastructure::parsing::ParsingConfig;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default options for a crawl run
    pub crawl: CrawlConfig,

    /// Host page contract
    pub parsing: ParsingConfig,

    /// Engine waits and pacing
    pub timing: TimingConfig,

    /// Where exports are written
    pub output: OutputConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Engine timing knobs outside the per-run delay range
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Randomized wait before extracting a page, lower bound
    pub pre_extract_delay_min_ms: u64,

    /// Randomized wait before extracting a page, upper bound
    pub pre_extract_delay_max_ms: u64,

    /// Fixed wait after a confirmed content change
    pub settle_delay_ms: u64,

    /// Upper bound on waiting for the reviews container to change
    pub change_timeout_ms: u64,

    /// Upper bound on waiting for the download sink acknowledgement
    pub download_ack_timeout_ms: u64,
}

impl TimingConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn change_timeout(&self) -> Duration {
        Duration::from_millis(self.change_timeout_ms)
    }

    pub fn download_ack_timeout(&self) -> Duration {
        Duration::from_millis(self.download_ack_timeout_ms)
    }
}

/// Export destination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File name handed to the download sink
    pub filename: String,

    /// Directory for the primary download sink
    pub directory: PathBuf,

    /// Directory for the in-process fallback save
    pub fallback_directory: PathBuf,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted file logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Log directory; defaults to `logs/` next to the executable
    pub log_dir: Option<PathBuf>,

    /// Module-specific log level filters (e.g., "scraper": "warn")
    pub module_filters: HashMap<String, String>,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            pre_extract_delay_min_ms: defaults::PRE_EXTRACT_DELAY_MIN_MS,
            pre_extract_delay_max_ms: defaults::PRE_EXTRACT_DELAY_MAX_MS,
            settle_delay_ms: defaults::SETTLE_DELAY_MS,
            change_timeout_ms: defaults::CHANGE_TIMEOUT_MS,
            download_ack_timeout_ms: defaults::DOWNLOAD_ACK_TIMEOUT_MS,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        let directory = dirs::download_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            filename: defaults::EXPORT_FILENAME.to_string(),
            fallback_directory: directory.clone(),
            directory,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            log_dir: None,
            module_filters: {
                let mut filters = HashMap::new();
                filters.insert("html5ever".to_string(), "warn".to_string());
                filters.insert("selectors".to_string(), "warn".to_string());
                filters.insert("tokio".to_string(), "info".to_string());
                filters
            },
        }
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join(defaults::APP_DIR_NAME);

        Ok(config_dir)
    }

    /// Configuration manager rooted in the user config directory
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join(defaults::CONFIG_FILE_NAME);
        Ok(Self { config_path })
    }

    /// Configuration manager for an explicit file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { config_path: path.into() }
    }

    /// Load configuration, writing defaults on first run
    pub async fn initialize_on_first_run(&self) -> Result<AppConfig> {
        if self.config_path.exists() {
            return self.load_config().await;
        }

        info!("First run detected - writing default configuration to {:?}", self.config_path);
        let default_config = AppConfig::default();
        self.save_config(&default_config).await?;
        Ok(default_config)
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!("Configuration file not found, creating default: {:?}", self.config_path);
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .context("Failed to read configuration file")?;

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => {
                info!("Loaded configuration from: {:?}", self.config_path);
                Ok(config)
            }
            Err(parse_error) => {
                warn!("Configuration parse error: {}", parse_error);
                warn!("Resetting to default configuration");

                let backup_path = self.config_path.with_extension("json.corrupted");
                if let Err(e) = fs::copy(&self.config_path, &backup_path).await {
                    warn!("Failed to create backup of corrupted config: {}", e);
                } else {
                    info!("Backed up corrupted config to: {:?}", backup_path);
                }

                self.reset_to_defaults().await
            }
        }
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(config)
            .context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    /// Reset configuration to defaults
    pub async fn reset_to_defaults(&self) -> Result<AppConfig> {
        let default_config = AppConfig::default();
        self.save_config(&default_config)
            .await
            .context("Failed to save default configuration")?;
        Ok(default_config)
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Default crawl configuration values
pub mod defaults {
    /// Application directory name under the user config dir
    pub const APP_DIR_NAME: &str = "review-harvester";

    /// Configuration file name
    pub const CONFIG_FILE_NAME: &str = "review_harvester_config.json";

    /// Export file name
    pub const EXPORT_FILENAME: &str = "reviews.csv";

    pub use crate::domain::crawl_config::defaults::{DELAY_MAX_MS, DELAY_MIN_MS, WITH_IMAGES};

    /// Pre-extraction pacing range, in milliseconds
    pub const PRE_EXTRACT_DELAY_MIN_MS: u64 = 250;
    pub const PRE_EXTRACT_DELAY_MAX_MS: u64 = 600;

    /// Wait after a confirmed content change, in milliseconds
    pub const SETTLE_DELAY_MS: u64 = 250;

    /// Change waiter timeout, in milliseconds
    pub const CHANGE_TIMEOUT_MS: u64 = 8000;

    /// Download sink acknowledgement timeout, in milliseconds
    pub const DOWNLOAD_ACK_TIMEOUT_MS: u64 = 1500;

    // Log configuration defaults
    /// Default log level
    pub const LOG_LEVEL: &str = "info";

    /// Default JSON format setting
    pub const LOG_JSON_FORMAT: bool = false;

    /// Default console output setting
    pub const LOG_CONSOLE_OUTPUT: bool = true;

    /// Default file output setting
    pub const LOG_FILE_OUTPUT: bool = false;
}
