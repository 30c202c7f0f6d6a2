//! Per-run crawl options, as carried by a start command.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default crawl options
pub mod defaults {
    /// Minimum delay before clicking next, in milliseconds
    pub const DELAY_MIN_MS: u64 = 1000;

    /// Maximum delay before clicking next, in milliseconds
    pub const DELAY_MAX_MS: u64 = 3000;

    /// Collect image URLs unless told otherwise
    pub const WITH_IMAGES: bool = true;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_pages must be positive when set")]
    ZeroMaxPages,

    #[error("delay_min_ms ({min}) must not exceed delay_max_ms ({max})")]
    InvertedDelayRange { min: u64, max: u64 },
}

/// Immutable options for one crawl run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Hard cap on visited pages. `None` crawls until the widget runs out.
    pub max_pages: Option<u32>,

    /// Lower bound of the randomized inter-page delay.
    pub delay_min_ms: u64,

    /// Upper bound of the randomized inter-page delay.
    pub delay_max_ms: u64,

    /// Collect review image URLs. The image scan touches every descendant.
    pub with_images: bool,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: None,
            delay_min_ms: defaults::DELAY_MIN_MS,
            delay_max_ms: defaults::DELAY_MAX_MS,
            with_images: defaults::WITH_IMAGES,
        }
    }
}

impl CrawlConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pages == Some(0) {
            return Err(ConfigError::ZeroMaxPages);
        }
        if self.delay_min_ms > self.delay_max_ms {
            return Err(ConfigError::InvertedDelayRange {
                min: self.delay_min_ms,
                max: self.delay_max_ms,
            });
        }
        Ok(())
    }

    /// Whether `pages_visited` has hit the configured cap.
    pub fn page_cap_reached(&self, pages_visited: u32) -> bool {
        self.max_pages.is_some_and(|cap| pages_visited >= cap)
    }
}
