//! Crawl state machine values and the final run report.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::infrastructure::download::SaveOutcome;

/// Why a crawl stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Aborted,
    LastPageReached,
    NextDisabled,
    MaxPagesReached,
    NavigationFailed,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Aborted => "stop requested",
            Self::LastPageReached => "last page reached",
            Self::NextDisabled => "next page unavailable",
            Self::MaxPagesReached => "page limit reached",
            Self::NavigationFailed => "navigation not confirmed",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum CrawlState {
    Running,
    Extracting,
    Navigating,
    Stopped(StopReason),
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlReport {
    pub run_id: Uuid,
    pub records: usize,
    pub pages_visited: u32,
    pub stop_reason: StopReason,
    pub save: SaveOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
