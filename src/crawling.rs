//! # Crawl engine
//!
//! The sequential crawl loop over a [`HostPage`](crate::infrastructure::HostPage):
//! - explicit module layout (no mod.rs)
//! - state machine values in [`state`]
//! - cross-page deduplication in [`accumulator`]

pub mod accumulator;
pub mod orchestrator;
pub mod state;

pub use accumulator::ReviewAccumulator;
pub use orchestrator::{CrawlOrchestrator, CrawlOutcome, jitter};
pub use state::{CrawlReport, CrawlState, StopReason};
