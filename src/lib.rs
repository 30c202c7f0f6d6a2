//! Review Harvester - paginated review widget crawler
//!
//! Reads a dynamically rendered review widget page by page, extracts typed
//! review records with layered fallbacks, deduplicates them across pages and
//! exports them as CSV.

// Module declarations
pub mod application;
pub mod crawling;
pub mod domain;
pub mod infrastructure;

pub use application::{CrawlCommand, CrawlController};
pub use crawling::{CrawlOrchestrator, CrawlReport, CrawlState, StopReason};
pub use domain::{CrawlConfig, PaginationState, ReviewRecord};
