//! Application layer module
//!
//! Drives the crawl engine from external start/stop commands.

pub mod controller;

pub use controller::{CrawlCommand, CrawlController};
