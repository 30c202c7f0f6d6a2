//! Domain module - review records, pagination state and crawl options
//!
//! Plain data types shared by every layer. Nothing in here touches the
//! host page or performs I/O.

pub mod crawl_config;
pub mod pagination;
pub mod review;

pub use crawl_config::{ConfigError, CrawlConfig};
pub use pagination::PaginationState;
pub use review::ReviewRecord;
