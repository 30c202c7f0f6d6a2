//! HTML parsing for rendered review pages
//!
//! Selector roles come from [`ParsingConfig`]; each parser works on an
//! already-parsed [`Html`] snapshot and degrades to absent values instead of
//! failing when the page contract does not hold.

pub mod config;
pub mod error;
pub mod images;
pub mod pagination_parser;
pub mod rating;
pub mod review_parser;
pub mod selectors;
pub mod strategy;
pub mod text;
pub mod visual;

pub use config::{ParsingConfig, RatingRules, ReviewPageSelectors};
pub use error::{ParsingError, ParsingResult};
pub use images::{ImageCollector, to_absolute};
pub use pagination_parser::PaginationParser;
pub use rating::RatingEngine;
pub use review_parser::{ReviewParseContext, ReviewParser};
pub use selectors::{CompiledSelectors, SelectorSet};

use scraper::Html;

/// Parser over a rendered snapshot with caller-supplied context.
pub trait ContextualParser {
    type Output;
    type Context;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> Self::Output;
}
