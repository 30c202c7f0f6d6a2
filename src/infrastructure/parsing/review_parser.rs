//! Review item extraction.
//!
//! Every field degrades to an absent or default value when the markup does
//! not match; extraction itself never fails.

use scraper::{ElementRef, Html};
use tracing::debug;
use url::Url;

use super::ContextualParser;
use super::config::ParsingConfig;
use super::images::ImageCollector;
use super::rating::RatingEngine;
use super::selectors::{CompiledSelectors, SelectorSet};
use super::strategy::{FirstText, JoinedText, LastText, Presence, StrategyChain};
use super::text::parse_counter;
use super::ParsingResult;
use crate::domain::review::ReviewRecord;

/// Per-snapshot extraction context.
#[derive(Debug, Clone)]
pub struct ReviewParseContext {
    /// Location of the rendered page, for resolving image sources
    pub page_url: Url,

    /// Collect image URLs; the scan is skipped entirely when false
    pub with_images: bool,
}

impl ReviewParseContext {
    pub fn new(page_url: Url, with_images: bool) -> Self {
        Self {
            page_url,
            with_images,
        }
    }
}

/// Extracts [`ReviewRecord`]s from every rendered review item.
pub struct ReviewParser {
    items: SelectorSet,
    date: StrategyChain<String>,
    user: StrategyChain<String>,
    verified: StrategyChain<()>,
    content: StrategyChain<String>,
    sku: StrategyChain<String>,
    likes: StrategyChain<String>,
    rating: RatingEngine,
    images: ImageCollector,
}

impl ReviewParser {
    pub fn new(config: &ParsingConfig) -> ParsingResult<Self> {
        let selectors = CompiledSelectors::compile(&config.selectors)?;
        Ok(Self::with_selectors(&selectors, config))
    }

    pub fn with_selectors(selectors: &CompiledSelectors, config: &ParsingConfig) -> Self {
        Self {
            items: selectors.review_item.clone(),
            date: StrategyChain::new("date").then(FirstText(selectors.date.clone())),
            user: StrategyChain::new("user").then(FirstText(selectors.user.clone())),
            verified: StrategyChain::new("verified").then(Presence(selectors.verified_badge.clone())),
            content: StrategyChain::new("content").then(JoinedText(selectors.content.clone())),
            sku: StrategyChain::new("sku").then(JoinedText(selectors.sku.clone())),
            likes: StrategyChain::new("likes").then(LastText(selectors.likes.clone())),
            rating: RatingEngine::new(selectors, &config.rating),
            images: ImageCollector::new(selectors.rating_region.clone(), &config.selectors),
        }
    }

    /// Extract one review item.
    pub fn extract_item(&self, item: ElementRef<'_>, context: &ReviewParseContext) -> ReviewRecord {
        ReviewRecord {
            rating: self.rating.rate(item),
            date: self.date.first_present(item),
            user: self.user.first_present(item),
            verified: self.verified.first_present(item).is_some(),
            content: self.content.first_present(item).unwrap_or_default(),
            sku: self.sku.first_present(item).unwrap_or_default(),
            likes: self
                .likes
                .first_present(item)
                .map_or(0, |text| parse_counter(&text)),
            images: if context.with_images {
                self.images.collect(item, &context.page_url)
            } else {
                Vec::new()
            },
        }
    }
}

impl ContextualParser for ReviewParser {
    type Output = Vec<ReviewRecord>;
    type Context = ReviewParseContext;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> Self::Output {
        let items = self.items.all_in_document(html);
        debug!("Extracting {} review items from {}", items.len(), context.page_url);
        items
            .into_iter()
            .map(|item| self.extract_item(item, context))
            .collect()
    }
}
