//! Field extraction strategy chains.
//!
//! A field is extracted by running an ordered list of strategies against a
//! review item and keeping the first present result.

use scraper::ElementRef;
use tracing::trace;

use super::selectors::SelectorSet;
use crate::domain::review::normalize_text;

/// One way of reading a field from a review item.
pub trait FieldStrategy<T>: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, item: ElementRef<'_>) -> Option<T>;
}

/// Ordered strategies for one field; the first present result wins.
pub struct StrategyChain<T> {
    field: &'static str,
    strategies: Vec<Box<dyn FieldStrategy<T>>>,
}

impl<T> StrategyChain<T> {
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            strategies: Vec::new(),
        }
    }

    #[must_use]
    pub fn then(mut self, strategy: impl FieldStrategy<T> + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn first_present(&self, item: ElementRef<'_>) -> Option<T> {
        self.strategies.iter().find_map(|strategy| {
            let value = strategy.extract(item);
            if value.is_some() {
                trace!("{} resolved by {}", self.field, strategy.name());
            }
            value
        })
    }
}

/// Trimmed text of the first match; empty text counts as absent.
pub struct FirstText(pub SelectorSet);

impl FieldStrategy<String> for FirstText {
    fn name(&self) -> &'static str {
        "first_text"
    }

    fn extract(&self, item: ElementRef<'_>) -> Option<String> {
        self.0
            .first_in(item)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty())
    }
}

/// Trimmed text of the last match, for trailing counters.
pub struct LastText(pub SelectorSet);

impl FieldStrategy<String> for LastText {
    fn name(&self) -> &'static str {
        "last_text"
    }

    fn extract(&self, item: ElementRef<'_>) -> Option<String> {
        self.0
            .all_in(item)
            .last()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty())
    }
}

/// Concatenated text of every match, whitespace collapsed.
pub struct JoinedText(pub SelectorSet);

impl FieldStrategy<String> for JoinedText {
    fn name(&self) -> &'static str {
        "joined_text"
    }

    fn extract(&self, item: ElementRef<'_>) -> Option<String> {
        let matches = self.0.all_in(item);
        if matches.is_empty() {
            return None;
        }
        let raw: String = matches.iter().flat_map(|el| el.text()).collect();
        Some(normalize_text(&raw))
    }
}

/// Present when any element matches.
pub struct Presence(pub SelectorSet);

impl FieldStrategy<()> for Presence {
    fn name(&self) -> &'static str {
        "presence"
    }

    fn extract(&self, item: ElementRef<'_>) -> Option<()> {
        self.0.first_in(item).map(|_| ())
    }
}
