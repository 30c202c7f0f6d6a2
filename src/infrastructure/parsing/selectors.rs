//! Compiled selector sets.
//!
//! Each page-contract role compiles to an ordered list of fallbacks. Lookups
//! take the first selector that matches anything.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::config::ReviewPageSelectors;
use super::{ParsingError, ParsingResult};

/// Ordered fallback selectors for one role, with their source text.
#[derive(Debug, Clone)]
pub struct SelectorSet {
    role: &'static str,
    sources: Vec<String>,
    selectors: Vec<Selector>,
}

impl SelectorSet {
    /// Compile selector strings, skipping the ones that fail.
    ///
    /// Fails only when nothing compiles, since the role would then be unusable.
    pub fn compile(role: &'static str, selector_strings: &[String]) -> ParsingResult<Self> {
        let mut sources = Vec::new();
        let mut selectors = Vec::new();
        let mut errors = Vec::new();

        for selector_str in selector_strings {
            match Selector::parse(selector_str) {
                Ok(selector) => {
                    sources.push(selector_str.clone());
                    selectors.push(selector);
                }
                Err(e) => {
                    let error = ParsingError::invalid_selector(role, selector_str, &e.to_string());
                    warn!("{}", error);
                    errors.push(format!("'{selector_str}': {e}"));
                }
            }
        }

        if selectors.is_empty() {
            return Err(ParsingError::no_valid_selector(role, errors));
        }
        if !errors.is_empty() {
            debug!("Some {} selectors failed to compile: {}", role, errors.join(", "));
        }

        Ok(Self {
            role,
            sources,
            selectors,
        })
    }

    pub fn role(&self) -> &'static str {
        self.role
    }

    /// First match in the document, trying fallbacks in order.
    pub fn first_in_document<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        self.selectors
            .iter()
            .find_map(|selector| document.select(selector).next())
    }

    /// Every match of the first fallback that matches anything in the document.
    pub fn all_in_document<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        self.selectors
            .iter()
            .map(|selector| document.select(selector).collect::<Vec<_>>())
            .find(|matches| !matches.is_empty())
            .unwrap_or_default()
    }

    /// First match below `scope`.
    pub fn first_in<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.selectors
            .iter()
            .find_map(|selector| scope.select(selector).next())
    }

    /// Every match below `scope` for the first fallback that matches anything.
    pub fn all_in<'a>(&self, scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        self.selectors
            .iter()
            .map(|selector| scope.select(selector).collect::<Vec<_>>())
            .find(|matches| !matches.is_empty())
            .unwrap_or_default()
    }

    /// Source text of the first selector matching in the document. Used to
    /// address the same element through the host page.
    pub fn matching_source(&self, document: &Html) -> Option<&str> {
        self.selectors
            .iter()
            .zip(&self.sources)
            .find(|(selector, _)| document.select(selector).next().is_some())
            .map(|(_, source)| source.as_str())
    }
}

/// All page-contract roles, compiled once per parser construction.
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    pub reviews_container: SelectorSet,
    pub review_item: SelectorSet,
    pub current_page: SelectorSet,
    pub page_controls: SelectorSet,
    pub next_control: SelectorSet,
    pub header_region: SelectorSet,
    pub rating_region: SelectorSet,
    pub star_glyph: SelectorSet,
    pub date: SelectorSet,
    pub user: SelectorSet,
    pub verified_badge: SelectorSet,
    pub content: SelectorSet,
    pub sku: SelectorSet,
    pub likes: SelectorSet,
}

impl CompiledSelectors {
    pub fn compile(config: &ReviewPageSelectors) -> ParsingResult<Self> {
        Ok(Self {
            reviews_container: SelectorSet::compile("reviews_container", &config.reviews_container)?,
            review_item: SelectorSet::compile("review_item", &config.review_item)?,
            current_page: SelectorSet::compile("current_page", &config.current_page)?,
            page_controls: SelectorSet::compile("page_controls", &config.page_controls)?,
            next_control: SelectorSet::compile("next_control", &config.next_control)?,
            header_region: SelectorSet::compile("header_region", &config.header_region)?,
            rating_region: SelectorSet::compile("rating_region", &config.rating_region)?,
            star_glyph: SelectorSet::compile("star_glyph", &config.star_glyph)?,
            date: SelectorSet::compile("date", &config.date)?,
            user: SelectorSet::compile("user", &config.user)?,
            verified_badge: SelectorSet::compile("verified_badge", &config.verified_badge)?,
            content: SelectorSet::compile("content", &config.content)?,
            sku: SelectorSet::compile("sku", &config.sku)?,
            likes: SelectorSet::compile("likes", &config.likes)?,
        })
    }
}
