//! Review photo URL collection.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};
use url::Url;

use super::config::ReviewPageSelectors;
use super::selectors::SelectorSet;

static IMAGES: Lazy<Selector> = Lazy::new(|| Selector::parse("img").expect("img selector is valid"));

static BACKGROUND_IMAGES: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("[style*='background-image']").expect("background selector is valid")
});

static CSS_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)url\(\s*["']?(.*?)["']?\s*\)"#).expect("css url pattern is valid"));

/// Resolve a raw source attribute against the page location.
///
/// Fully qualified URLs pass through, protocol-relative ones take the page
/// scheme and root-relative ones the page origin. Anything else is joined to
/// the page URL, keeping the raw text when that fails.
pub fn to_absolute(page: &Url, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let lower = raw.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Some(raw.to_string());
    }
    if let Some(rest) = raw.strip_prefix("//") {
        return Some(format!("{}://{rest}", page.scheme()));
    }
    if raw.starts_with('/') {
        return Some(format!("{}{raw}", page.origin().ascii_serialization()));
    }
    Some(page.join(raw).map_or_else(|_| raw.to_string(), String::from))
}

/// Collects photo URLs from a review item in first-seen order.
#[derive(Debug, Clone)]
pub struct ImageCollector {
    rating_region: SelectorSet,
    excluded_classes: Vec<String>,
    source_attributes: Vec<String>,
}

impl ImageCollector {
    pub fn new(rating_region: SelectorSet, config: &ReviewPageSelectors) -> Self {
        Self {
            rating_region,
            excluded_classes: config.excluded_image_classes.clone(),
            source_attributes: config.image_source_attributes.clone(),
        }
    }

    pub fn collect(&self, item: ElementRef<'_>, page: &Url) -> Vec<String> {
        let rating_regions: HashSet<_> = self
            .rating_region
            .all_in(item)
            .iter()
            .map(|region| region.id())
            .collect();

        let mut images = OrderedUrls::default();

        for img in item.select(&IMAGES) {
            let inside_rating = img
                .ancestors()
                .any(|ancestor| rating_regions.contains(&ancestor.id()));
            if inside_rating || self.is_excluded(img) {
                continue;
            }
            let source = self
                .source_attributes
                .iter()
                .filter_map(|attr| img.value().attr(attr))
                .map(str::trim)
                .find(|value| !value.is_empty());
            if let Some(url) = source.and_then(|raw| to_absolute(page, raw)) {
                images.push(url);
            }
        }

        for styled in item.select(&BACKGROUND_IMAGES) {
            let style = styled.value().attr("style").unwrap_or_default();
            let token = CSS_URL
                .captures(style)
                .and_then(|captures| captures.get(1))
                .map(|m| m.as_str());
            if let Some(url) = token.and_then(|raw| to_absolute(page, raw)) {
                images.push(url);
            }
        }

        images.into_vec()
    }

    fn is_excluded(&self, img: ElementRef<'_>) -> bool {
        img.value()
            .classes()
            .any(|class| self.excluded_classes.iter().any(|excluded| excluded == class))
    }
}

#[derive(Default)]
struct OrderedUrls {
    seen: HashSet<String>,
    urls: Vec<String>,
}

impl OrderedUrls {
    fn push(&mut self, url: String) {
        if self.seen.insert(url.clone()) {
            self.urls.push(url);
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.urls
    }
}
