//! Star rating inference.
//!
//! No single signal is reliable, so the rating comes from a tier chain:
//! explicit accessible labels, then star glyph sprite/class/visual
//! classification, then (optionally) the rendered width ratio. The first tier
//! producing a value wins; when none does the rating stays absent.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};

use super::config::RatingRules;
use super::selectors::{CompiledSelectors, SelectorSet};
use super::strategy::{FieldStrategy, StrategyChain};
use super::visual::VisualStyle;
use crate::domain::review::{MAX_RATING, clamp_rating};

static OUT_OF_FIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:/|out of)\s*5").expect("rating label pattern is valid")
});

static RATED_STARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)rated\s*(\d+(?:\.\d+)?)\s*stars?").expect("rating label pattern is valid")
});

static LABELLED: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[aria-label],[title]").expect("label selector is valid"));

/// Rating encoded in an accessible label, e.g. "4 out of 5", "4/5" or
/// "Rated 4 stars", rounded to the nearest integer.
pub fn rating_from_label(label: &str) -> Option<f64> {
    OUT_OF_FIVE
        .captures(label)
        .or_else(|| RATED_STARS.captures(label))
        .and_then(|captures| captures.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(f64::round)
}

fn in_rating_range(value: f64) -> Option<u8> {
    (0.0..=f64::from(MAX_RATING))
        .contains(&value)
        // In range, so the cast is exact.
        .then(|| clamp_rating(value as i64))
}

/// Tier 1: accessible label or title in the item header.
pub struct ExplicitLabelTier {
    header_region: SelectorSet,
}

impl FieldStrategy<u8> for ExplicitLabelTier {
    fn name(&self) -> &'static str {
        "explicit_label"
    }

    fn extract(&self, item: ElementRef<'_>) -> Option<u8> {
        let header = self.header_region.first_in(item)?;
        // The first matching label decides; an out-of-range value fails the tier.
        let value = header.select(&LABELLED).find_map(|el| {
            let attrs = el.value();
            let label = attrs
                .attr("aria-label")
                .filter(|s| !s.is_empty())
                .or_else(|| attrs.attr("title"))
                .unwrap_or_default();
            rating_from_label(label)
        })?;
        in_rating_range(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphState {
    Filled,
    Empty,
}

/// Tier 2: count filled star glyphs.
pub struct SpriteTier {
    rating_region: SelectorSet,
    star_glyph: SelectorSet,
    rules: RatingRules,
}

fn contains_any(haystack: &str, tokens: &[String]) -> bool {
    tokens.iter().any(|token| haystack.contains(token.as_str()))
}

impl SpriteTier {
    /// Classify one glyph. Ambiguous glyphs (both or neither signal) count as
    /// filled.
    pub fn classify(&self, glyph: ElementRef<'_>) -> GlyphState {
        let attrs = glyph.value();
        let source = attrs
            .attr("src")
            .filter(|s| !s.is_empty())
            .or_else(|| attrs.attr("data-src"))
            .unwrap_or_default()
            .to_lowercase();
        let class = attrs.attr("class").unwrap_or_default().to_lowercase();
        let visual = VisualStyle::of(glyph);

        let looks_empty = contains_any(&source, &self.rules.source_empty_tokens)
            || contains_any(&class, &self.rules.class_empty_tokens)
            || visual.is_full_grayscale()
            || visual.is_faded(self.rules.opacity_threshold);
        let looks_filled = contains_any(&source, &self.rules.source_filled_tokens)
            || contains_any(&class, &self.rules.class_filled_tokens);

        if looks_empty && !looks_filled {
            GlyphState::Empty
        } else {
            GlyphState::Filled
        }
    }
}

impl FieldStrategy<u8> for SpriteTier {
    fn name(&self) -> &'static str {
        "sprite_heuristic"
    }

    fn extract(&self, item: ElementRef<'_>) -> Option<u8> {
        let region = self.rating_region.first_in(item)?;
        let glyphs = self.star_glyph.all_in(region);
        if glyphs.is_empty() {
            return None;
        }

        let (mut filled, mut empty) = (0_usize, 0_usize);
        for glyph in &glyphs {
            match self.classify(*glyph) {
                GlyphState::Filled => filled += 1,
                GlyphState::Empty => empty += 1,
            }
        }
        if filled + empty != glyphs.len() {
            return None;
        }
        Some(clamp_rating(i64::try_from(filled).unwrap_or(i64::MAX)))
    }
}

/// Tier 3: total region width over one glyph's width.
pub struct GeometricTier {
    rating_region: SelectorSet,
    star_glyph: SelectorSet,
}

impl FieldStrategy<u8> for GeometricTier {
    fn name(&self) -> &'static str {
        "geometric_ratio"
    }

    fn extract(&self, item: ElementRef<'_>) -> Option<u8> {
        let region = self.rating_region.first_in(item)?;
        let total_width = VisualStyle::of(region).positive_width()?;
        // Width-rendered widgets draw stars as sized boxes rather than glyph images.
        let star = self.star_glyph.first_in(region).or_else(|| {
            region
                .descendants()
                .skip(1)
                .filter_map(ElementRef::wrap)
                .find(|el| VisualStyle::of(*el).positive_width().is_some())
        })?;
        let star_width = VisualStyle::of(star).positive_width()?;
        in_rating_range((total_width / star_width).round())
    }
}

/// Tiered rating extractor.
pub struct RatingEngine {
    tiers: StrategyChain<u8>,
}

impl RatingEngine {
    pub fn new(selectors: &CompiledSelectors, rules: &RatingRules) -> Self {
        let mut tiers = StrategyChain::new("rating")
            .then(ExplicitLabelTier {
                header_region: selectors.header_region.clone(),
            })
            .then(SpriteTier {
                rating_region: selectors.rating_region.clone(),
                star_glyph: selectors.star_glyph.clone(),
                rules: rules.clone(),
            });
        if rules.geometric_fallback {
            tiers = tiers.then(GeometricTier {
                rating_region: selectors.rating_region.clone(),
                star_glyph: selectors.star_glyph.clone(),
            });
        }
        Self { tiers }
    }

    /// Rating in `0..=5`, or `None` when no tier could decide.
    pub fn rate(&self, item: ElementRef<'_>) -> Option<u8> {
        self.tiers.first_present(item)
    }
}
