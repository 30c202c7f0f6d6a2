//! Page contract configuration
//!
//! Centralized CSS selectors and heuristic vocabularies describing the host
//! review widget. Every selector role is a list of fallbacks tried in order.

use serde::{Deserialize, Serialize};

/// Main parsing configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    /// Structural selectors for the review widget
    pub selectors: ReviewPageSelectors,

    /// Star rating inference rules
    pub rating: RatingRules,
}

/// CSS selectors for the review widget
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewPageSelectors {
    /// Container whose mutations signal a page change
    pub reviews_container: Vec<String>,

    /// One element per review card
    pub review_item: Vec<String>,

    /// Current page marker
    pub current_page: Vec<String>,

    /// Page-number controls; controls classed `prev`/`next` are skipped
    pub page_controls: Vec<String>,

    /// The "next page" control
    pub next_control: Vec<String>,

    /// Item header, scanned for accessible rating labels
    pub header_region: Vec<String>,

    /// Star/score indicator inside an item
    pub rating_region: Vec<String>,

    /// Star glyph images inside the rating region
    pub star_glyph: Vec<String>,

    /// Review date label
    pub date: Vec<String>,

    /// Reviewer name
    pub user: Vec<String>,

    /// Verified purchase badge
    pub verified_badge: Vec<String>,

    /// Review body
    pub content: Vec<String>,

    /// Purchased variant description
    pub sku: Vec<String>,

    /// Helpful-count text; the last match is the counter
    pub likes: Vec<String>,

    /// Image classes that mark badges, brand icons or glyphs, never review photos
    pub excluded_image_classes: Vec<String>,

    /// Source-bearing image attributes in priority order
    pub image_source_attributes: Vec<String>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| (*s).to_string()).collect()
}

impl Default for ReviewPageSelectors {
    fn default() -> Self {
        Self {
            reviews_container: strings(&[".mod-reviews"]),
            review_item: strings(&[".mod-reviews .item"]),
            current_page: strings(&[".review-pagination .next-pagination-list .current"]),
            page_controls: strings(&[
                ".review-pagination .next-pagination-list .next-pagination-item",
            ]),
            next_control: strings(&[".review-pagination .next-pagination-item.next"]),
            header_region: strings(&[".top"]),
            rating_region: strings(&[".top .container-star"]),
            star_glyph: strings(&["img.star"]),
            date: strings(&[".top .title.right"]),
            user: strings(&[".middle > span:first-child"]),
            verified_badge: strings(&[".verify"]),
            content: strings(&[".item-content .content"]),
            sku: strings(&[".item-content .skuInfo"]),
            likes: strings(&[".bottom .left .left-content span"]),
            excluded_image_classes: strings(&["verifyImg", "lazadaicon", "star"]),
            image_source_attributes: strings(&["src", "data-src", "data-ks-lazyload", "data-original"]),
        }
    }
}

/// Star rating inference rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingRules {
    /// Enable the rendered-width ratio tier after the glyph tier
    pub geometric_fallback: bool,

    /// Glyph source fragments that mean "empty star"
    pub source_empty_tokens: Vec<String>,

    /// Glyph class fragments that mean "empty star"
    pub class_empty_tokens: Vec<String>,

    /// Glyph source fragments that mean "filled star"
    pub source_filled_tokens: Vec<String>,

    /// Glyph class fragments that mean "filled star"
    pub class_filled_tokens: Vec<String>,

    /// Glyphs rendered below this opacity look empty
    pub opacity_threshold: f64,
}

impl Default for RatingRules {
    fn default() -> Self {
        Self {
            geometric_fallback: false,
            source_empty_tokens: strings(&[
                "gray", "grey", "empty", "inactive", "hollow", "outline", "off", "muted",
                "disabled", "tb18",
            ]),
            class_empty_tokens: strings(&["empty", "off", "inactive", "hollow", "outline"]),
            source_filled_tokens: strings(&["yellow", "gold", "full", "active", "filled", "tb19"]),
            class_filled_tokens: strings(&["on", "active", "full", "filled"]),
            opacity_threshold: 0.8,
        }
    }
}

impl RatingRules {
    /// Rules for the most permissive extractor, with the width tier enabled
    pub fn permissive() -> Self {
        Self {
            geometric_fallback: true,
            ..Self::default()
        }
    }
}
