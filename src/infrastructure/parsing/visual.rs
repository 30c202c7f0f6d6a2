//! Rendered visual properties of an element.
//!
//! A serialized rendered document carries the visual state the star widget
//! sets as inline `style` declarations (and legacy `width` attributes), so
//! that is where filter, opacity and width are read from.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;

use super::text::parse_leading_float;

static FULL_GRAYSCALE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"grayscale\((1|100%)\)").expect("grayscale pattern is valid")
});

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisualStyle {
    /// Lowercased `filter` declaration
    pub filter: String,

    /// `opacity`, `None` when absent or unparsable
    pub opacity: Option<f64>,

    /// Rendered width in CSS pixels
    pub width: Option<f64>,
}

impl VisualStyle {
    pub fn of(element: ElementRef<'_>) -> Self {
        let mut style = Self::from_declarations(element.value().attr("style").unwrap_or_default());
        if style.width.is_none() {
            style.width = element.value().attr("width").and_then(parse_length);
        }
        style
    }

    pub fn from_declarations(declarations: &str) -> Self {
        let mut style = Self::default();
        for declaration in declarations.split(';') {
            let Some((property, value)) = declaration.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match property.trim().to_ascii_lowercase().as_str() {
                "filter" => style.filter = value.to_ascii_lowercase(),
                "opacity" => style.opacity = parse_leading_float(value),
                "width" => style.width = parse_length(value),
                _ => {}
            }
        }
        style
    }

    pub fn is_full_grayscale(&self) -> bool {
        FULL_GRAYSCALE.is_match(&self.filter)
    }

    /// Opacity strictly below `threshold`. Missing opacity renders as 1.
    pub fn is_faded(&self, threshold: f64) -> bool {
        self.opacity.is_some_and(|opacity| opacity < threshold)
    }

    pub fn positive_width(&self) -> Option<f64> {
        self.width.filter(|w| *w > 0.0)
    }
}

/// Pixel length such as `64px` or `64`; other units are not rendered sizes.
fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim().to_ascii_lowercase();
    let number = value.strip_suffix("px").unwrap_or(&value).trim();
    number.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn test_declarations() {
        let style = VisualStyle::from_declarations(
            "display:inline; FILTER: Grayscale(100%); opacity: 0.4; width: 16px",
        );
        assert!(style.is_full_grayscale());
        assert!(style.is_faded(0.8));
        assert_eq!(style.positive_width(), Some(16.0));
    }

    #[test]
    fn test_partial_grayscale_is_not_empty() {
        let style = VisualStyle::from_declarations("filter: grayscale(0.5)");
        assert!(!style.is_full_grayscale());
        assert!(!style.is_faded(0.8));
    }

    #[test]
    fn test_width_attribute_fallback() {
        let html = Html::parse_fragment(r#"<img class="star" width="14" style="opacity: 1">"#);
        let img = html.select(&Selector::parse("img").unwrap()).next().unwrap();
        let style = VisualStyle::of(img);
        assert_eq!(style.positive_width(), Some(14.0));
        assert_eq!(style.opacity, Some(1.0));
    }

    #[test]
    fn test_relative_units_are_ignored() {
        assert_eq!(VisualStyle::from_declarations("width: 50%").width, None);
    }
}
