//! Harvested review record and its identity rules.

use serde::{Deserialize, Serialize};

/// Separator for dedup key parts. A control character never present in
/// rendered user names, dates, or review bodies.
pub const DEDUP_KEY_SEPARATOR: char = '\u{1f}';

/// Highest star rating a review can carry.
pub const MAX_RATING: u8 = 5;

/// One harvested review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Star rating in `0..=5`, `None` when no rating tier succeeded.
    pub rating: Option<u8>,
    pub date: Option<String>,
    pub user: Option<String>,
    pub verified: bool,
    /// Whitespace-collapsed body text.
    pub content: String,
    /// Whitespace-collapsed purchased variant description, may be empty.
    pub sku: String,
    pub likes: u32,
    /// Absolute image URLs in DOM scan order, without duplicates.
    pub images: Vec<String>,
}

impl ReviewRecord {
    /// Identity of a review across pages: user, date and content.
    ///
    /// Absent parts contribute an empty segment so that two records missing
    /// the same fields still compare equal.
    pub fn dedup_key(&self) -> String {
        let mut key = String::with_capacity(
            self.user.as_deref().map_or(0, str::len)
                + self.date.as_deref().map_or(0, str::len)
                + self.content.len()
                + 2,
        );
        key.push_str(self.user.as_deref().unwrap_or_default());
        key.push(DEDUP_KEY_SEPARATOR);
        key.push_str(self.date.as_deref().unwrap_or_default());
        key.push(DEDUP_KEY_SEPARATOR);
        key.push_str(&self.content);
        key
    }
}

/// Clamp a computed rating into `0..=5`.
pub fn clamp_rating(value: i64) -> u8 {
    u8::try_from(value.clamp(0, i64::from(MAX_RATING))).unwrap_or(0)
}

/// Collapse internal whitespace runs to single spaces and trim.
pub fn normalize_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user: Option<&str>, date: Option<&str>, content: &str) -> ReviewRecord {
        ReviewRecord {
            user: user.map(str::to_string),
            date: date.map(str::to_string),
            content: content.to_string(),
            ..ReviewRecord::default()
        }
    }

    #[test]
    fn dedup_key_ignores_non_identity_fields() {
        let mut a = record(Some("ann"), Some("01 Jan 2024"), "great");
        let mut b = a.clone();
        a.likes = 3;
        b.rating = Some(4);
        b.images.push("https://img.example/1.jpg".to_string());
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn dedup_key_does_not_confuse_shifted_fields() {
        let a = record(Some("ab"), Some("c"), "");
        let b = record(Some("a"), Some("bc"), "");
        assert_ne!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn absent_and_empty_parts_share_a_key() {
        let a = record(None, None, "text");
        let b = record(Some(""), Some(""), "text");
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_clamp_rating() {
        assert_eq!(clamp_rating(-2), 0);
        assert_eq!(clamp_rating(3), 3);
        assert_eq!(clamp_rating(9), 5);
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Good \n\n  value\tfor money  "), "Good value for money");
        assert_eq!(normalize_text(" \n "), "");
    }
}
