//! Lenient number parsing for rendered text.
//!
//! Rendered counters carry decoration ("12 likes", " 3 "), so only the
//! leading numeric run counts.

/// Leading integer: optional whitespace, optional sign, then digits.
/// Text after the digits is ignored.
pub fn parse_leading_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }

    let magnitude: i64 = rest[..digits_end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Leading decimal number such as `0.5` in `"0.5 !important"`.
pub fn parse_leading_float(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let end = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || ((c == '-' || c == '+') && i == 0)))
        .map_or(trimmed.len(), |(i, _)| i);

    // Shrink until the prefix parses, so "1.2.3" yields 1.2.
    (1..=end)
        .rev()
        .find_map(|len| trimmed[..len].parse::<f64>().ok())
}

/// Positive page number from a pagination control label.
pub fn parse_page_number(text: &str) -> Option<u32> {
    parse_leading_int(text)
        .filter(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok())
}

/// Non-negative counter; anything unparsable or negative is 0.
pub fn parse_counter(text: &str) -> u32 {
    parse_leading_int(text)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("12", Some(12))]
    #[case("  7 likes", Some(7))]
    #[case("-3", Some(-3))]
    #[case("+4", Some(4))]
    #[case("abc", None)]
    #[case("", None)]
    #[case("- 3", None)]
    fn test_parse_leading_int(#[case] input: &str, #[case] expected: Option<i64>) {
        assert_eq!(parse_leading_int(input), expected);
    }

    #[rstest]
    #[case("0.5", Some(0.5))]
    #[case("1", Some(1.0))]
    #[case(" .25x", Some(0.25))]
    #[case("1.2.3", Some(1.2))]
    #[case("none", None)]
    fn test_parse_leading_float(#[case] input: &str, #[case] expected: Option<f64>) {
        assert_eq!(parse_leading_float(input), expected);
    }

    #[test]
    fn test_page_numbers_must_be_positive() {
        assert_eq!(parse_page_number("3"), Some(3));
        assert_eq!(parse_page_number("0"), None);
        assert_eq!(parse_page_number("..."), None);
    }

    #[test]
    fn test_counter_defaults_to_zero() {
        assert_eq!(parse_counter("15"), 15);
        assert_eq!(parse_counter("Helpful"), 0);
        assert_eq!(parse_counter("-2"), 0);
    }
}
