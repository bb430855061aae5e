//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Number of title words shown on product cards.
const SHORT_TITLE_WORDS: usize = 2;

/// Shortens a product title to its first two words for grid cards.
///
/// Usage in templates: `{{ product.title|short_title }}`
#[askama::filter_fn]
pub fn short_title(title: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(shorten(&title.to_string()))
}

/// Formats a rating average with one decimal place.
///
/// Usage in templates: `{{ product.ratings_average|rating }}`
#[askama::filter_fn]
pub fn rating(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_rating(&value.to_string()))
}

fn shorten(title: &str) -> String {
    title
        .split_whitespace()
        .take(SHORT_TITLE_WORDS)
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_rating(raw: &str) -> String {
    raw.parse::<f64>()
        .map_or_else(|_| raw.to_string(), |v| format!("{v:.1}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorten() {
        assert_eq!(shorten("Woman Shawl With Fringes"), "Woman Shawl");
        assert_eq!(shorten("Laptop"), "Laptop");
        assert_eq!(shorten("  spaced   out  title "), "spaced out");
    }

    #[test]
    fn test_format_rating() {
        assert_eq!(format_rating("4.8"), "4.8");
        assert_eq!(format_rating("4"), "4.0");
        assert_eq!(format_rating("4.76"), "4.8");
        assert_eq!(format_rating("n/a"), "n/a");
    }
}
