//! DOM helpers shared by the price extractors.

pub mod numeric;

use scraper::{ElementRef, Selector};

pub use numeric::{parse_number, try_parse_number};

/// Parse a selector that is a compile-time constant.
pub(crate) fn static_selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {css:?}: {e:?}"))
}

/// Recover a row code from its navigation attribute, e.g.
/// `window.location='/currencies-price/usd'` with prefix
/// `window.location='/currencies-price/` yields `usd`.
///
/// Prefix and suffix are removed only when present. Codes are always lowercase.
pub fn code_from_nav_attr(attr: &str, prefix: &str, suffix: &str) -> String {
    let trimmed = attr.strip_suffix(suffix).unwrap_or(attr);
    let trimmed = trimmed.strip_prefix(prefix).unwrap_or(trimmed);
    trimmed.trim().to_lowercase()
}

/// Concatenated, trimmed text of an element.
pub fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Text of the first child node: a text node's own text, or an element's full text.
///
/// Price cells carry the number first and then nested markup (currency unit,
/// change badges) that must not be part of the value.
pub fn first_node_text(element: &ElementRef) -> String {
    let Some(first) = element.first_child() else {
        return String::new();
    };
    if let Some(text) = first.value().as_text() {
        return text.trim().to_string();
    }
    ElementRef::wrap(first)
        .map(|child| element_text(&child))
        .unwrap_or_default()
}

/// Text of the first element matching `selector` under `row`, or empty.
pub fn select_text(row: &ElementRef, selector: &Selector) -> String {
    row.select(selector)
        .next()
        .map(|e| element_text(&e))
        .unwrap_or_default()
}
