use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::names::NameLookup;

/// One normalized price entry, shared by all three sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Lowercase currency code, metal code or crypto ticker. Never empty.
    pub code: String,
    /// Name as written on the source page (Persian).
    #[serde(rename = "name")]
    pub local_name: String,
    pub price: f64,
    /// Absolute icon URL or empty.
    #[serde(rename = "icon")]
    pub icon_url: String,
    /// Title-Case English label.
    #[serde(rename = "en")]
    pub display_name: String,
}

/// The document written to disk: a timestamp plus every record, currency first,
/// then gold, then crypto.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "date")]
    pub generated_at: String,
    #[serde(rename = "currencies")]
    pub records: Vec<PriceRecord>,
}

/// Core trait every price page implements: turn a parsed document into records.
///
/// Extractors never fail. A bad cell degrades to zero, a row without a code is
/// dropped, and a page whose layout changed simply yields no records.
pub trait PriceSource: Send + Sync {
    /// Unique identifier for this source, see [`crate::constants::SOURCE_ORDER`]
    fn source_id(&self) -> &'static str;

    /// Walk the document's table rows and emit records in page order
    fn extract(&self, document: &Html, names: &NameLookup) -> Vec<PriceRecord>;
}
