pub mod crypto;
pub mod currency;
pub mod gold;

use std::sync::Arc;
use tracing::warn;

use crate::constants::{CRYPTO_SOURCE, CURRENCY_SOURCE, GOLD_SOURCE};
use crate::parser::try_parse_number;
use crate::types::PriceSource;

pub use crypto::CryptoExtractor;
pub use currency::CurrencyExtractor;
pub use gold::GoldExtractor;

/// Build the extractor registered under `source_id`.
pub fn create_source(source_id: &str) -> Option<Arc<dyn PriceSource>> {
    match source_id {
        CURRENCY_SOURCE => Some(Arc::new(CurrencyExtractor::new())),
        GOLD_SOURCE => Some(Arc::new(GoldExtractor::new())),
        CRYPTO_SOURCE => Some(Arc::new(CryptoExtractor::new())),
        _ => None,
    }
}

/// Normalize a price cell. Unparsable text becomes `0.0`; a non-empty cell that
/// degrades is logged so bad page data is visible without failing the row.
pub(crate) fn cell_price(source_id: &str, code: &str, raw: &str) -> f64 {
    match try_parse_number(raw) {
        Some(v) => v,
        None => {
            if !raw.trim().is_empty() {
                warn!(source = source_id, code, raw, "Unparsable price cell, using 0");
            }
            0.0
        }
    }
}
