use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::cell_price;
use crate::constants::{CURRENCY_NAV_PREFIX, CURRENCY_SOURCE, FLAG_ICON_TEMPLATE, NAV_SUFFIX};
use crate::names::NameLookup;
use crate::parser::{code_from_nav_attr, first_node_text, select_text, static_selector};
use crate::types::{PriceRecord, PriceSource};

static ROW: Lazy<Selector> = Lazy::new(|| static_selector("table tbody tr"));
static NAME_CELL: Lazy<Selector> = Lazy::new(|| static_selector("td.currName"));
static SELL_CELL: Lazy<Selector> = Lazy::new(|| static_selector("td.sellPrice"));
static FLAG: Lazy<Selector> = Lazy::new(|| static_selector("td.currName .flag"));

/// Foreign currency table: one row per currency, priced by its sell column.
#[derive(Debug, Default)]
pub struct CurrencyExtractor;

impl CurrencyExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Flag key from the `flag-xx` class of the name cell's flag icon.
    /// `eu` has no circle flag of its own and is served as `european_union`.
    fn flag_key(row: &ElementRef) -> String {
        let flag = row
            .select(&FLAG)
            .next()
            .and_then(|icon| {
                icon.value()
                    .classes()
                    .find_map(|class| class.strip_prefix("flag-"))
                    .map(str::to_lowercase)
            })
            .unwrap_or_default();

        match flag.as_str() {
            "eu" => "european_union".to_string(),
            _ => flag,
        }
    }

    fn icon_url(flag: &str) -> String {
        if flag.is_empty() {
            return String::new();
        }
        FLAG_ICON_TEMPLATE.replace("{flag}", flag)
    }

    fn extract_row(row: &ElementRef, names: &NameLookup) -> Option<PriceRecord> {
        let nav = row.value().attr("onclick").unwrap_or_default();
        let code = code_from_nav_attr(nav, CURRENCY_NAV_PREFIX, NAV_SUFFIX);
        if code.is_empty() {
            return None;
        }

        let local_name = select_text(row, &NAME_CELL);
        let raw_price = row
            .select(&SELL_CELL)
            .next()
            .map(|cell| first_node_text(&cell))
            .unwrap_or_default();
        let price = cell_price(CURRENCY_SOURCE, &code, &raw_price);

        let flag = Self::flag_key(row);
        let display_name = names.resolve_currency(&flag, &code);

        Some(PriceRecord {
            icon_url: Self::icon_url(&flag),
            code,
            local_name,
            price,
            display_name,
        })
    }
}

impl PriceSource for CurrencyExtractor {
    fn source_id(&self) -> &'static str {
        CURRENCY_SOURCE
    }

    fn extract(&self, document: &Html, names: &NameLookup) -> Vec<PriceRecord> {
        let records: Vec<PriceRecord> = document
            .select(&ROW)
            .filter_map(|row| Self::extract_row(&row, names))
            .collect();

        debug!("Parsed {} currency rows", records.len());
        if records.is_empty() {
            warn!("No currency rows found - the page structure may have changed");
        }
        records
    }
}
