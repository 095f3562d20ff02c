use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use tracing::{debug, warn};

use super::cell_price;
use crate::constants::{GOLD_NAV_PREFIX, GOLD_SOURCE, NAV_SUFFIX};
use crate::names::{title_case, NameLookup};
use crate::parser::{code_from_nav_attr, first_node_text, select_text, static_selector};
use crate::types::{PriceRecord, PriceSource};

static ROW: Lazy<Selector> = Lazy::new(|| static_selector("table tbody tr"));
static FIRST_CELL: Lazy<Selector> = Lazy::new(|| static_selector("td"));
static PRICE_CELL: Lazy<Selector> = Lazy::new(|| static_selector("td.priceTd"));

/// Hosted images for the metals the page lists.
static GOLD_ICONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("abshodeh", "https://platform.tgju.org/files/images/gold-bar-1622253729.png"),
        ("18ayar", "https://platform.tgju.org/files/images/gold-bar-1-1622253841.png"),
        ("sekkeh", "https://platform.tgju.org/files/images/gold-1697963730.png"),
        ("bahar", "https://platform.tgju.org/files/images/gold-1-1697963918.png"),
        ("nim", "https://platform.tgju.org/files/images/money-1697964123.png"),
        ("rob", "https://platform.tgju.org/files/images/revenue-1697964369.png"),
        ("sek", "https://platform.tgju.org/files/images/parsian-coin-1697964860.png"),
        ("usd_xau", "https://platform.tgju.org/files/images/gold-1-1622253769.png"),
        ("xag", "https://platform.tgju.org/files/images/silver-1624079710.png"),
    ])
});

/// Gold, coin and silver table.
#[derive(Debug, Default)]
pub struct GoldExtractor;

impl GoldExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn icon_for(code: &str) -> &'static str {
        GOLD_ICONS.get(code).copied().unwrap_or_default()
    }

    /// Published code for a page code. The gram coin is listed as `sek`.
    pub fn output_code(code: &str) -> String {
        match code {
            "sek" => "gram".to_string(),
            other => other.to_string(),
        }
    }

    fn extract_row(row: &ElementRef) -> Option<PriceRecord> {
        let nav = row.value().attr("onclick").unwrap_or_default();
        let code = code_from_nav_attr(nav, GOLD_NAV_PREFIX, NAV_SUFFIX);
        if code.is_empty() {
            return None;
        }

        let local_name = select_text(row, &FIRST_CELL);
        let raw_price = row
            .select(&PRICE_CELL)
            .next()
            .map(|cell| first_node_text(&cell))
            .unwrap_or_default();

        Some(PriceRecord {
            code: Self::output_code(&code),
            local_name,
            price: cell_price(GOLD_SOURCE, &code, &raw_price),
            icon_url: Self::icon_for(&code).to_string(),
            // label follows the page code, not the published one
            display_name: title_case(&code),
        })
    }
}

impl PriceSource for GoldExtractor {
    fn source_id(&self) -> &'static str {
        GOLD_SOURCE
    }

    fn extract(&self, document: &Html, _names: &NameLookup) -> Vec<PriceRecord> {
        let records: Vec<PriceRecord> = document
            .select(&ROW)
            .filter_map(|row| Self::extract_row(&row))
            .collect();

        debug!("Parsed {} gold rows", records.len());
        if records.is_empty() {
            warn!("No gold rows found - the page structure may have changed");
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body><table><tbody>
          <tr onclick="window.location='/gold-price/abshodeh'">
            <td>مثقال طلا</td>
            <td class="priceTd">۲۱٬۵۴۰٬۰۰۰ <small>تومان</small></td>
            <td class="priceTd">۲۱٬۰۰۰٬۰۰۰</td>
          </tr>
          <tr onclick="window.location='/gold-price/sek'">
            <td>سکه گرمی</td>
            <td class="priceTd">۱۹٬۸۰۰٬۰۰۰</td>
          </tr>
          <tr onclick="window.location='/gold-price/mesghal_new'">
            <td>مثقال جدید</td>
            <td class="priceTd">-</td>
          </tr>
          <tr><td>بدون کد</td><td class="priceTd">۱</td></tr>
        </tbody></table></body></html>
    "#;

    fn extract(html: &str) -> Vec<PriceRecord> {
        GoldExtractor::new().extract(&Html::parse_document(html), &NameLookup::default())
    }

    #[test]
    fn test_first_price_cell_and_first_text_node() {
        let records = extract(PAGE);
        let abshodeh = &records[0];
        assert_eq!(abshodeh.code, "abshodeh");
        assert_eq!(abshodeh.local_name, "مثقال طلا");
        assert_eq!(abshodeh.price, 21_540_000.0);
        assert_eq!(abshodeh.display_name, "Abshodeh");
        assert_eq!(
            abshodeh.icon_url,
            "https://platform.tgju.org/files/images/gold-bar-1622253729.png"
        );
    }

    #[test]
    fn test_sek_is_published_as_gram() {
        let records = extract(PAGE);
        let gram = &records[1];
        assert_eq!(gram.code, "gram");
        assert_eq!(gram.display_name, "Sek");
        assert_eq!(gram.icon_url, GoldExtractor::icon_for("sek"));
        assert!(!gram.icon_url.is_empty());
    }

    #[test]
    fn test_unknown_code_has_no_icon_and_rows_without_code_drop() {
        let records = extract(PAGE);
        assert_eq!(records.len(), 3);
        let unknown = &records[2];
        assert_eq!(unknown.code, "mesghal_new");
        assert_eq!(unknown.icon_url, "");
        assert_eq!(unknown.price, 0.0);
    }

    #[test]
    fn test_uppercase_nav_path_is_lowercased_before_lookups() {
        let records = extract(
            r#"<table><tbody>
              <tr onclick="window.location='/gold-price/SEK'">
                <td>سکه گرمی</td><td class="priceTd">۱۹٬۸۰۰٬۰۰۰</td>
              </tr>
            </tbody></table>"#,
        );
        assert_eq!(records[0].code, "gram");
        assert_eq!(records[0].icon_url, GoldExtractor::icon_for("sek"));
        assert_eq!(records[0].display_name, "Sek");
    }
}
