use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::cell_price;
use crate::constants::{CRYPTO_SOURCE, SITE_ORIGIN};
use crate::names::{title_case, NameLookup};
use crate::parser::{select_text, static_selector};
use crate::types::{PriceRecord, PriceSource};

static ROW: Lazy<Selector> = Lazy::new(|| static_selector("table.cryptoTbl tbody tr"));
static SYMBOL: Lazy<Selector> = Lazy::new(|| static_selector(".symbolCurr"));
static NAME_FA: Lazy<Selector> = Lazy::new(|| static_selector(".faCurr"));
static NAME_EN: Lazy<Selector> = Lazy::new(|| static_selector(".enCurr"));
static TOMAN: Lazy<Selector> = Lazy::new(|| static_selector(".tmn"));
static DOLLAR: Lazy<Selector> = Lazy::new(|| static_selector(".dlr"));
static ICON: Lazy<Selector> = Lazy::new(|| static_selector(".CurrIco"));

/// Stable coins are published in toman, everything else in dollars.
const TOMAN_PRICED: [&str; 2] = ["usdt", "dai"];

/// Cryptocurrency table with a toman and a dollar price column.
#[derive(Debug)]
pub struct CryptoExtractor {
    origin: String,
}

impl Default for CryptoExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl CryptoExtractor {
    pub fn new() -> Self {
        Self::with_origin(SITE_ORIGIN)
    }

    /// Origin prepended to relative icon paths.
    pub fn with_origin(origin: &str) -> Self {
        Self {
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    /// Pick the published price for `code` from its two columns.
    pub fn select_price(code: &str, toman: f64, dollar: f64) -> f64 {
        let price = if TOMAN_PRICED.contains(&code) {
            toman
        } else {
            dollar
        };
        if code == "btc" {
            price.trunc()
        } else {
            price
        }
    }

    fn absolute_icon(&self, src: &str) -> String {
        let src = src.trim();
        if src.is_empty() || src.starts_with("http") {
            return src.to_string();
        }
        if src.starts_with('/') {
            format!("{}{}", self.origin, src)
        } else {
            format!("{}/{}", self.origin, src)
        }
    }

    fn extract_row(&self, row: &ElementRef) -> Option<PriceRecord> {
        let code = select_text(row, &SYMBOL).to_lowercase();
        if code.is_empty() {
            return None;
        }

        let toman = cell_price(CRYPTO_SOURCE, &code, &select_text(row, &TOMAN));
        let dollar = cell_price(CRYPTO_SOURCE, &code, &select_text(row, &DOLLAR));
        let src = row
            .select(&ICON)
            .next()
            .and_then(|img| img.value().attr("src"))
            .unwrap_or_default();

        let english = select_text(row, &NAME_EN);
        let display_name = if english.is_empty() {
            title_case(&code)
        } else {
            title_case(&english)
        };

        Some(PriceRecord {
            price: Self::select_price(&code, toman, dollar),
            local_name: select_text(row, &NAME_FA),
            icon_url: self.absolute_icon(src),
            display_name,
            code,
        })
    }
}

impl PriceSource for CryptoExtractor {
    fn source_id(&self) -> &'static str {
        CRYPTO_SOURCE
    }

    fn extract(&self, document: &Html, _names: &NameLookup) -> Vec<PriceRecord> {
        let records: Vec<PriceRecord> = document
            .select(&ROW)
            .filter_map(|row| self.extract_row(&row))
            .collect();

        debug!("Parsed {} crypto rows", records.len());
        if records.is_empty() {
            warn!("No crypto rows found - the page structure may have changed");
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <table class="cryptoTbl"><tbody>
          <tr>
            <td><img class="CurrIco" src="/img/crypto/btc.png">
                <span class="faCurr">بیت کوین</span><span class="enCurr">BITCOIN</span>
                <span class="symbolCurr">BTC</span></td>
            <td class="tmn">۶٬۱۲۰٬۰۰۰٬۰۰۰</td>
            <td class="dlr">$104,532.87</td>
          </tr>
          <tr>
            <td><img class="CurrIco" src="https://cdn.example.com/usdt.svg">
                <span class="faCurr">تتر</span><span class="enCurr">tether</span>
                <span class="symbolCurr">USDT</span></td>
            <td class="tmn">۵۸٬۶۰۰</td>
            <td class="dlr">$1.0002</td>
          </tr>
          <tr>
            <td><img class="CurrIco" src="/img/crypto/eth.png">
                <span class="faCurr">اتریوم</span><span class="enCurr">ethereum</span>
                <span class="symbolCurr">ETH</span></td>
            <td class="tmn">۱۴۵٬۰۰۰٬۰۰۰</td>
            <td class="dlr">$2,480.55</td>
          </tr>
          <tr>
            <td><span class="faCurr">بدون نماد</span></td>
            <td class="tmn">۱</td><td class="dlr">$1</td>
          </tr>
        </tbody></table>
        <table><tbody><tr><td class="symbolCurr">XRP</td></tr></tbody></table>
        </body></html>
    "#;

    fn extract() -> Vec<PriceRecord> {
        CryptoExtractor::new().extract(&Html::parse_document(PAGE), &NameLookup::default())
    }

    #[test]
    fn test_only_crypto_table_rows_with_symbol() {
        let codes: Vec<String> = extract().into_iter().map(|r| r.code).collect();
        assert_eq!(codes, vec!["btc", "usdt", "eth"]);
    }

    #[test]
    fn test_btc_uses_dollar_price_as_integer() {
        let btc = &extract()[0];
        assert_eq!(btc.price, 104_532.0);
        assert_eq!(btc.price.fract(), 0.0);
        assert_eq!(btc.display_name, "Bitcoin");
        assert_eq!(btc.local_name, "بیت کوین");
        assert_eq!(btc.icon_url, "https://alanchand.com/img/crypto/btc.png");
    }

    #[test]
    fn test_stable_coin_uses_toman_price() {
        let usdt = &extract()[1];
        assert_eq!(usdt.price, 58_600.0);
        assert_eq!(usdt.icon_url, "https://cdn.example.com/usdt.svg");
        assert_eq!(usdt.display_name, "Tether");
    }

    #[test]
    fn test_other_coins_use_dollar_price() {
        let eth = &extract()[2];
        assert_eq!(eth.price, 2480.55);
    }

    #[test]
    fn test_select_price_rules() {
        assert_eq!(CryptoExtractor::select_price("usdt", 58_000.0, 1.0), 58_000.0);
        assert_eq!(CryptoExtractor::select_price("dai", 57_900.0, 0.99), 57_900.0);
        assert_eq!(CryptoExtractor::select_price("sol", 9_000_000.0, 152.3), 152.3);
        assert_eq!(CryptoExtractor::select_price("btc", 1.0, 99_999.99), 99_999.0);
    }

    #[test]
    fn test_absolute_icon() {
        let extractor = CryptoExtractor::with_origin("https://alanchand.com/");
        assert_eq!(extractor.absolute_icon("/a.png"), "https://alanchand.com/a.png");
        assert_eq!(extractor.absolute_icon("a.png"), "https://alanchand.com/a.png");
        assert_eq!(extractor.absolute_icon("http://x/a.png"), "http://x/a.png");
        assert_eq!(extractor.absolute_icon(""), "");
    }
}
