/// Source identifiers used on the CLI, in logs and in metrics labels.
/// The order of [`SOURCE_ORDER`] is the order records appear in the snapshot.
pub const CURRENCY_SOURCE: &str = "currency";
pub const GOLD_SOURCE: &str = "gold";
pub const CRYPTO_SOURCE: &str = "crypto";

pub const SOURCE_ORDER: [&str; 3] = [CURRENCY_SOURCE, GOLD_SOURCE, CRYPTO_SOURCE];

// Upstream pages
pub const SITE_ORIGIN: &str = "https://alanchand.com";
pub const CURRENCY_URL: &str = "https://alanchand.com/currencies-price";
pub const GOLD_URL: &str = "https://alanchand.com/gold-price";
pub const CRYPTO_URL: &str = "https://alanchand.com/crypto-price";

// Row navigation attributes look like `window.location='/gold-price/sekkeh'`
pub const CURRENCY_NAV_PREFIX: &str = "window.location='/currencies-price/";
pub const GOLD_NAV_PREFIX: &str = "window.location='/gold-price/";
pub const NAV_SUFFIX: &str = "'";

/// `{flag}` is replaced by the resolved flag key.
pub const FLAG_ICON_TEMPLATE: &str =
    "https://raw.githubusercontent.com/HatScripts/circle-flags/refs/heads/gh-pages/flags/{flag}.svg";

// Local files
pub const DEFAULT_CONFIG_PATH: &str = "arz.toml";
pub const DEFAULT_OUTPUT_PATH: &str = "arz.json";
pub const DEFAULT_NAMES_PATH: &str = "currencies.json";
pub const DEFAULT_LOG_DIR: &str = "logs";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Timezone the snapshot timestamp is rendered in.
pub const SNAPSHOT_TIMEZONE: chrono_tz::Tz = chrono_tz::Asia::Tehran;

/// Returns true if `name` is one of the known source ids.
pub fn is_known_source(name: &str) -> bool {
    SOURCE_ORDER.contains(&name)
}
