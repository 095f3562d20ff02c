//! Display-name resolution.
//!
//! Currency rows are labelled through a static country-code lookup loaded once at
//! startup; gold and crypto rows are labelled by Title-Casing their own text.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{Result, ScraperError};

#[derive(Debug, Deserialize)]
struct CountryEntry {
    country: String,
    en: String,
}

/// Read-only map from lowercase flag/country code to English name.
///
/// Built before any fetch starts and then shared behind an `Arc`, so concurrent
/// readers never need a lock.
#[derive(Debug, Clone, Default)]
pub struct NameLookup {
    names: HashMap<String, String>,
}

impl NameLookup {
    /// Load the lookup from a JSON array of `{"country": .., "en": ..}` objects.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| ScraperError::NameTable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json(&raw).map_err(|e| ScraperError::NameTable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let entries: Vec<CountryEntry> = serde_json::from_str(raw)?;
        let total = entries.len();
        let mut names = HashMap::with_capacity(total);
        for entry in entries {
            let key = entry.country.trim().to_lowercase();
            if key.is_empty() {
                warn!(en = %entry.en, "Skipping lookup entry with empty country code");
                continue;
            }
            names.insert(key, entry.en.trim().to_string());
        }
        debug!("Loaded {} of {} country names", names.len(), total);
        Ok(Self { names })
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.names
            .get(&code.to_lowercase())
            .map(String::as_str)
            .filter(|n| !n.is_empty())
    }

    /// Currency label: the lookup hit for `flag`, else Title-Case of `fallback_code`.
    pub fn resolve_currency(&self, flag: &str, fallback_code: &str) -> String {
        match self.get(flag) {
            Some(name) => name.to_string(),
            None => title_case(fallback_code),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(String, String)> for NameLookup {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            names: iter
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
        }
    }
}

/// Lowercase everything, then uppercase the first letter of each
/// whitespace-separated word. Inner whitespace is kept as is.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.trim().chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            at_word_start = false;
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("united states"), "United States");
        assert_eq!(title_case("eURo"), "Euro");
        assert_eq!(title_case("  usd_xau "), "Usd_xau");
        assert_eq!(title_case("18ayar"), "18ayar");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_from_json_lowercases_keys_and_skips_empty() {
        let lookup = NameLookup::from_json(
            r#"[{"country":"US","en":"United States Dollar"},
                {"country":"","en":"Nowhere"},
                {"country":"european_union","en":"Euro"}]"#,
        )
        .unwrap();

        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup.get("us"), Some("United States Dollar"));
        assert_eq!(lookup.get("US"), Some("United States Dollar"));
        assert_eq!(lookup.get("european_union"), Some("Euro"));
    }

    #[test]
    fn test_resolve_currency_falls_back_to_code() {
        let lookup: NameLookup = [("gb".to_string(), "British Pound".to_string())]
            .into_iter()
            .collect();
        assert_eq!(lookup.resolve_currency("gb", "gbp"), "British Pound");
        assert_eq!(lookup.resolve_currency("xx", "iqd"), "Iqd");
        assert_eq!(lookup.resolve_currency("", "try"), "Try");
    }

    #[test]
    fn test_load_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = NameLookup::load(&dir.path().join("currencies.json"));
        assert!(matches!(result, Err(ScraperError::NameTable { .. })));
    }

    #[test]
    fn test_load_malformed_file_is_fatal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        let result = NameLookup::load(file.path());
        assert!(matches!(result, Err(ScraperError::NameTable { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"country":"ae","en":"UAE Dirham"}}]"#).unwrap();
        let lookup = NameLookup::load(file.path()).unwrap();
        assert_eq!(lookup.get("ae"), Some("UAE Dirham"));
    }
}
