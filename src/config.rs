use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    CRYPTO_URL, CURRENCY_URL, DEFAULT_LOG_DIR, DEFAULT_NAMES_PATH, DEFAULT_OUTPUT_PATH,
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, GOLD_URL,
};
use crate::error::{Result, ScraperError};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub output_path: PathBuf,
    pub names_path: PathBuf,
    pub log_dir: PathBuf,
    /// Per-source fetch timeout; 0 leaves the transport default in place.
    pub timeout_secs: u64,
    pub user_agent: String,
    pub pushgateway_url: Option<String>,
    pub sources: SourceUrls,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourceUrls {
    pub currency: String,
    pub gold: String,
    pub crypto: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            names_path: PathBuf::from(DEFAULT_NAMES_PATH),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            pushgateway_url: None,
            sources: SourceUrls::default(),
        }
    }
}

impl Default for SourceUrls {
    fn default() -> Self {
        Self {
            currency: CURRENCY_URL.to_string(),
            gold: GOLD_URL.to_string(),
            crypto: CRYPTO_URL.to_string(),
        }
    }
}

/// Values given on the command line. `None` keeps whatever the file or env set.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub output_path: Option<PathBuf>,
    pub names_path: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load the TOML config at `path`. A missing file yields defaults, an unreadable
    /// or malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply `ARZ_*` environment overrides on top of the file values.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("ARZ_OUTPUT").filter(|v| !v.trim().is_empty()) {
            self.output_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("ARZ_NAMES").filter(|v| !v.trim().is_empty()) {
            self.names_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("ARZ_TIMEOUT_SECS") {
            self.timeout_secs = v.trim().parse().map_err(|_| {
                ScraperError::Config(format!("ARZ_TIMEOUT_SECS is not a number: {:?}", v))
            })?;
        }
        if let Some(v) = lookup("ARZ_PUSHGATEWAY_URL") {
            let v = v.trim();
            self.pushgateway_url = (!v.is_empty()).then(|| v.to_string());
        }
        Ok(())
    }

    /// Apply command line values, which win over both the file and the environment.
    pub fn apply_cli(&mut self, cli: CliOverrides) {
        if let Some(output) = cli.output_path {
            self.output_path = output;
        }
        if let Some(names) = cli.names_path {
            self.names_path = names;
        }
        if let Some(timeout) = cli.timeout_secs {
            self.timeout_secs = timeout;
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// URL configured for a source id, if the id is known.
    pub fn source_url(&self, source_id: &str) -> Option<&str> {
        match source_id {
            crate::constants::CURRENCY_SOURCE => Some(&self.sources.currency),
            crate::constants::GOLD_SOURCE => Some(&self.sources.gold),
            crate::constants::CRYPTO_SOURCE => Some(&self.sources.crypto),
            _ => None,
        }
    }
}
