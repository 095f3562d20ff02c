use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON (de)serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Calendar conversion failed: {0}")]
    Calendar(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Name lookup table {} could not be loaded: {message}", path.display())]
    NameTable { path: PathBuf, message: String },

    #[error("Source {source_id} failed: {message}")]
    Source { source_id: String, message: String },
}

pub type Result<T> = std::result::Result<T, ScraperError>;
