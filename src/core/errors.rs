use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("Timed out after {after:?} waiting for {what}")]
    Timeout { what: String, after: Duration },

    #[error("Element not found: {0}")]
    NotFound(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Script evaluation error: {0}")]
    Script(String),

    /// Per-item parse failure. Extraction code logs and skips these; operations never return them.
    #[error("Malformed data: {0}")]
    MalformedData(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ScraperError {
    pub fn timeout(what: impl Into<String>, after: Duration) -> Self {
        ScraperError::Timeout {
            what: what.into(),
            after,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ScraperError::Timeout { .. })
    }
}

pub type ScraperResult<T> = Result<T, ScraperError>;
