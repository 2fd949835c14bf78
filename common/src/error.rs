use thiserror::Error;

/// Failure modes of a scrape cycle. Every variant is fatal for the cycle.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Market data unavailable: {0}")]
    MarketData(String),

    #[error("No post titled like '{pattern}' among the hot posts of {community}")]
    ThreadNotFound { pattern: String, community: String },

    #[error("Forum authentication failed: {0}")]
    Auth(String),

    #[error("Forum response malformed: {0}")]
    Forum(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;
