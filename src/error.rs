use std::time::Duration;

/// Failure of a single lookup against the models/stations service.
///
/// Every variant renders the same way in the UI: the dependent field shows
/// a "Failed to load ..." entry and is re-enabled so the user can retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("Request failed: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Lookup timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type AppResult<T> = Result<T, AppError>;
