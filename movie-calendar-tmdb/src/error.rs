//! Error type for the TMDb client and enricher.

/// Errors that can occur while talking to TMDb.
#[derive(Debug, thiserror::Error)]
pub enum TmdbError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("No TMDb API key configured")]
    MissingApiKey,

    #[error("TMDb rejected the API key (HTTP {0})")]
    Unauthorized(u16),

    #[error("TMDb lookups disabled for this run after an authentication failure")]
    CircuitOpen,

    #[error("Rate limited by TMDb")]
    RateLimit,

    #[error("No TMDb match found")]
    NotFound { warnings: Vec<String> },

    #[error("Server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TmdbError {
    /// Authentication-class failures disable the provider for the rest of a run.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::MissingApiKey | Self::Unauthorized(_))
    }
}
