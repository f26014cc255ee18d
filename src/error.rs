//! Error types for fetching and shaping indicator data

use thiserror::Error;

/// Failure of a single provider call.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed provider response: {0}")]
    Parse(String),

    #[error("API key is empty or missing")]
    MissingApiKey,
}

impl FetchError {
    /// Timeouts, connection failures and 5xx responses are worth another try.
    /// A 4xx almost always means a bad series id or key.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Timeout(_) => true,
            FetchError::Transport(e) => !e.is_decode() && !e.is_builder(),
            FetchError::Status { status, .. } => *status >= 500,
            FetchError::Parse(_) | FetchError::MissingApiKey => false,
        }
    }
}

/// Reasons a fetched series cannot be turned into an indicator update.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("insufficient data: need at least {needed} points, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("fewer than two dates shared by both legs of the spread")]
    NoSpread,

    #[error("indicator {0} needs a secondary series")]
    MissingSecondary(String),

    #[error("unparseable date '{0}'")]
    BadDate(String),

    #[error("values ({values}) and dates ({dates}) differ in length")]
    LengthMismatch { values: usize, dates: usize },
}
