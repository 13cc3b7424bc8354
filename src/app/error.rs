use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RedthreadError {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    BadStatus { status: StatusCode, url: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Listing limit must be between 1 and 100, got {0}")]
    InvalidLimit(u32),

    #[error("No link id available for comment expansion")]
    MissingLinkId,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Summarizer error: {0}")]
    Summarize(String),

    #[error("Question is empty")]
    EmptyQuestion,

    #[error("{0}")]
    Other(String),
}

impl RedthreadError {
    /// Transport failures and bad statuses are transient; decode failures are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RedthreadError::Transport(_) | RedthreadError::BadStatus { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RedthreadError>;
