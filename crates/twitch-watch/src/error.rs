//! Error types for channel tracking and watch pings.

use thiserror::Error;

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, WatchError>;

/// The scrape stage at which spade URL extraction failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStep {
    /// The channel page did not reference a settings script.
    SettingsScript,
    /// The settings script did not contain a `spade_url` assignment.
    SpadeUrl,
}

impl ExtractionStep {
    pub fn number(&self) -> u8 {
        match self {
            Self::SettingsScript => 1,
            Self::SpadeUrl => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error while spade_url extraction: step #{}", .step.number())]
pub struct ExtractionError {
    pub step: ExtractionStep,
}

impl ExtractionError {
    pub fn new(step: ExtractionStep) -> Self {
        Self { step }
    }
}

/// Errors surfaced by channel operations.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("base64 error: {0}")]
    Decode(#[from] base64::DecodeError),
    /// The GraphQL response did not have the expected shape.
    #[error("gql error: {0}")]
    Gql(String),
    /// Failure reported by a non-reqwest client implementation.
    #[error("client error: {0}")]
    Client(String),
}

impl WatchError {
    pub fn gql(msg: impl Into<String>) -> Self {
        Self::Gql(msg.into())
    }

    pub fn client(msg: impl Into<String>) -> Self {
        Self::Client(msg.into())
    }

    /// Returns the failed scrape step when this is an extraction error.
    pub fn extraction_step(&self) -> Option<ExtractionStep> {
        match self {
            Self::Extraction(e) => Some(e.step),
            _ => None,
        }
    }
}
