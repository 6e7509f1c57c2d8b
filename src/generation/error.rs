//! Content generation errors.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum GenerationError {
    /// A required request field is missing or blank.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The character id is not in the catalog.
    #[error("Unknown character type: {0}")]
    UnknownCharacter(String),

    /// No API key configured for the remote generator.
    #[error("Missing generation API key")]
    MissingApiKey,

    /// Transport-level failure talking to the remote generator.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote generator answered with a non-success status.
    #[error("Generation API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The remote generator answered 2xx but the body had no usable content.
    #[error("Malformed generation response: {0}")]
    MalformedResponse(String),

    /// Every attempt failed with a retryable error.
    #[error("Generation failed after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    /// Persisting the result failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
