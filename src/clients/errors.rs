use thiserror::Error;

/// Result alias used across the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("LastFM error {code}: {message}")]
    LastFMError { code: u32, message: String },

    #[error("LastFM Deserialization error: {0}")]
    LastFMDeserializationError(#[from] serde_json::Error),

    #[error("LastFM API unexpected response: {0}")]
    LastFMUnexpectedResponse(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Username must not be empty")]
    InvalidUsername,

    #[error("Storage error: {0}")]
    StorageError(#[from] async_duckdb::Error),
}

/// Outcome of a retry that did not produce a new recommendation list.
///
/// These are expected conditions rather than failures: the caller shows the
/// message and keeps offering whatever queue it still has.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryError {
    #[error("No recommendations to retry.")]
    EmptyQueue,

    #[error("No results found for the first recommendation. Queue updated.")]
    NoResults,
}
