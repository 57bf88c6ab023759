use thiserror::Error;

/// Malformed or missing request fields, rejected before storage is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors raised by the conversation store.
///
/// `Write` and `Delete` are reported after the in-memory mapping has already
/// been mutated; the store does not roll memory back.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid conversation id: {0}")]
    InvalidId(#[from] ValidationError),

    #[error("storage directory error at '{path}': {message}")]
    Directory { path: String, message: String },

    #[error("failed to write conversation '{id}': {message}")]
    Write { id: String, message: String },

    #[error("failed to delete conversation '{id}': {message}")]
    Delete { id: String, message: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors surfaced by the chat gateway to request handlers.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("conversation '{0}' not found")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {message}")]
    Read { path: String, message: String },

    #[error("failed to parse config file '{path}': {message}")]
    Parse { path: String, message: String },
}
