//! Error types for session store operations.

/// Error type for session store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Key was empty or could not be used as a session key.
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    /// Value was null or `false`, which cannot be stored.
    #[error("Invalid value for key {0:?}: null and false cannot be stored")]
    InvalidValue(String),

    /// Expiry duration was non-numeric or zero.
    #[error("Invalid expiry duration: {0}")]
    InvalidDuration(String),

    /// The session was opened read-only.
    #[error("Session is read-only: {0}")]
    ReadOnly(String),

    /// Session was not found in the backend.
    #[error("Session not found: {0}")]
    NotFound(String),

    /// Session outlived its configured lifetime.
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// Error from the storage backend.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Snapshot could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for session store operations.
pub type Result<T> = std::result::Result<T, Error>;
