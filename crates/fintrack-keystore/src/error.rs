//! Error types

/// Credential store errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Underlying platform storage failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Access-policy violation (e.g. plain read of a hardware-gated item)
    #[error("Security error: {0}")]
    Security(String),

    /// Key material is malformed or the wrong size
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Stored value failed validation
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
