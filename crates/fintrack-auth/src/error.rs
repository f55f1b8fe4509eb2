//! Error types

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Secure storage failed during a mutating operation
    #[error("Store error: {0}")]
    Store(#[from] fintrack_keystore::Error),

    /// PIN hashing or hash parsing failed
    #[error("Hash error: {0}")]
    Hash(String),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
