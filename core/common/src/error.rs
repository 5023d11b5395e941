//! Common error types for credseal.
//!
//! `Encryption` and `Decryption` deliberately carry no payload. Callers log
//! these errors, so they must not reveal which step failed or any byte content.

use thiserror::Error;

/// Top-level error type for credential encryption operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The service could not be constructed (missing or weak master secret,
    /// malformed global salt). Fatal at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Encryption failed. Safe to retry with fresh randomness.
    #[error("Encryption failed")]
    Encryption,

    /// Decryption failed: malformed envelope, truncated payload, or
    /// authentication tag mismatch. The credential is unusable.
    #[error("Decryption failed")]
    Decryption,

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Whether retrying the same call can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Encryption)
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opaque_messages() {
        assert_eq!(Error::Encryption.to_string(), "Encryption failed");
        assert_eq!(Error::Decryption.to_string(), "Decryption failed");
    }

    #[test]
    fn test_retryable() {
        assert!(Error::Encryption.is_retryable());
        assert!(!Error::Decryption.is_retryable());
        assert!(!Error::Configuration("x".to_string()).is_retryable());
    }
}
