//! Error types for the trustkeys library.
//!
//! This module defines all error types used throughout the library.
//! All errors implement `std::error::Error` and are designed to provide
//! clear, actionable error messages.

use thiserror::Error;

/// The main error type for trustkeys operations.
///
/// This enum covers all possible errors that can occur while resolving
/// passwords, encoding or decoding key material, and reading or writing
/// key files.
#[derive(Error, Debug)]
pub enum TrustKeysError {
    /// An ambiguous or contradictory caller request, e.g. passing a
    /// password together with `prompt=true`.
    #[error("policy error: {0}")]
    Policy(String),

    /// Malformed input: bad scheme, unrecognized key type, a key type
    /// that does not match the importer, mismatched list lengths, or an
    /// explicit empty password where `None` was required.
    #[error("format error: {0}")]
    Format(String),

    /// Encryption or decryption failed. Wrong password and corrupted
    /// ciphertext are deliberately reported as the same kind.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// Storage I/O error
    #[error("storage I/O error: {0}")]
    Storage(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for trustkeys operations.
pub type Result<T> = std::result::Result<T, TrustKeysError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TrustKeysError::Crypto("test error".to_string());
        assert_eq!(err.to_string(), "crypto error: test error");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TrustKeysError>();
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: TrustKeysError = io_err.into();
        match err {
            TrustKeysError::Storage(_) => {}
            _ => panic!("Expected Storage"),
        }
    }
}
