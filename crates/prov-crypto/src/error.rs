//! # Cryptographic Error Types
//!
//! Structured errors for all cryptographic operations in `prov-crypto`.

use thiserror::Error;

/// Errors from cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Ed25519 signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Key generation, parsing, or decoding failed.
    #[error("key error: {0}")]
    KeyError(String),

    /// A key file was missing, unreadable, or malformed.
    #[error("key file error at {path}: {reason}")]
    KeyFile {
        /// The offending file path.
        path: String,
        /// What went wrong.
        reason: String,
    },

    /// I/O error while reading or writing key files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
