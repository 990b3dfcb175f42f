//! # Error Types — Shared Error Hierarchy
//!
//! Defines the error types for the foundational crate. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations,
//! and carry enough context to produce an actionable message without
//! consulting logs.

use thiserror::Error;

/// Top-level error type for foundational operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonical(#[from] CanonicalError),

    /// A timestamp string was rejected.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// An identifier string was rejected by a validated constructor.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// IO error (file hashing).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalError {
    /// Float values are not permitted in canonical representations.
    /// Hashes, pointers, and counts are strings or integers.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
