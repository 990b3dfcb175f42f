//! # Storage Error Types
//!
//! Structured errors for the key store and content store. The split
//! matters to callers: `KeyStoreError::NotFound` is a recoverable lookup
//! miss, while `Missing` and `Corrupt` indicate the backing file itself
//! is unusable.

use thiserror::Error;

/// Errors from key store operations.
#[derive(Error, Debug)]
pub enum KeyStoreError {
    /// No entry exists for the given transaction ID. Recoverable — the
    /// caller decides what a miss means for its workflow.
    #[error("transaction {tid} not present in key store")]
    NotFound {
        /// The transaction ID that missed.
        tid: String,
    },

    /// The backing file does not exist. Run the initialization command
    /// first; a missing store is not silently treated as an empty one.
    #[error("key store file missing at {path}")]
    Missing {
        /// The expected file path.
        path: String,
    },

    /// Initialization was asked to create a store where one already
    /// exists.
    #[error("a key store already exists at {path}")]
    AlreadyExists {
        /// The occupied file path.
        path: String,
    },

    /// The backing file exists but cannot be trusted: unparsable JSON,
    /// unknown version, or integrity digest mismatch.
    #[error("key store at {path} is corrupt: {reason}")]
    Corrupt {
        /// The offending file path.
        path: String,
        /// What failed during verification.
        reason: String,
    },

    /// I/O failure while reading or writing the backing file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from content store operations.
#[derive(Error, Debug)]
pub enum ContentStoreError {
    /// The store has no record for the given logical name.
    #[error("no content store record for {logical_name}")]
    InfoNotFound {
        /// The logical (file) name that missed.
        logical_name: String,
    },

    /// A logical name or pointer failed validation.
    #[error("invalid name {name:?}: {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The store's configured block capacity would be exceeded.
    #[error("store capacity of {capacity} blocks exceeded")]
    CapacityExceeded {
        /// The configured capacity.
        capacity: u64,
    },

    /// The store's index document is unreadable or unwritable.
    #[error("store index error: {0}")]
    Index(String),

    /// The operation did not complete within the configured deadline.
    /// Retryable.
    #[error("content store operation timed out after {elapsed_ms}ms")]
    Timeout {
        /// Elapsed time before the deadline fired.
        elapsed_ms: u64,
    },

    /// Transport or filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
