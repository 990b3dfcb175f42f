//! # Ledger Client Contract
//!
//! The narrow interface the stack requires of a blockchain backend:
//! submit a signed envelope, fetch an envelope by transaction ID.
//!
//! ## Error Taxonomy
//!
//! The taxonomy separates failures a caller may retry (`Timeout`,
//! `Transport`) from definitive outcomes (`Rejected`, `NotFound`).
//! Retrying a submission is safe only because every envelope carries a
//! client-generated idempotency token the backend must deduplicate on —
//! see [`LedgerClient::submit()`].

use prov_core::TransactionId;
use thiserror::Error;

use crate::asset::AssetEnvelope;

/// Errors from ledger operations.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// No transaction exists with the given ID.
    #[error("transaction not found: {tid}")]
    NotFound {
        /// The requested transaction ID.
        tid: String,
    },

    /// The ledger definitively rejected the submission. Not retryable.
    #[error("ledger rejected submission: {reason}")]
    Rejected {
        /// The backend's rejection reason.
        reason: String,
    },

    /// The operation did not complete within the configured deadline.
    /// Retryable; the idempotency token makes the retry safe.
    #[error("ledger operation timed out after {elapsed_ms}ms")]
    Timeout {
        /// Elapsed time before the deadline fired.
        elapsed_ms: u64,
    },

    /// Transport-level failure with an ambiguous outcome. Retryable; the
    /// idempotency token makes the retry safe.
    #[error("ledger transport failure: {0}")]
    Transport(String),
}

impl LedgerError {
    /// Whether a caller may retry the operation that produced this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::Timeout { .. } | LedgerError::Transport(_))
    }
}

/// Abstraction over the blockchain backend.
///
/// Implementations must treat a `submission_token` they have already
/// accepted as idempotent: resubmitting the same envelope returns the
/// originally assigned transaction ID instead of creating a duplicate
/// entry. This is what makes retrying after an ambiguous transport
/// failure safe.
pub trait LedgerClient {
    /// Submit a signed envelope, returning the ledger-assigned
    /// transaction ID.
    fn submit(&self, envelope: &AssetEnvelope) -> Result<TransactionId, LedgerError>;

    /// Fetch the envelope stored under a transaction ID.
    fn get(&self, tid: &TransactionId) -> Result<AssetEnvelope, LedgerError>;
}
