//! # In-Memory Ledger
//!
//! The reference `LedgerClient` implementation: an append-only map from
//! content-derived transaction IDs to envelopes, with idempotency-token
//! deduplication. Used by the test suites and local development; a real
//! blockchain backend implements the same contract over the network.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use prov_core::TransactionId;
use uuid::Uuid;

use crate::asset::AssetEnvelope;
use crate::client::{LedgerClient, LedgerError};

/// An append-only in-memory ledger.
///
/// - Transaction IDs are `SHA256(JCS(envelope))` — content-derived, never
///   client-chosen.
/// - Submissions are verified before acceptance: an envelope whose
///   signature does not check out is definitively rejected.
/// - A `submission_token` seen before short-circuits to the originally
///   assigned ID, so retried submissions cannot create duplicate entries.
#[derive(Default)]
pub struct InMemoryLedger {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    transactions: BTreeMap<TransactionId, AssetEnvelope>,
    tokens: BTreeMap<Uuid, TransactionId>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of transactions accepted so far.
    pub fn len(&self) -> usize {
        self.inner.lock().transactions.len()
    }

    /// Whether the ledger holds no transactions.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().transactions.is_empty()
    }

    /// Whether a transaction ID exists on the ledger.
    pub fn contains(&self, tid: &TransactionId) -> bool {
        self.inner.lock().transactions.contains_key(tid)
    }
}

impl LedgerClient for InMemoryLedger {
    fn submit(&self, envelope: &AssetEnvelope) -> Result<TransactionId, LedgerError> {
        envelope
            .verify_signature()
            .map_err(|e| LedgerError::Rejected {
                reason: format!("envelope signature rejected: {e}"),
            })?;

        let tid = envelope.content_id().map_err(|e| LedgerError::Rejected {
            reason: format!("envelope not canonicalizable: {e}"),
        })?;

        let mut inner = self.inner.lock();
        if let Some(existing) = inner.tokens.get(&envelope.submission_token) {
            // Idempotent replay of a token we have already accepted.
            tracing::debug!(tid = %existing, token = %envelope.submission_token,
                "duplicate submission token, returning original transaction");
            return Ok(existing.clone());
        }

        inner.transactions.insert(tid.clone(), envelope.clone());
        inner.tokens.insert(envelope.submission_token, tid.clone());
        Ok(tid)
    }

    fn get(&self, tid: &TransactionId) -> Result<AssetEnvelope, LedgerError> {
        self.inner
            .lock()
            .transactions
            .get(tid)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound {
                tid: tid.to_string(),
            })
    }
}
