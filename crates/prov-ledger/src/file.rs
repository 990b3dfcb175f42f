//! # File-Backed Ledger
//!
//! A durable `LedgerClient` for local, single-node use: the full
//! transaction map persisted as one JSON document, rewritten atomically
//! on every accepted submission. Gives the CLI a backend that survives
//! across invocations without standing up a real blockchain; a network
//! backend implements the same contract remotely.
//!
//! Storage failures surface as `LedgerError::Transport` — from the
//! caller's perspective the backing file plays the role of the wire.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use prov_core::TransactionId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::asset::AssetEnvelope;
use crate::client::{LedgerClient, LedgerError};

/// Current on-disk document version.
const LEDGER_VERSION: u32 = 1;

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerDocument {
    version: u32,
    transactions: BTreeMap<TransactionId, AssetEnvelope>,
    tokens: BTreeMap<Uuid, TransactionId>,
}

/// An append-only ledger persisted to a single JSON file.
///
/// Same acceptance rules as the in-memory ledger: content-derived IDs,
/// signature verification on submit, idempotency-token deduplication.
#[derive(Debug)]
pub struct FileLedger {
    path: PathBuf,
    state: Mutex<LedgerDocument>,
}

impl FileLedger {
    /// Open a ledger file, creating an empty ledger if none exists yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        let state = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| LedgerError::Transport(format!("cannot read ledger file: {e}")))?;
            let doc: LedgerDocument = serde_json::from_str(&content).map_err(|e| {
                LedgerError::Transport(format!(
                    "ledger file at {} is unparsable: {e}",
                    path.display()
                ))
            })?;
            if doc.version != LEDGER_VERSION {
                return Err(LedgerError::Transport(format!(
                    "unsupported ledger version {} at {}",
                    doc.version,
                    path.display()
                )));
            }
            doc
        } else {
            LedgerDocument {
                version: LEDGER_VERSION,
                ..Default::default()
            }
        };
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of transactions accepted so far.
    pub fn len(&self) -> usize {
        self.state.lock().transactions.len()
    }

    /// Whether the ledger holds no transactions.
    pub fn is_empty(&self) -> bool {
        self.state.lock().transactions.is_empty()
    }

    fn persist(&self, doc: &LedgerDocument) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(doc)
            .map_err(|e| LedgerError::Transport(format!("ledger serialization failed: {e}")))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| LedgerError::Transport(format!("cannot create ledger dir: {e}")))?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)
            .map_err(|e| LedgerError::Transport(format!("cannot write ledger file: {e}")))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| LedgerError::Transport(format!("cannot replace ledger file: {e}")))?;
        Ok(())
    }
}

impl LedgerClient for FileLedger {
    fn submit(&self, envelope: &AssetEnvelope) -> Result<TransactionId, LedgerError> {
        envelope
            .verify_signature()
            .map_err(|e| LedgerError::Rejected {
                reason: format!("envelope signature rejected: {e}"),
            })?;
        let tid = envelope.content_id().map_err(|e| LedgerError::Rejected {
            reason: format!("envelope not canonicalizable: {e}"),
        })?;

        let mut state = self.state.lock();
        if let Some(existing) = state.tokens.get(&envelope.submission_token) {
            return Ok(existing.clone());
        }

        state.transactions.insert(tid.clone(), envelope.clone());
        state.tokens.insert(envelope.submission_token, tid.clone());
        self.persist(&state)?;
        tracing::debug!(tid = %tid, path = %self.path.display(), "transaction persisted");
        Ok(tid)
    }

    fn get(&self, tid: &TransactionId) -> Result<AssetEnvelope, LedgerError> {
        self.state
            .lock()
            .transactions
            .get(tid)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound {
                tid: tid.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{Asset, Operation};
    use prov_core::ContentDigest;
    use prov_crypto::Keypair;
    use std::collections::BTreeSet;

    fn push_one(ledger: &FileLedger, kp: &Keypair, marker: u8) -> TransactionId {
        let mut asset = Asset::new(
            kp.public_key(),
            ContentDigest::from_bytes([marker; 32]),
            Operation::Put,
            None,
            BTreeSet::from(["ingest".to_string()]),
        );
        asset.push(kp, ledger).unwrap()
    }

    #[test]
    fn submissions_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let kp = Keypair::generate();

        let tid = {
            let ledger = FileLedger::open(&path).unwrap();
            push_one(&ledger, &kp, 1)
        };

        let reopened = FileLedger::open(&path).unwrap();
        let envelope = reopened.get(&tid).unwrap();
        assert_eq!(envelope.content_id().unwrap(), tid);
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn token_dedup_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let kp = Keypair::generate();

        let (tid, envelope) = {
            let ledger = FileLedger::open(&path).unwrap();
            let tid = push_one(&ledger, &kp, 2);
            (tid.clone(), ledger.get(&tid).unwrap())
        };

        let reopened = FileLedger::open(&path).unwrap();
        let replayed = reopened.submit(&envelope).unwrap();
        assert_eq!(replayed, tid);
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn open_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = FileLedger::open(dir.path().join("fresh.json")).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn open_unparsable_file_is_transport_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.json");
        fs::write(&path, "not json").unwrap();
        let result = FileLedger::open(&path);
        assert!(matches!(result, Err(LedgerError::Transport(_))));
    }

    #[test]
    fn get_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = FileLedger::open(dir.path().join("l.json")).unwrap();
        let tid = TransactionId::parse(&"c".repeat(64)).unwrap();
        assert!(matches!(
            ledger.get(&tid),
            Err(LedgerError::NotFound { .. })
        ));
    }
}
