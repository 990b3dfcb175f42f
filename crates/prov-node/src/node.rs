//! # The Orchestrator
//!
//! `Node` coordinates the three provenance workflows. Each is a
//! sequential, single-pass pipeline:
//!
//! - **ingest** — first version of a file enters the system; PUT asset
//!   with no parent.
//! - **retrieve** — a recorded version is pulled into the workspace and
//!   the read is itself recorded; GET asset chained to the prior record.
//! - **commit** — an updated version replaces the file's current block;
//!   PUT asset chained to the prior record.
//!
//! ## Failure Semantics
//!
//! Local and content-store failures abort before any ledger write, so a
//! failed workflow never leaves partial ledger state. After a successful
//! ledger write, a key store save failure is reported as
//! [`NodeError::ReconciliationRequired`] with everything needed to
//! re-add the mapping — the transaction exists on the ledger and must
//! not be silently forgotten, but the process is never exited from here.
//!
//! A hash mismatch between retrieved bytes and the lineage record is a
//! hard [`NodeError::TamperDetected`] error, raised before a GET asset
//! is pushed: a read event must not be recorded against bytes that
//! contradict the lineage. The pulled file is left in the workspace for
//! inspection.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, MutexGuard};
use prov_core::{hash_file, ContentDigest, StoragePointer, TransactionId};
use prov_crypto::Keypair;
use prov_ledger::{Asset, AssetError, LedgerClient, Operation};
use prov_store::{ContentStore, ContentStoreError, KeyStore, KeyStoreError};
use thiserror::Error;

/// Errors from the orchestrated workflows.
#[derive(Error, Debug)]
pub enum NodeError {
    /// The given local path does not exist or has no usable filename.
    /// User-correctable.
    #[error("invalid local path: {path}")]
    InvalidPath {
        /// The rejected path.
        path: PathBuf,
    },

    /// The content store rejected the ingest push. No ledger write was
    /// attempted.
    #[error("ingest failed: {source}")]
    Ingest {
        /// The underlying content store failure.
        #[source]
        source: ContentStoreError,
    },

    /// The content store could not deliver the requested bytes. The key
    /// store was not modified.
    #[error("retrieve failed: {source}")]
    Retrieve {
        /// The underlying content store failure.
        #[source]
        source: ContentStoreError,
    },

    /// The content store rejected the commit push. No ledger write was
    /// attempted.
    #[error("commit failed: {source}")]
    Commit {
        /// The underlying content store failure.
        #[source]
        source: ContentStoreError,
    },

    /// The content store accepted a push but then had no metadata for
    /// the name it was pushed under — an internal consistency fault in
    /// the store, not a user error.
    #[error("content store has no record for {filename} immediately after push")]
    StoreInconsistent {
        /// The logical name that went missing.
        filename: String,
        /// The underlying metadata failure.
        #[source]
        source: ContentStoreError,
    },

    /// Retrieved bytes do not hash to the value recorded in the lineage.
    /// Either the block was modified outside the provenance system, or
    /// the block was overwritten by a later commit that shares the
    /// filename. The pulled file is left at `path` for inspection.
    #[error("integrity violation for {path}: lineage records {expected}, local bytes hash to {actual}")]
    TamperDetected {
        /// The hash recorded in the prior asset.
        expected: ContentDigest,
        /// The hash of the bytes actually pulled.
        actual: ContentDigest,
        /// Where the pulled bytes were written.
        path: PathBuf,
    },

    /// The ledger write succeeded but the key store save failed. The
    /// transaction exists; re-add the mapping below and save to recover.
    #[error("transaction {tid} is on the ledger but the key store save failed: {source}")]
    ReconciliationRequired {
        /// The ledger-assigned transaction ID.
        tid: TransactionId,
        /// The storage pointer that should be recorded for it.
        pointer: StoragePointer,
        /// The filename that should be recorded for it.
        filename: String,
        /// The save failure.
        #[source]
        source: KeyStoreError,
    },

    /// A key store operation failed (including recoverable lookup misses).
    #[error(transparent)]
    KeyStore(#[from] KeyStoreError),

    /// An asset operation failed (signing, submission, reconstruction).
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// Hashing a local file failed.
    #[error("hashing failed: {0}")]
    Hash(#[from] prov_core::CoreError),
}

/// The workflow orchestrator.
///
/// Owns the key store (behind a single-writer lock) and the content
/// store handle for the duration of its commands; assets are value
/// objects passed to and from the ledger client.
#[derive(Debug)]
pub struct Node<C: ContentStore, L: LedgerClient> {
    keystore: Mutex<KeyStore>,
    content: C,
    ledger: L,
    workspace: PathBuf,
}

impl<C: ContentStore, L: LedgerClient> Node<C, L> {
    /// Assemble a node from its collaborators. The key store must
    /// already be created or loaded; see [`KeyStore`].
    pub fn new(keystore: KeyStore, content: C, ledger: L, workspace: impl Into<PathBuf>) -> Self {
        Self {
            keystore: Mutex::new(keystore),
            content,
            ledger,
            workspace: workspace.into(),
        }
    }

    /// The directory retrieved files are pulled into.
    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// Lock and access the key store. Held briefly by the workflows;
    /// exposed for inspection and recovery tooling.
    pub fn keystore(&self) -> MutexGuard<'_, KeyStore> {
        self.keystore.lock()
    }

    /// The ledger client.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Ingest a new file: push bytes to the content store, record a PUT
    /// asset with no parent, and map the new transaction ID to the
    /// block's location.
    pub fn ingest(&self, file_path: &Path, keypair: &Keypair) -> Result<Asset, NodeError> {
        let filename = existing_filename(file_path)?;

        self.content
            .push(file_path, &filename)
            .map_err(|source| NodeError::Ingest { source })?;

        let file_hash = hash_file(file_path)?;
        tracing::debug!(file = %file_path.display(), hash = %file_hash, "ingest hashed file");

        let info = self
            .content
            .metadata(&filename)
            .map_err(|source| NodeError::Ingest { source })?;

        let mut asset = Asset::new(
            keypair.public_key(),
            file_hash,
            Operation::Put,
            None,
            tag_set("ingest"),
        );
        let tid = asset.push(keypair, &self.ledger)?;

        self.record_mapping(tid.clone(), info.pointer, filename.clone())?;
        tracing::info!(tid = %tid, filename = %filename, "file ingested");
        Ok(asset)
    }

    /// Retrieve a recorded file version into the workspace and record
    /// the read as a GET asset chained to the prior record.
    pub fn retrieve(&self, tid: &TransactionId, keypair: &Keypair) -> Result<Asset, NodeError> {
        let prior = Asset::from_id(tid, &self.ledger)?;

        let entry = self.keystore.lock().lookup(tid)?.clone();

        let destination = self.workspace.join(&entry.filename);
        self.content
            .pull(&entry.pointer, &destination)
            .map_err(|source| NodeError::Retrieve { source })?;
        tracing::info!(filename = %entry.filename, dest = %destination.display(),
            "copied file from content store into workspace");

        let local_hash = hash_file(&destination)?;
        if &local_hash != prior.file_hash() {
            tracing::warn!(
                expected = %prior.file_hash(),
                actual = %local_hash,
                path = %destination.display(),
                "retrieved bytes contradict the lineage record"
            );
            return Err(NodeError::TamperDetected {
                expected: *prior.file_hash(),
                actual: local_hash,
                path: destination,
            });
        }

        let mut asset = Asset::new(
            keypair.public_key(),
            local_hash,
            Operation::Get,
            prior.id().cloned(),
            tag_set("retrieve"),
        );
        let new_tid = asset.push(keypair, &self.ledger)?;
        tracing::info!(tid = %new_tid, parent = %tid, "retrieval recorded");
        Ok(asset)
    }

    /// Commit an updated version of an already-recorded file: overwrite
    /// its block under the existing filename, record a PUT asset chained
    /// to the prior record, and map the new transaction ID.
    pub fn commit(
        &self,
        file_path: &Path,
        prev_tid: &TransactionId,
        keypair: &Keypair,
    ) -> Result<Asset, NodeError> {
        if !file_path.exists() {
            return Err(NodeError::InvalidPath {
                path: file_path.to_path_buf(),
            });
        }

        let prior = Asset::from_id(prev_tid, &self.ledger)?;
        let entry = self.keystore.lock().lookup(prev_tid)?.clone();

        self.content
            .push(file_path, &entry.filename)
            .map_err(|source| NodeError::Commit { source })?;

        let info = self
            .content
            .metadata(&entry.filename)
            .map_err(|source| match source {
                ContentStoreError::InfoNotFound { .. } => NodeError::StoreInconsistent {
                    filename: entry.filename.clone(),
                    source,
                },
                other => NodeError::Commit { source: other },
            })?;

        let new_hash = hash_file(file_path)?;
        tracing::debug!(file = %file_path.display(), hash = %new_hash, "commit hashed file");

        let mut asset = Asset::new(
            keypair.public_key(),
            new_hash,
            Operation::Put,
            prior.id().cloned(),
            tag_set("commit"),
        );
        let tid = asset.push(keypair, &self.ledger)?;

        self.record_mapping(tid.clone(), info.pointer, entry.filename.clone())?;
        tracing::info!(tid = %tid, parent = %prev_tid, filename = %entry.filename,
            "commit recorded");
        Ok(asset)
    }

    /// Record a transaction's storage location and persist, mapping a
    /// save failure to the recoverable reconciliation error.
    fn record_mapping(
        &self,
        tid: TransactionId,
        pointer: StoragePointer,
        filename: String,
    ) -> Result<(), NodeError> {
        let mut keystore = self.keystore.lock();
        keystore.add(tid.clone(), pointer.clone(), filename.clone());
        keystore.save().map_err(|source| NodeError::ReconciliationRequired {
            tid,
            pointer,
            filename,
            source,
        })
    }
}

/// Validate the path exists and extract its filename.
fn existing_filename(file_path: &Path) -> Result<String, NodeError> {
    if !file_path.exists() {
        return Err(NodeError::InvalidPath {
            path: file_path.to_path_buf(),
        });
    }
    file_path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
        .ok_or_else(|| NodeError::InvalidPath {
            path: file_path.to_path_buf(),
        })
}

fn tag_set(label: &str) -> BTreeSet<String> {
    BTreeSet::from([label.to_string()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use prov_ledger::InMemoryLedger;
    use prov_store::BlockStore;
    use std::fs;

    struct Fixture {
        _dir: tempfile::TempDir,
        root: PathBuf,
        node: Node<BlockStore, InMemoryLedger>,
        keypair: Keypair,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();

        let store = BlockStore::new(root.join("store"));
        store.initialize(1000).unwrap();
        let keystore = KeyStore::create(root.join("keystore.json")).unwrap();
        let node = Node::new(keystore, store, InMemoryLedger::new(), root.join("workspace"));

        Fixture {
            _dir: dir,
            root,
            node,
            keypair: Keypair::generate(),
        }
    }

    fn write_source(root: &Path, name: &str, content: &[u8]) -> PathBuf {
        let path = root.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn ingest_records_put_asset_and_mapping() {
        let fx = fixture();
        let src = write_source(&fx.root, "report.txt", b"v1");

        let asset = fx.node.ingest(&src, &fx.keypair).unwrap();
        assert_eq!(asset.operation(), Operation::Put);
        assert_eq!(asset.parent(), None);
        assert!(asset.tags().contains("ingest"));
        let tid = asset.id().unwrap().clone();

        let keystore = fx.node.keystore();
        let entry = keystore.lookup(&tid).unwrap();
        assert_eq!(entry.filename, "report.txt");
    }

    #[test]
    fn ingest_missing_path_is_invalid() {
        let fx = fixture();
        let result = fx.node.ingest(&fx.root.join("absent.txt"), &fx.keypair);
        assert!(matches!(result, Err(NodeError::InvalidPath { .. })));
        // Nothing reached the ledger.
        assert!(fx.node.ledger().is_empty());
    }

    #[test]
    fn ingest_failure_leaves_no_ledger_state() {
        let fx = fixture();
        // Break the content store by removing its index.
        fs::remove_file(fx.root.join("store").join("index.json")).unwrap();
        let src = write_source(&fx.root, "report.txt", b"v1");

        let result = fx.node.ingest(&src, &fx.keypair);
        assert!(matches!(result, Err(NodeError::Ingest { .. })));
        assert!(fx.node.ledger().is_empty());
    }

    #[test]
    fn retrieve_roundtrips_bytes_and_records_get() {
        let fx = fixture();
        let src = write_source(&fx.root, "report.txt", b"round trip me");
        let ingested = fx.node.ingest(&src, &fx.keypair).unwrap();
        let tid = ingested.id().unwrap().clone();

        let retrieved = fx.node.retrieve(&tid, &fx.keypair).unwrap();
        assert_eq!(retrieved.operation(), Operation::Get);
        assert_eq!(retrieved.parent(), Some(&tid));
        assert!(retrieved.tags().contains("retrieve"));

        let pulled = fs::read(fx.node.workspace().join("report.txt")).unwrap();
        assert_eq!(pulled, b"round trip me");
    }

    #[test]
    fn retrieve_unknown_tid_is_ledger_not_found() {
        let fx = fixture();
        let tid = TransactionId::parse(&"a".repeat(64)).unwrap();
        let result = fx.node.retrieve(&tid, &fx.keypair);
        assert!(matches!(
            result,
            Err(NodeError::Asset(AssetError::Ledger(
                prov_ledger::LedgerError::NotFound { .. }
            )))
        ));
    }

    #[test]
    fn retrieve_keystore_miss_is_recoverable() {
        let fx = fixture();
        let src = write_source(&fx.root, "report.txt", b"v1");
        let asset = fx.node.ingest(&src, &fx.keypair).unwrap();
        let tid = asset.id().unwrap().clone();

        // Wipe the keystore entry to simulate a mapping lost out of band.
        let ks_path = fx.root.join("keystore.json");
        fs::remove_file(&ks_path).unwrap();
        *fx.node.keystore() = KeyStore::create(&ks_path).unwrap();

        let result = fx.node.retrieve(&tid, &fx.keypair);
        assert!(matches!(
            result,
            Err(NodeError::KeyStore(KeyStoreError::NotFound { .. }))
        ));
    }

    #[test]
    fn retrieve_detects_out_of_band_modification() {
        let fx = fixture();
        let src = write_source(&fx.root, "report.txt", b"v1");
        let asset = fx.node.ingest(&src, &fx.keypair).unwrap();
        let tid = asset.id().unwrap().clone();
        let ledger_len_before = fx.node.ledger().len();

        // Corrupt the stored block directly.
        let block = fx.root.join("store").join("blocks").join("report.txt.blk");
        fs::write(&block, b"tampered").unwrap();

        let result = fx.node.retrieve(&tid, &fx.keypair);
        match result {
            Err(NodeError::TamperDetected { expected, actual, path }) => {
                assert_eq!(&expected, asset.file_hash());
                assert_ne!(expected, actual);
                // The pulled bytes stay in the workspace for inspection.
                assert_eq!(fs::read(&path).unwrap(), b"tampered");
            }
            other => panic!("expected TamperDetected, got {other:?}"),
        }
        // No GET asset was recorded against the tampered bytes.
        assert_eq!(fx.node.ledger().len(), ledger_len_before);
    }

    #[test]
    fn commit_chains_to_prior_and_remaps() {
        let fx = fixture();
        let src = write_source(&fx.root, "report.txt", b"v1");
        let first = fx.node.ingest(&src, &fx.keypair).unwrap();
        let first_tid = first.id().unwrap().clone();

        let updated = write_source(&fx.root, "updated.txt", b"v2");
        let second = fx.node.commit(&updated, &first_tid, &fx.keypair).unwrap();
        assert_eq!(second.operation(), Operation::Put);
        assert_eq!(second.parent(), Some(&first_tid));
        assert!(second.tags().contains("commit"));

        // The new tid maps to the original filename.
        let second_tid = second.id().unwrap().clone();
        let keystore = fx.node.keystore();
        assert_eq!(keystore.lookup(&second_tid).unwrap().filename, "report.txt");
    }

    #[test]
    fn commit_missing_path_is_invalid() {
        let fx = fixture();
        let src = write_source(&fx.root, "report.txt", b"v1");
        let asset = fx.node.ingest(&src, &fx.keypair).unwrap();
        let result = fx.node.commit(
            &fx.root.join("absent.txt"),
            asset.id().unwrap(),
            &fx.keypair,
        );
        assert!(matches!(result, Err(NodeError::InvalidPath { .. })));
    }

    #[test]
    fn commit_keystore_miss_is_recoverable() {
        let fx = fixture();
        let src = write_source(&fx.root, "report.txt", b"v1");
        let asset = fx.node.ingest(&src, &fx.keypair).unwrap();
        let tid = asset.id().unwrap().clone();

        let ks_path = fx.root.join("keystore.json");
        fs::remove_file(&ks_path).unwrap();
        *fx.node.keystore() = KeyStore::create(&ks_path).unwrap();

        let updated = write_source(&fx.root, "updated.txt", b"v2");
        let result = fx.node.commit(&updated, &tid, &fx.keypair);
        assert!(matches!(
            result,
            Err(NodeError::KeyStore(KeyStoreError::NotFound { .. }))
        ));
    }
}
