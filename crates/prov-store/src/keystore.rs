//! # Key Store
//!
//! The persistent local mapping from ledger transaction ID to
//! `(storage pointer, original filename)`. Every ID present here must
//! correspond to an asset that was successfully pushed to the ledger —
//! the orchestrator guarantees this by saving only after a successful
//! ledger write.
//!
//! ## On-Disk Format
//!
//! A versioned JSON document:
//!
//! ```json
//! {
//!   "version": 1,
//!   "entries": { "<tid>": { "pointer": "...", "filename": "..." } },
//!   "integrity": "<sha256 hex over the canonical entries map>"
//! }
//! ```
//!
//! The integrity digest is recomputed on every load; a mismatch is a
//! `Corrupt` error, never a silently empty store. Saves write a temp file
//! in the same directory and rename over the target, so a crashed save
//! leaves the previous document intact.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use prov_core::{sha256_digest, CanonicalBytes, StoragePointer, TransactionId};
use serde::{Deserialize, Serialize};

use crate::error::KeyStoreError;

/// Current on-disk document version.
const STORE_VERSION: u32 = 1;

/// One key store entry: where a transaction's bytes live and what the
/// file was called when it was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEntry {
    /// Opaque content store pointer.
    pub pointer: StoragePointer,
    /// The original filename at ingest/commit time.
    pub filename: String,
}

/// The serialized store document.
#[derive(Serialize, Deserialize)]
struct StoreDocument {
    version: u32,
    entries: BTreeMap<TransactionId, KeyEntry>,
    integrity: String,
}

/// The persistent transaction-ID → storage-location index.
///
/// Loaded once at process start; grows monotonically (entries are added,
/// never removed); explicitly saved after each logical unit of work.
#[derive(Debug)]
pub struct KeyStore {
    path: PathBuf,
    entries: BTreeMap<TransactionId, KeyEntry>,
}

impl KeyStore {
    /// Create a fresh, empty store at `path` and persist it immediately.
    ///
    /// Refuses to clobber an existing store file.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, KeyStoreError> {
        let path = path.into();
        if path.exists() {
            return Err(KeyStoreError::AlreadyExists {
                path: path.display().to_string(),
            });
        }
        let store = Self {
            path,
            entries: BTreeMap::new(),
        };
        store.save()?;
        Ok(store)
    }

    /// Load an existing store from `path`.
    ///
    /// # Errors
    ///
    /// - [`KeyStoreError::Missing`] if no file exists at `path` — callers
    ///   must not confuse "never initialized" with "empty".
    /// - [`KeyStoreError::Corrupt`] if the document is unparsable, has an
    ///   unknown version, or fails the integrity check.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, KeyStoreError> {
        let path = path.into();
        if !path.exists() {
            return Err(KeyStoreError::Missing {
                path: path.display().to_string(),
            });
        }

        let content = fs::read_to_string(&path)?;
        let doc: StoreDocument =
            serde_json::from_str(&content).map_err(|e| KeyStoreError::Corrupt {
                path: path.display().to_string(),
                reason: format!("unparsable document: {e}"),
            })?;

        if doc.version != STORE_VERSION {
            return Err(KeyStoreError::Corrupt {
                path: path.display().to_string(),
                reason: format!(
                    "unsupported store version {} (expected {STORE_VERSION})",
                    doc.version
                ),
            });
        }

        let expected = integrity_digest(&doc.entries).map_err(|reason| {
            KeyStoreError::Corrupt {
                path: path.display().to_string(),
                reason,
            }
        })?;
        if expected != doc.integrity {
            return Err(KeyStoreError::Corrupt {
                path: path.display().to_string(),
                reason: format!(
                    "integrity digest mismatch: document says {}, entries hash to {expected}",
                    doc.integrity
                ),
            });
        }

        Ok(Self {
            path,
            entries: doc.entries,
        })
    }

    /// Insert or overwrite the entry for `tid`. Last write wins — `tid`
    /// is ledger-assigned and unique by construction, so overwrites only
    /// occur when replaying the same transaction.
    ///
    /// The change is in-memory until [`KeyStore::save()`] is called.
    pub fn add(&mut self, tid: TransactionId, pointer: StoragePointer, filename: impl Into<String>) {
        self.entries.insert(
            tid,
            KeyEntry {
                pointer,
                filename: filename.into(),
            },
        );
    }

    /// Look up the storage location for a transaction.
    ///
    /// A miss is a recoverable, typed error — callers decide what it
    /// means for their workflow.
    pub fn lookup(&self, tid: &TransactionId) -> Result<&KeyEntry, KeyStoreError> {
        self.entries.get(tid).ok_or_else(|| KeyStoreError::NotFound {
            tid: tid.to_string(),
        })
    }

    /// Persist the store atomically: serialize with a fresh integrity
    /// digest, write `<path>.tmp`, rename over `<path>`.
    pub fn save(&self) -> Result<(), KeyStoreError> {
        let integrity = integrity_digest(&self.entries).map_err(|reason| {
            KeyStoreError::Corrupt {
                path: self.path.display().to_string(),
                reason,
            }
        })?;
        let doc = StoreDocument {
            version: STORE_VERSION,
            entries: self.entries.clone(),
            integrity,
        };
        let json = serde_json::to_string_pretty(&doc).map_err(|e| KeyStoreError::Corrupt {
            path: self.path.display().to_string(),
            reason: format!("serialization failed: {e}"),
        })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), entries = self.entries.len(),
            "key store saved");
        Ok(())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// SHA-256 hex over the canonical entries map.
fn integrity_digest(entries: &BTreeMap<TransactionId, KeyEntry>) -> Result<String, String> {
    let canonical =
        CanonicalBytes::new(entries).map_err(|e| format!("entries not canonicalizable: {e}"))?;
    Ok(sha256_digest(&canonical).to_hex())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tid(n: u8) -> TransactionId {
        TransactionId::parse(&format!("{n:02x}").repeat(32)).unwrap()
    }

    fn pointer(s: &str) -> StoragePointer {
        StoragePointer::new(s).unwrap()
    }

    #[test]
    fn create_then_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keystore.json");
        let store = KeyStore::create(&path).unwrap();
        assert!(store.is_empty());

        let loaded = KeyStore::load(&path).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn create_refuses_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keystore.json");
        KeyStore::create(&path).unwrap();
        assert!(matches!(
            KeyStore::create(&path),
            Err(KeyStoreError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn add_save_load_lookup_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keystore.json");
        let mut store = KeyStore::create(&path).unwrap();
        store.add(tid(1), pointer("blocks/report.txt.blk"), "report.txt");
        store.save().unwrap();

        let loaded = KeyStore::load(&path).unwrap();
        let entry = loaded.lookup(&tid(1)).unwrap();
        assert_eq!(entry.pointer, pointer("blocks/report.txt.blk"));
        assert_eq!(entry.filename, "report.txt");
    }

    #[test]
    fn lookup_miss_is_typed_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::create(dir.path().join("ks.json")).unwrap();
        let result = store.lookup(&tid(9));
        assert!(matches!(result, Err(KeyStoreError::NotFound { .. })));
    }

    #[test]
    fn load_missing_file_is_distinct_from_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let result = KeyStore::load(dir.path().join("nope.json"));
        assert!(matches!(result, Err(KeyStoreError::Missing { .. })));
    }

    #[test]
    fn load_unparsable_document_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ks.json");
        fs::write(&path, "not json at all").unwrap();
        let result = KeyStore::load(&path);
        assert!(matches!(result, Err(KeyStoreError::Corrupt { .. })));
    }

    #[test]
    fn load_detects_edited_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ks.json");
        let mut store = KeyStore::create(&path).unwrap();
        store.add(tid(2), pointer("blocks/a.blk"), "a.txt");
        store.save().unwrap();

        // Edit an entry without refreshing the integrity digest.
        let content = fs::read_to_string(&path).unwrap();
        let edited = content.replace("a.txt", "b.txt");
        assert_ne!(content, edited);
        fs::write(&path, edited).unwrap();

        let result = KeyStore::load(&path);
        match result {
            Err(KeyStoreError::Corrupt { reason, .. }) => {
                assert!(reason.contains("integrity digest mismatch"), "{reason}");
            }
            other => panic!("expected Corrupt, got {other:?}"),
        }
    }

    #[test]
    fn load_rejects_unknown_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ks.json");
        let mut store = KeyStore::create(&path).unwrap();
        store.add(tid(3), pointer("p"), "f");
        store.save().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let edited = content.replace("\"version\": 1", "\"version\": 7");
        fs::write(&path, edited).unwrap();
        assert!(matches!(
            KeyStore::load(&path),
            Err(KeyStoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ks.json");
        let mut store = KeyStore::create(&path).unwrap();
        store.add(tid(4), pointer("p"), "f");
        store.save().unwrap();
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn same_tid_overwrites_last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = KeyStore::create(dir.path().join("ks.json")).unwrap();
        store.add(tid(5), pointer("old"), "f.txt");
        store.add(tid(5), pointer("new"), "f.txt");
        assert_eq!(store.len(), 1);
        assert_eq!(store.lookup(&tid(5)).unwrap().pointer, pointer("new"));
    }

    #[test]
    fn unsaved_changes_are_not_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ks.json");
        let mut store = KeyStore::create(&path).unwrap();
        store.add(tid(6), pointer("p"), "f");
        // No save() — reload sees the empty document.
        let loaded = KeyStore::load(&path).unwrap();
        assert!(loaded.is_empty());
    }
}
