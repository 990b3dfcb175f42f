//! # Content Store
//!
//! The byte-storage contract the orchestrator consumes, and `BlockStore`,
//! a filesystem-backed implementation.
//!
//! ## Addressing Model
//!
//! Blocks are keyed by **logical name** (the original filename): pushing
//! under an existing name overwrites that block in place, which is the
//! new-version semantics the orchestrator's commit workflow delegates
//! here. The consequence is that a stale pointer for an overwritten name
//! yields the *current* bytes, not the bytes recorded at the pointer's
//! transaction — the retrieve workflow's hash check is what surfaces
//! that situation to callers.

use std::fs;
use std::path::{Path, PathBuf};

use prov_core::{BlockName, StoragePointer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ContentStoreError;

/// Location metadata for a stored block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    /// Opaque pointer used to pull the block's bytes.
    pub pointer: StoragePointer,
    /// The store's internal block name.
    pub block_name: BlockName,
}

/// The content store contract.
///
/// Implementations own byte durability and new-version semantics; the
/// stack never interprets pointers beyond handing them back to the store.
pub trait ContentStore {
    /// Prepare backing storage with room for `capacity` blocks.
    fn initialize(&self, capacity: u64) -> Result<(), ContentStoreError>;

    /// Copy a local file into the store under `logical_name`,
    /// overwriting any block previously stored under that name.
    fn push(&self, local_path: &Path, logical_name: &str) -> Result<(), ContentStoreError>;

    /// Copy a block's bytes to `destination`.
    fn pull(&self, pointer: &StoragePointer, destination: &Path) -> Result<(), ContentStoreError>;

    /// Location metadata for the block stored under `logical_name`.
    fn metadata(&self, logical_name: &str) -> Result<BlockInfo, ContentStoreError>;
}

// ---------------------------------------------------------------------------
// BlockStore
// ---------------------------------------------------------------------------

/// The index document mapping logical names to block metadata.
#[derive(Default, Serialize, Deserialize)]
struct IndexDocument {
    capacity: u64,
    blocks: BTreeMap<String, BlockInfo>,
}

/// A filesystem-backed content store.
///
/// Layout under the root directory:
///
/// ```text
/// <root>/index.json          — logical name → BlockInfo, plus capacity
/// <root>/blocks/<name>.blk   — one file per logical name
/// ```
#[derive(Debug, Clone)]
pub struct BlockStore {
    root: PathBuf,
}

impl BlockStore {
    /// Create a handle rooted at `root`. Call
    /// [`initialize()`](ContentStore::initialize) before first use.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn index_path(&self) -> PathBuf {
        self.root.join("index.json")
    }

    fn load_index(&self) -> Result<IndexDocument, ContentStoreError> {
        let path = self.index_path();
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|e| {
            ContentStoreError::Index(format!("{} is unparsable: {e}", path.display()))
        })
    }

    fn save_index(&self, index: &IndexDocument) -> Result<(), ContentStoreError> {
        let json = serde_json::to_string_pretty(index)
            .map_err(|e| ContentStoreError::Index(format!("serialization failed: {e}")))?;
        let tmp = self.index_path().with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, self.index_path())?;
        Ok(())
    }
}

/// Validate that a logical name is safe for use in block paths.
///
/// Rejects names containing path separators or parent-directory
/// traversals that could escape the blocks directory.
fn validate_logical_name(name: &str) -> Result<(), ContentStoreError> {
    if name.is_empty() {
        return Err(ContentStoreError::InvalidName {
            name: name.into(),
            reason: "logical name must not be empty".into(),
        });
    }
    if name.contains('/') || name.contains('\\') || name.contains('\0') {
        return Err(ContentStoreError::InvalidName {
            name: name.into(),
            reason: "logical name contains path separators".into(),
        });
    }
    if name == "." || name == ".." {
        return Err(ContentStoreError::InvalidName {
            name: name.into(),
            reason: "logical name must not be a relative path".into(),
        });
    }
    Ok(())
}

impl ContentStore for BlockStore {
    fn initialize(&self, capacity: u64) -> Result<(), ContentStoreError> {
        fs::create_dir_all(self.root.join("blocks"))?;
        let index = IndexDocument {
            capacity,
            blocks: BTreeMap::new(),
        };
        self.save_index(&index)?;
        tracing::info!(root = %self.root.display(), capacity, "block store initialized");
        Ok(())
    }

    fn push(&self, local_path: &Path, logical_name: &str) -> Result<(), ContentStoreError> {
        validate_logical_name(logical_name)?;
        let mut index = self.load_index()?;

        let is_new = !index.blocks.contains_key(logical_name);
        if is_new && index.blocks.len() as u64 >= index.capacity {
            return Err(ContentStoreError::CapacityExceeded {
                capacity: index.capacity,
            });
        }

        let block_file = format!("{logical_name}.blk");
        let block_path = self.root.join("blocks").join(&block_file);

        // Overwrite-in-place via temp + rename, so a failed copy never
        // leaves a half-written block behind.
        let tmp = block_path.with_extension("blk.tmp");
        fs::copy(local_path, &tmp)?;
        fs::rename(&tmp, &block_path)?;

        let info = BlockInfo {
            pointer: StoragePointer::new(format!("blocks/{block_file}")).map_err(|e| {
                ContentStoreError::InvalidName {
                    name: logical_name.into(),
                    reason: e.to_string(),
                }
            })?,
            block_name: BlockName::new(block_file.clone()).map_err(|e| {
                ContentStoreError::InvalidName {
                    name: logical_name.into(),
                    reason: e.to_string(),
                }
            })?,
        };
        index.blocks.insert(logical_name.to_string(), info);
        self.save_index(&index)?;
        tracing::debug!(logical_name, block = %block_file, "block pushed");
        Ok(())
    }

    fn pull(&self, pointer: &StoragePointer, destination: &Path) -> Result<(), ContentStoreError> {
        // The pointer must stay inside the store root.
        let rel = Path::new(pointer.as_str());
        let escapes = rel.is_absolute()
            || rel
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir));
        if escapes {
            return Err(ContentStoreError::InvalidName {
                name: pointer.as_str().into(),
                reason: "pointer resolves outside the store root".into(),
            });
        }
        let source = self.root.join(rel);

        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::copy(&source, destination)?;
        tracing::debug!(pointer = %pointer, destination = %destination.display(),
            "block pulled");
        Ok(())
    }

    fn metadata(&self, logical_name: &str) -> Result<BlockInfo, ContentStoreError> {
        validate_logical_name(logical_name)?;
        let index = self.load_index()?;
        index
            .blocks
            .get(logical_name)
            .cloned()
            .ok_or_else(|| ContentStoreError::InfoNotFound {
                logical_name: logical_name.into(),
            })
    }
}
