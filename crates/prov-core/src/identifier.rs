//! # Identifier Newtypes
//!
//! Newtype wrappers for the identifier namespaces in the stack. These
//! prevent accidental identifier confusion — you cannot pass a
//! `StoragePointer` where a `TransactionId` is expected, even though both
//! are strings on the wire.

use serde::{Deserialize, Serialize};

use crate::digest::ContentDigest;
use crate::error::CoreError;

/// A ledger-assigned transaction identifier.
///
/// Transaction IDs are content-derived: the ledger computes them as the
/// SHA-256 digest of the submitted envelope, so they are always 64
/// lowercase hex characters. The validated constructor rejects anything
/// else, which keeps user-supplied IDs from reaching the ledger or the
/// key store malformed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Parse a transaction ID from a hex string.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let t = s.trim().to_lowercase();
        if t.len() != 64 || !t.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidIdentifier(format!(
                "transaction id must be 64 hex chars, got {:?}",
                s
            )));
        }
        Ok(Self(t))
    }

    /// Derive a transaction ID from a content digest.
    pub fn from_digest(digest: &ContentDigest) -> Self {
        Self(digest.to_hex())
    }

    /// Return the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An opaque pointer into the content store.
///
/// The content store hands these out; the stack never interprets their
/// structure, only stores and replays them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoragePointer(String);

impl StoragePointer {
    /// Wrap a pointer string. Rejects empty pointers.
    pub fn new(s: impl Into<String>) -> Result<Self, CoreError> {
        let s = s.into();
        if s.trim().is_empty() {
            return Err(CoreError::InvalidIdentifier(
                "storage pointer must not be empty".into(),
            ));
        }
        Ok(Self(s))
    }

    /// Return the pointer as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StoragePointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The content store's internal name for a stored block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockName(String);

impl BlockName {
    /// Wrap a block name string. Rejects empty names.
    pub fn new(s: impl Into<String>) -> Result<Self, CoreError> {
        let s = s.into();
        if s.trim().is_empty() {
            return Err(CoreError::InvalidIdentifier(
                "block name must not be empty".into(),
            ));
        }
        Ok(Self(s))
    }

    /// Return the block name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlockName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
