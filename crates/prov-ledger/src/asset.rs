//! # Asset Records
//!
//! An `Asset` is an immutable, signed record of one file operation,
//! chained to its predecessor via `parent` to form a file's lineage.
//!
//! ## Lifecycle
//!
//! 1. Constructed in memory with [`Asset::new()`] — no `id`, no
//!    `signature`, no side effects. A submission token is minted here and
//!    travels with the record for the rest of its life.
//! 2. Signed and submitted exactly once with [`Asset::push()`]. The
//!    canonical signing payload covers every field except the signature
//!    itself; the ledger assigns the content-derived `id`.
//! 3. Reconstructed read-only with [`Asset::from_id()`], which verifies
//!    the signature and recomputes the content-derived ID before
//!    returning. No mutation is possible after reconstruction — the only
//!    mutating operation, `push`, refuses assets that already carry an ID.
//!
//! ## Signing Payload
//!
//! ```text
//! payload = JCS(envelope without "signature")
//! id      = SHA256(JCS(envelope)) — assigned by the ledger
//! ```
//!
//! The strip-then-canonicalize construction makes the payload independent
//! of whether the record has been signed yet.

use std::collections::BTreeSet;

use prov_core::{sha256_digest, CanonicalBytes, ContentDigest, Timestamp, TransactionId};
use prov_crypto::{Keypair, PublicKey, Signature};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::client::{LedgerClient, LedgerError};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors specific to asset construction, push, and reconstruction.
#[derive(Error, Debug)]
pub enum AssetError {
    /// `push` was called on an asset that already has a ledger ID.
    #[error("asset already pushed as transaction {tid}")]
    AlreadyPushed {
        /// The transaction ID assigned by the earlier push.
        tid: TransactionId,
    },

    /// The signing key does not match the asset's declared owner.
    #[error("signing key does not match asset owner {owner}")]
    KeyMismatch {
        /// The owner public key recorded on the asset.
        owner: String,
    },

    /// A stored envelope failed signature verification.
    #[error("signature verification failed for transaction {tid}: {reason}")]
    SignatureInvalid {
        /// The transaction whose envelope failed verification.
        tid: String,
        /// The underlying verification failure.
        reason: String,
    },

    /// A stored envelope's content digest does not match its transaction ID.
    #[error("transaction id mismatch: ledger says {expected}, content says {actual}")]
    IdMismatch {
        /// The ID the envelope was fetched under.
        expected: TransactionId,
        /// The ID recomputed from the envelope contents.
        actual: TransactionId,
    },

    /// A lineage walk revisited a transaction — the chain is cyclic.
    #[error("lineage cycle detected at transaction {tid}")]
    LineageCycle {
        /// The transaction where the cycle closed.
        tid: TransactionId,
    },

    /// Canonicalization of the signing payload failed.
    #[error("signing payload error: {0}")]
    Signing(#[from] prov_core::CanonicalError),

    /// Envelope manipulation failed during payload construction.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A ledger operation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// The kind of file operation an asset records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// A new or updated file version was written to the content store.
    #[serde(rename = "PUT")]
    Put,
    /// A file version was read out of the content store.
    #[serde(rename = "GET")]
    Get,
}

impl Operation {
    /// The wire name of the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Put => "PUT",
            Operation::Get => "GET",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AssetEnvelope
// ---------------------------------------------------------------------------

/// The wire form of a signed asset, as stored by the ledger.
///
/// The transaction ID is not part of the envelope — it is derived from it:
/// `SHA256(JCS(envelope))`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetEnvelope {
    /// The submitting user's public key.
    pub owner: PublicKey,
    /// Digest of the file content at the time of the operation.
    pub file_hash: ContentDigest,
    /// PUT or GET.
    pub operation: Operation,
    /// The prior asset in this file's lineage, absent for a first ingest.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parent: Option<TransactionId>,
    /// Free-form labels ("ingest", "commit", "retrieve"). Descriptive
    /// only; no behavioral effect.
    pub tags: BTreeSet<String>,
    /// When the record was constructed.
    pub recorded_at: Timestamp,
    /// Client-generated idempotency token. Backends deduplicate on this,
    /// making retry after an ambiguous failure safe.
    pub submission_token: Uuid,
    /// Ed25519 signature over the signing payload.
    pub signature: Signature,
}

impl AssetEnvelope {
    /// The canonical bytes the signature covers: the envelope serialized
    /// with the `signature` field stripped.
    pub fn signing_payload(&self) -> Result<CanonicalBytes, AssetError> {
        let mut value = serde_json::to_value(self)?;
        match value.as_object_mut() {
            Some(obj) => {
                obj.remove("signature");
            }
            None => {
                return Err(AssetError::Serialization(
                    <serde_json::Error as serde::ser::Error>::custom(
                        "AssetEnvelope did not serialize to a JSON object",
                    ),
                ));
            }
        }
        Ok(CanonicalBytes::from_value(value)?)
    }

    /// Verify the envelope's signature against its embedded owner key.
    pub fn verify_signature(&self) -> Result<(), AssetError> {
        let payload = self.signing_payload()?;
        prov_crypto::verify(&payload, &self.signature, &self.owner).map_err(|e| {
            AssetError::SignatureInvalid {
                tid: self.content_id().map(|t| t.to_string()).unwrap_or_default(),
                reason: e.to_string(),
            }
        })
    }

    /// The content-derived transaction ID: `SHA256(JCS(envelope))`.
    pub fn content_id(&self) -> Result<TransactionId, AssetError> {
        let canonical = CanonicalBytes::new(self)?;
        Ok(TransactionId::from_digest(&sha256_digest(&canonical)))
    }
}

// ---------------------------------------------------------------------------
// Asset
// ---------------------------------------------------------------------------

/// The signing payload view of an asset: every envelope field except the
/// signature. Field names must match `AssetEnvelope` exactly so the
/// strip-then-canonicalize path in [`AssetEnvelope::signing_payload()`]
/// produces identical bytes.
#[derive(Serialize)]
struct SigningPayload<'a> {
    owner: &'a PublicKey,
    file_hash: &'a ContentDigest,
    operation: Operation,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<&'a TransactionId>,
    tags: &'a BTreeSet<String>,
    recorded_at: &'a Timestamp,
    submission_token: &'a Uuid,
}

/// An immutable, signed record of one file operation.
///
/// See the module documentation for the lifecycle. All fields are private;
/// the accessors expose them read-only, and the only mutating operation
/// ([`Asset::push()`]) refuses to run twice.
#[derive(Debug, Clone)]
pub struct Asset {
    owner: PublicKey,
    file_hash: ContentDigest,
    operation: Operation,
    parent: Option<TransactionId>,
    tags: BTreeSet<String>,
    recorded_at: Timestamp,
    submission_token: Uuid,
    id: Option<TransactionId>,
    signature: Option<Signature>,
}

impl Asset {
    /// Construct an asset in memory. Pure: no signing, no ledger contact.
    pub fn new(
        owner: PublicKey,
        file_hash: ContentDigest,
        operation: Operation,
        parent: Option<TransactionId>,
        tags: BTreeSet<String>,
    ) -> Self {
        Self {
            owner,
            file_hash,
            operation,
            parent,
            tags,
            recorded_at: Timestamp::now(),
            submission_token: Uuid::new_v4(),
            id: None,
            signature: None,
        }
    }

    /// The ledger-assigned transaction ID, once pushed.
    pub fn id(&self) -> Option<&TransactionId> {
        self.id.as_ref()
    }

    /// The owner's public key.
    pub fn owner(&self) -> &PublicKey {
        &self.owner
    }

    /// The file content digest this record attests to.
    pub fn file_hash(&self) -> &ContentDigest {
        &self.file_hash
    }

    /// PUT or GET.
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// The prior asset in the lineage, if any.
    pub fn parent(&self) -> Option<&TransactionId> {
        self.parent.as_ref()
    }

    /// The record's tags.
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// When the record was constructed.
    pub fn recorded_at(&self) -> Timestamp {
        self.recorded_at
    }

    /// Whether the asset has been pushed to the ledger.
    pub fn is_pushed(&self) -> bool {
        self.id.is_some()
    }

    /// Sign the asset and submit it to the ledger. On success the
    /// ledger-assigned transaction ID is recorded on the asset and
    /// returned.
    ///
    /// The ledger write is durable and irreversible. If submission fails
    /// with a retryable error ([`LedgerError::is_retryable()`]), calling
    /// `push` again is safe: the asset keeps its submission token, and a
    /// conforming backend deduplicates on it.
    ///
    /// # Errors
    ///
    /// - [`AssetError::AlreadyPushed`] if the asset already has an ID.
    /// - [`AssetError::KeyMismatch`] if `keypair` is not the owner's.
    /// - [`AssetError::Signing`] if payload canonicalization fails.
    /// - [`AssetError::Ledger`] if the backend rejects or is unreachable.
    pub fn push<L: LedgerClient>(
        &mut self,
        keypair: &Keypair,
        ledger: &L,
    ) -> Result<TransactionId, AssetError> {
        if let Some(tid) = &self.id {
            return Err(AssetError::AlreadyPushed { tid: tid.clone() });
        }
        if keypair.public_key() != self.owner {
            return Err(AssetError::KeyMismatch {
                owner: self.owner.to_hex(),
            });
        }

        let payload = CanonicalBytes::new(&SigningPayload {
            owner: &self.owner,
            file_hash: &self.file_hash,
            operation: self.operation,
            parent: self.parent.as_ref(),
            tags: &self.tags,
            recorded_at: &self.recorded_at,
            submission_token: &self.submission_token,
        })?;
        let signature = keypair.sign(&payload);

        let envelope = AssetEnvelope {
            owner: self.owner.clone(),
            file_hash: self.file_hash,
            operation: self.operation,
            parent: self.parent.clone(),
            tags: self.tags.clone(),
            recorded_at: self.recorded_at,
            submission_token: self.submission_token,
            signature: signature.clone(),
        };

        let tid = ledger.submit(&envelope)?;
        self.signature = Some(signature);
        self.id = Some(tid.clone());
        tracing::debug!(tid = %tid, operation = %self.operation, "asset pushed to ledger");
        Ok(tid)
    }

    /// Fetch a transaction by ID and reconstruct its asset, read-only.
    ///
    /// The stored envelope is verified before anything is returned: the
    /// Ed25519 signature must check out against the embedded owner key,
    /// and the content-derived ID must equal the ID the envelope was
    /// fetched under. Either failure means the ledger record cannot be
    /// trusted.
    pub fn from_id<L: LedgerClient>(
        tid: &TransactionId,
        ledger: &L,
    ) -> Result<Asset, AssetError> {
        let envelope = ledger.get(tid)?;
        envelope.verify_signature()?;
        let derived = envelope.content_id()?;
        if &derived != tid {
            return Err(AssetError::IdMismatch {
                expected: tid.clone(),
                actual: derived,
            });
        }
        Ok(Self::from_envelope(tid.clone(), envelope))
    }

    fn from_envelope(tid: TransactionId, envelope: AssetEnvelope) -> Self {
        Self {
            owner: envelope.owner,
            file_hash: envelope.file_hash,
            operation: envelope.operation,
            parent: envelope.parent,
            tags: envelope.tags,
            recorded_at: envelope.recorded_at,
            submission_token: envelope.submission_token,
            id: Some(tid),
            signature: Some(envelope.signature),
        }
    }
}

// ---------------------------------------------------------------------------
// Lineage walking
// ---------------------------------------------------------------------------

/// Walk a file's lineage backwards from `tid` to its first ingest,
/// returning assets newest-first.
///
/// Every hop is verified the same way as [`Asset::from_id()`]. A revisited
/// transaction ID fails with [`AssetError::LineageCycle`] — a well-formed
/// lineage is a backward chain and can never cycle.
pub fn walk_lineage<L: LedgerClient>(
    tid: &TransactionId,
    ledger: &L,
) -> Result<Vec<Asset>, AssetError> {
    let mut seen = BTreeSet::new();
    let mut chain = Vec::new();
    let mut cursor = Some(tid.clone());

    while let Some(current) = cursor {
        if !seen.insert(current.clone()) {
            return Err(AssetError::LineageCycle { tid: current });
        }
        let asset = Asset::from_id(&current, ledger)?;
        cursor = asset.parent().cloned();
        chain.push(asset);
    }
    Ok(chain)
}
