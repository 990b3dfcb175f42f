//! # prov-ledger — Asset Lineage on an Append-Only Ledger
//!
//! The asset/transaction lineage model: an `Asset` is an immutable,
//! cryptographically signed record of one file operation (PUT or GET),
//! chained to its predecessor through `parent` to form a backward,
//! acyclic, append-only lineage per file.
//!
//! - **asset** — the `Asset` record, its signing payload, push and
//!   reconstruction, and lineage walking.
//! - **client** — the `LedgerClient` contract and its error taxonomy,
//!   separating retryable transport failures from definitive rejections.
//! - **memory** — `InMemoryLedger`, the reference implementation used by
//!   the test suites.
//! - **file** — `FileLedger`, a durable single-file backend for local
//!   use across process invocations.
//!
//! ## Invariants
//!
//! - An asset is signed and submitted exactly once; its `id` is assigned
//!   by the ledger (content-derived) and never mutated afterwards.
//! - Submissions carry a client-generated idempotency token, so retrying
//!   after an ambiguous failure cannot create a duplicate lineage entry.
//! - Reconstruction via [`Asset::from_id()`] verifies both the Ed25519
//!   signature and the content-derived transaction ID before returning.

pub mod asset;
pub mod client;
pub mod file;
pub mod memory;

pub use asset::{walk_lineage, Asset, AssetEnvelope, AssetError, Operation};
pub use client::{LedgerClient, LedgerError};
pub use file::FileLedger;
pub use memory::InMemoryLedger;
