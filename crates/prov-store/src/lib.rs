//! # prov-store — Local Storage
//!
//! Two storage concerns live here:
//!
//! - **keystore** — the durable local mapping from ledger transaction ID
//!   to `(storage pointer, filename)`. The sole source of truth for
//!   locating file bytes given a transaction; not authoritative for
//!   lineage.
//! - **content** — the `ContentStore` contract the orchestrator consumes,
//!   plus `BlockStore`, a filesystem-backed implementation.
//!
//! ## Durability Model
//!
//! The KeyStore is loaded once at process start and explicitly saved after
//! every mutation — no autosave. Saves are atomic (temp file + rename) and
//! every store document embeds an integrity digest that is re-verified on
//! load, so corruption surfaces as a typed error instead of silent data
//! loss.

pub mod content;
pub mod error;
pub mod keystore;

pub use content::{BlockInfo, BlockStore, ContentStore};
pub use error::{ContentStoreError, KeyStoreError};
pub use keystore::{KeyEntry, KeyStore};
