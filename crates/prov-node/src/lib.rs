//! # prov-node — Workflow Orchestration
//!
//! Coordinates the three provenance workflows — ingest, retrieve, commit —
//! across the content store, the ledger, and the key store.
//!
//! ## Ordering Invariant
//!
//! Every workflow performs local and content-store effects *before* the
//! irreversible ledger write, and key store persistence *after* a
//! successful ledger write. The key store therefore never references a
//! transaction ID that does not exist on the ledger. The converse window
//! (ledger write succeeded, key store save failed) is surfaced as the
//! recoverable [`NodeError::ReconciliationRequired`] rather than a
//! process exit.

pub mod config;
pub mod node;

pub use config::{ConfigError, LedgerConfig, NodeConfig};
pub use node::{Node, NodeError};
