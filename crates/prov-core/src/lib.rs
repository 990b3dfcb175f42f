//! # prov-core — Foundational Types for the Provenance Stack
//!
//! This crate is the bedrock of the provenance stack. It defines the
//! type-system primitives every other crate builds on: canonical byte
//! production, content digests, identifier newtypes, and UTC timestamps.
//! Every other crate in the workspace depends on `prov-core`; it depends
//! on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `TransactionId`,
//!    `StoragePointer`, `BlockName` — all newtypes with validated
//!    constructors. No bare strings for identifiers.
//!
//! 2. **`CanonicalBytes` newtype.** ALL digest and signature computation
//!    flows through `CanonicalBytes::new()`. No raw `serde_json::to_vec()`
//!    for anything that gets hashed or signed.
//!
//! 3. **UTC-only timestamps.** The `Timestamp` type enforces UTC with Z
//!    suffix and seconds precision, matching the canonicalization rules.
//!
//! 4. **`sha256_digest()` accepts only `&CanonicalBytes`.** Compile-time
//!    enforcement that every digest path flows through canonicalization.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `prov-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug` and `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identifier;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{hash_file, sha256_digest, ContentDigest, Sha256Accumulator};
pub use error::{CanonicalError, CoreError};
pub use identifier::{BlockName, StoragePointer, TransactionId};
pub use temporal::Timestamp;
