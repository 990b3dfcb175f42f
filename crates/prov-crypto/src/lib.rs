//! # prov-crypto — Identity Keys and Signatures
//!
//! Ed25519 key pairs, signing, and verification for asset provenance
//! records, plus key file persistence for local identities.
//!
//! ## Invariants
//!
//! - Signing input MUST be `&CanonicalBytes` — you cannot sign raw bytes.
//!   All signed data flows through the canonicalization pipeline first.
//! - Private keys are never serialized or logged. `Keypair` does not
//!   implement `Serialize`, and its `Debug` impl prints a placeholder.
//! - Public keys and signatures serialize as hex-encoded strings.

pub mod error;
pub mod keyfile;
pub mod keys;

pub use error::CryptoError;
pub use keyfile::{load_keypair, load_public_key, write_key_files};
pub use keys::{verify, Keypair, PublicKey, Signature};
