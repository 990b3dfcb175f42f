//! # Key File Persistence
//!
//! Reads and writes local identity key files: `<prefix>.key` holds the
//! 32-byte private seed as hex, `<prefix>.pub` the public key as hex.
//! The `.pub` file is a convenience for sharing; the seed file alone is
//! sufficient to reconstruct the key pair.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CryptoError;
use crate::keys::{hex_to_bytes, Keypair, PublicKey};

/// Write `<prefix>.key` (seed hex) and `<prefix>.pub` (public key hex)
/// into `dir`, returning the two paths.
///
/// Refuses to overwrite an existing seed file: a silently replaced
/// identity would orphan every asset signed by the old key.
pub fn write_key_files(
    dir: &Path,
    prefix: &str,
    keypair: &Keypair,
) -> Result<(PathBuf, PathBuf), CryptoError> {
    fs::create_dir_all(dir)?;
    let key_path = dir.join(format!("{prefix}.key"));
    let pub_path = dir.join(format!("{prefix}.pub"));

    if key_path.exists() {
        return Err(CryptoError::KeyFile {
            path: key_path.display().to_string(),
            reason: "refusing to overwrite existing key file".into(),
        });
    }

    let seed_hex: String = keypair.seed().iter().map(|b| format!("{b:02x}")).collect();
    fs::write(&key_path, seed_hex)?;
    fs::write(&pub_path, keypair.public_key().to_hex())?;
    Ok((key_path, pub_path))
}

/// Load a key pair from a seed file written by [`write_key_files()`].
pub fn load_keypair(path: &Path) -> Result<Keypair, CryptoError> {
    let content = fs::read_to_string(path).map_err(|e| CryptoError::KeyFile {
        path: path.display().to_string(),
        reason: format!("cannot read: {e}"),
    })?;
    let hex = content.trim();
    if hex.len() != 64 {
        return Err(CryptoError::KeyFile {
            path: path.display().to_string(),
            reason: format!("seed must be 64 hex chars, got {}", hex.len()),
        });
    }
    let bytes = hex_to_bytes(hex).map_err(|reason| CryptoError::KeyFile {
        path: path.display().to_string(),
        reason,
    })?;
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&bytes);
    Ok(Keypair::from_seed(&seed))
}

/// Load a public key from a `.pub` file written by [`write_key_files()`].
pub fn load_public_key(path: &Path) -> Result<PublicKey, CryptoError> {
    let content = fs::read_to_string(path).map_err(|e| CryptoError::KeyFile {
        path: path.display().to_string(),
        reason: format!("cannot read: {e}"),
    })?;
    PublicKey::from_hex(content.trim())
}
