//! # Node Configuration
//!
//! YAML-backed configuration for a provenance node: where the workspace,
//! key store, and block store live, and how the ledger backend is
//! reached. Absent a config file, defaults are derived from a root
//! directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config at {path}: {source}")]
    Io {
        /// The config file path.
        path: String,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid YAML for this schema.
    #[error("cannot parse config at {path}: {source}")]
    Parse {
        /// The config file path.
        path: String,
        /// The underlying YAML failure.
        #[source]
        source: serde_yaml::Error,
    },
}

/// How to reach the ledger backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Backend endpoint. The bundled file backend uses
    /// `file:<path>` (relative paths resolve against the root
    /// directory); network backends put their URL here.
    pub endpoint: String,
    /// Deadline for ledger operations, in seconds. Transport
    /// implementations map expiry to a retryable timeout error instead
    /// of hanging.
    pub timeout_secs: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            endpoint: "file:ledger.json".into(),
            timeout_secs: 30,
        }
    }
}

/// Node configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Directory retrieved files are pulled into.
    pub workspace: PathBuf,
    /// Path of the key store document.
    pub keystore_path: PathBuf,
    /// Root directory of the block store.
    pub store_dir: PathBuf,
    /// Ledger backend settings.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

impl NodeConfig {
    /// Default layout under a root directory:
    ///
    /// ```text
    /// <root>/workspace/       — retrieved files
    /// <root>/keystore.json    — the key store
    /// <root>/store/           — the block store
    /// ```
    pub fn default_under(root: &Path) -> Self {
        Self {
            workspace: root.join("workspace"),
            keystore_path: root.join("keystore.json"),
            store_dir: root.join("store"),
            ledger: LedgerConfig::default(),
        }
    }

    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load from `path` when given, otherwise fall back to defaults
    /// under `root`.
    pub fn load_or_default(path: Option<&Path>, root: &Path) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default_under(root)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_under_root() {
        let cfg = NodeConfig::default_under(Path::new("/data/prov"));
        assert_eq!(cfg.workspace, Path::new("/data/prov/workspace"));
        assert_eq!(cfg.keystore_path, Path::new("/data/prov/keystore.json"));
        assert_eq!(cfg.store_dir, Path::new("/data/prov/store"));
        assert_eq!(cfg.ledger.endpoint, "file:ledger.json");
        assert_eq!(cfg.ledger.timeout_secs, 30);
    }

    #[test]
    fn load_full_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prov.yaml");
        fs::write(
            &path,
            "workspace: /srv/ws\nkeystore_path: /srv/ks.json\nstore_dir: /srv/blocks\nledger:\n  endpoint: \"http://ledger:9984\"\n  timeout_secs: 10\n",
        )
        .unwrap();

        let cfg = NodeConfig::load(&path).unwrap();
        assert_eq!(cfg.workspace, Path::new("/srv/ws"));
        assert_eq!(cfg.ledger.endpoint, "http://ledger:9984");
        assert_eq!(cfg.ledger.timeout_secs, 10);
    }

    #[test]
    fn ledger_section_defaults_when_omitted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prov.yaml");
        fs::write(
            &path,
            "workspace: /srv/ws\nkeystore_path: /srv/ks.json\nstore_dir: /srv/blocks\n",
        )
        .unwrap();
        let cfg = NodeConfig::load(&path).unwrap();
        assert_eq!(cfg.ledger, LedgerConfig::default());
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = NodeConfig::load(&dir.path().join("absent.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn load_garbage_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "workspace: [unclosed").unwrap();
        assert!(matches!(
            NodeConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn load_or_default_prefers_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prov.yaml");
        fs::write(
            &path,
            "workspace: /a\nkeystore_path: /b\nstore_dir: /c\n",
        )
        .unwrap();
        let cfg = NodeConfig::load_or_default(Some(&path), dir.path()).unwrap();
        assert_eq!(cfg.workspace, Path::new("/a"));

        let fallback = NodeConfig::load_or_default(None, dir.path()).unwrap();
        assert_eq!(fallback, NodeConfig::default_under(dir.path()));
    }
}
