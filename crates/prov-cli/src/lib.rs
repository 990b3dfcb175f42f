//! # prov-cli — Command Handlers
//!
//! One module per command family, each exposing an args struct and a
//! `run_*` function returning a process exit code. The binary entry
//! point in `main.rs` owns argument parsing and tracing setup.

use std::path::Path;

use anyhow::{bail, Context, Result};
use prov_ledger::FileLedger;
use prov_node::{Node, NodeConfig};
use prov_store::{BlockStore, KeyStore};

pub mod keygen;
pub mod ops;
pub mod setup;

/// Open the ledger backend named by the config endpoint.
///
/// Only the bundled `file:` backend ships with the CLI; other schemes
/// belong to external clients and are rejected with a pointer at the
/// config.
pub fn open_ledger(endpoint: &str, root: &Path) -> Result<FileLedger> {
    let Some(path) = endpoint.strip_prefix("file:") else {
        bail!(
            "no bundled ledger client for endpoint {endpoint:?}; \
             configure a file: endpoint or run against an external client"
        );
    };
    let path = Path::new(path);
    let resolved = if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    };
    FileLedger::open(&resolved)
        .with_context(|| format!("cannot open ledger at {}", resolved.display()))
}

/// Assemble a node from configuration: load the key store, open the
/// ledger, and wire up the block store.
pub fn build_node(config: &NodeConfig, root: &Path) -> Result<Node<BlockStore, FileLedger>> {
    let keystore = KeyStore::load(&config.keystore_path).with_context(|| {
        format!(
            "cannot load key store at {} (run `prov init` first?)",
            config.keystore_path.display()
        )
    })?;
    let ledger = open_ledger(&config.ledger.endpoint, root)?;
    let content = BlockStore::new(&config.store_dir);
    Ok(Node::new(keystore, content, ledger, &config.workspace))
}
