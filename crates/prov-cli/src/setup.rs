//! # `prov init`
//!
//! Creates the local state a node needs: a fresh key store and an
//! initialized block store under the configured paths.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use prov_node::NodeConfig;
use prov_store::{BlockStore, ContentStore, KeyStore};

/// Arguments for `prov init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Block capacity for the content store.
    #[arg(short = 'n', long, default_value_t = 5000)]
    pub capacity: u64,
}

/// Execute the init subcommand.
pub fn run_init(args: &InitArgs, config: &NodeConfig) -> Result<u8> {
    KeyStore::create(&config.keystore_path).with_context(|| {
        format!(
            "cannot create key store at {}",
            config.keystore_path.display()
        )
    })?;

    let store = BlockStore::new(&config.store_dir);
    store
        .initialize(args.capacity)
        .with_context(|| format!("cannot initialize block store at {}", config.store_dir.display()))?;

    std::fs::create_dir_all(&config.workspace).with_context(|| {
        format!("cannot create workspace at {}", config.workspace.display())
    })?;

    println!(
        "OK: initialized key store, workspace, and a {}-block store",
        args.capacity
    );
    Ok(0)
}

/// Check whether init has already been run under this configuration.
pub fn is_initialized(config: &NodeConfig) -> bool {
    config.keystore_path.exists() && Path::new(&config.store_dir).join("index.json").exists()
}
