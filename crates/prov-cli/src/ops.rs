//! # `prov ingest` / `prov retrieve` / `prov commit`
//!
//! The three workflow commands. Each loads the configured identity,
//! assembles a node, runs one workflow, and prints the resulting
//! transaction ID as the handle for later commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use prov_core::TransactionId;
use prov_crypto::{load_keypair, Keypair};
use prov_node::NodeConfig;

use crate::build_node;

/// Arguments for `prov ingest`.
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Path of the file to ingest.
    #[arg(short, long)]
    pub source: PathBuf,

    /// Path of the identity seed file (defaults to `<root>/keys/user.key`).
    #[arg(long)]
    pub key: Option<PathBuf>,
}

/// Arguments for `prov retrieve`.
#[derive(Args, Debug)]
pub struct RetrieveArgs {
    /// Transaction ID of the version to retrieve.
    #[arg(short, long)]
    pub tid: String,

    /// Path of the identity seed file (defaults to `<root>/keys/user.key`).
    #[arg(long)]
    pub key: Option<PathBuf>,
}

/// Arguments for `prov commit`.
#[derive(Args, Debug)]
pub struct CommitArgs {
    /// Path of the modified file to commit.
    #[arg(short, long)]
    pub source: PathBuf,

    /// Transaction ID of the file version being replaced.
    #[arg(short, long)]
    pub tid: String,

    /// Path of the identity seed file (defaults to `<root>/keys/user.key`).
    #[arg(long)]
    pub key: Option<PathBuf>,
}

/// Load the signing identity: an explicit `--key` path, or the default
/// location under the root directory.
fn load_identity(key: Option<&Path>, root: &Path) -> Result<Keypair> {
    let path = match key {
        Some(p) => p.to_path_buf(),
        None => root.join("keys").join("user.key"),
    };
    load_keypair(&path)
        .with_context(|| format!("cannot load identity key (run `prov keygen --output {}`?)",
            root.join("keys").display()))
}

/// Execute the ingest subcommand.
pub fn run_ingest(args: &IngestArgs, config: &NodeConfig, root: &Path) -> Result<u8> {
    let keypair = load_identity(args.key.as_deref(), root)?;
    let node = build_node(config, root)?;

    let asset = node
        .ingest(&args.source, &keypair)
        .with_context(|| format!("ingest of {} failed", args.source.display()))?;

    // The push set the ID; surface it as the transaction handle.
    let tid = asset.id().context("ingest returned an unpushed asset")?;
    println!("TID: {tid}");
    Ok(0)
}

/// Execute the retrieve subcommand.
pub fn run_retrieve(args: &RetrieveArgs, config: &NodeConfig, root: &Path) -> Result<u8> {
    let tid = TransactionId::parse(&args.tid).context("invalid --tid value")?;
    let keypair = load_identity(args.key.as_deref(), root)?;
    let node = build_node(config, root)?;

    let asset = node
        .retrieve(&tid, &keypair)
        .with_context(|| format!("retrieve of {tid} failed"))?;

    let new_tid = asset.id().context("retrieve returned an unpushed asset")?;
    println!("TID: {new_tid}");
    Ok(0)
}

/// Execute the commit subcommand.
pub fn run_commit(args: &CommitArgs, config: &NodeConfig, root: &Path) -> Result<u8> {
    let prev_tid = TransactionId::parse(&args.tid).context("invalid --tid value")?;
    let keypair = load_identity(args.key.as_deref(), root)?;
    let node = build_node(config, root)?;

    let asset = node
        .commit(&args.source, &prev_tid, &keypair)
        .with_context(|| format!("commit of {} onto {prev_tid} failed", args.source.display()))?;

    let new_tid = asset.id().context("commit returned an unpushed asset")?;
    println!("TID: {new_tid}");
    Ok(0)
}
