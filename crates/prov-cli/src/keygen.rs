//! # `prov keygen`
//!
//! Generates a local Ed25519 identity and writes its key files.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use prov_crypto::{write_key_files, Keypair};

/// Arguments for `prov keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Directory to write the key files into.
    #[arg(long)]
    pub output: PathBuf,

    /// Filename prefix for the key files.
    #[arg(long, default_value = "user")]
    pub prefix: String,
}

/// Execute the keygen subcommand.
pub fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    let keypair = Keypair::generate();
    let (key_path, pub_path) = write_key_files(&args.output, &args.prefix, &keypair)
        .with_context(|| format!("cannot write key files into {}", args.output.display()))?;

    println!("OK: wrote {}", key_path.display());
    println!("OK: wrote {}", pub_path.display());
    println!("public key: {}", keypair.public_key());
    Ok(0)
}
