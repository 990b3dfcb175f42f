//! # prov CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Uses clap derive macros with a global verbosity flag driving the
//! tracing filter.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use prov_cli::keygen::{run_keygen, KeygenArgs};
use prov_cli::ops::{run_commit, run_ingest, run_retrieve, CommitArgs, IngestArgs, RetrieveArgs};
use prov_cli::setup::{run_init, InitArgs};
use prov_node::NodeConfig;

/// File provenance on a content-addressed ledger.
///
/// Tracks file history as a chain of signed asset transactions: ingest a
/// file, retrieve any recorded version, commit updates — every operation
/// leaves a verifiable record.
#[derive(Parser, Debug)]
#[command(name = "prov", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Root directory for local state (workspace, key store, block store).
    #[arg(long, default_value = ".prov", global = true)]
    root: PathBuf,

    /// Path to a YAML configuration file overriding the default layout.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize local state: key store, workspace, and block store.
    Init(InitArgs),

    /// Generate an Ed25519 identity and write its key files.
    Keygen(KeygenArgs),

    /// Ingest a new file and record its first PUT transaction.
    Ingest(IngestArgs),

    /// Retrieve a recorded file version into the workspace.
    Retrieve(RetrieveArgs),

    /// Commit an updated version of an already-recorded file.
    Commit(CommitArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = match NodeConfig::load_or_default(cli.config.as_deref(), &cli.root) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(1);
        }
    };

    let result = match cli.command {
        Commands::Init(args) => run_init(&args, &config),
        Commands::Keygen(args) => run_keygen(&args),
        Commands::Ingest(args) => run_ingest(&args, &config, &cli.root),
        Commands::Retrieve(args) => run_retrieve(&args, &config, &cli.root),
        Commands::Commit(args) => run_commit(&args, &config, &cli.root),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
