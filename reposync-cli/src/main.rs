//! reposync — keep repositories in step with a template tree.
//!
//! # Usage
//!
//! ```text
//! reposync sync <source> <destination> --repo <id> [--delete-orphaned] [--exclude <path>]...
//!               [--layout flatten|mirror] [--fail-fast] [--dry-run] [--json]
//! reposync sync --config reposync.yml [--dry-run] [--json]
//! reposync diff <source> <destination> --repo <id> [--delete-orphaned] [--exclude <path>]...
//! ```
//!
//! Logging goes to stderr; `RUST_LOG` overrides the default `info` filter.

mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{diff::DiffArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "reposync",
    version,
    about = "Copy and render template files into repository checkouts",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Copy (and render) a template file or tree into a destination.
    Sync(SyncArgs),

    /// Show unified diff of what sync would write.
    Diff(DiffArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Diff(args) => args.run(),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
