//! Database metadata collection tool.
//!
//! This binary connects to a database, reads the column/key, stored
//! procedure and view catalogs, and writes them to a JSON snapshot that the
//! `schemascribe` renderer turns into Markdown.
//!
//! # Security Guarantees
//! - Read-only database sessions only
//! - No credentials stored or logged
//! - Offline rendering after collection

use clap::{Args, Parser, Subcommand};
use schemascribe_collect::{ConnectionArgs, save_snapshot, snapshot_summary};
use schemascribe_core::{Result, adapters::create_source, error::redact_database_url, init_logging};
use std::path::PathBuf;
use tracing::{error, info};

const DEFAULT_SNAPSHOT: &str = "schema.snapshot.json";

#[derive(Parser)]
#[command(name = "schemascribe-collect")]
#[command(about = "Database metadata collection tool")]
#[command(version)]
#[command(long_about = "
SchemaScribe Collector - read-only database metadata collection

Reads column and key metadata, stored procedure names and view/table usage
from INFORMATION_SCHEMA and writes a JSON snapshot for `schemascribe render`.

CONNECTION:
  --database-url / DATABASE_URL, or the parts DB_HOST, DB_PORT, DB_USER,
  DB_PASSWORD and DB_DATABASE.

EXAMPLES:
  schemascribe-collect collect --database-url mysql://reader@localhost/shop
  DB_DATABASE=shop DB_USER=reader schemascribe-collect collect -o shop.json
  schemascribe-collect test
")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Collect metadata and write a snapshot
    Collect(CollectArgs),
    /// Test database connection
    Test,
}

#[derive(Args)]
struct CollectArgs {
    /// Output file path
    #[arg(
        short,
        long,
        default_value = DEFAULT_SNAPSHOT,
        help = "Snapshot output path (.json)"
    )]
    output: PathBuf,
}

#[derive(Args)]
struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true, help = "Suppress all output except errors")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet)?;

    let database_url = cli.connection.resolve_url()?;

    match &cli.command {
        Command::Collect(args) => collect_snapshot(&database_url, &args.output).await,
        Command::Test => test_connection(&database_url).await,
    }
}

/// Tests database connection without collecting metadata
async fn test_connection(database_url: &str) -> Result<()> {
    info!("Testing database connection...");
    info!("Target: {}", redact_database_url(database_url));

    let source = create_source(database_url).await.map_err(|e| {
        error!("Failed to create metadata source: {}", e);
        e
    })?;

    source.test_connection().await.map_err(|e| {
        error!("Connection test failed: {}", e);
        e
    })?;

    info!("Connection test successful");
    println!(
        "Connection to {} database '{}' successful",
        source.engine_label(),
        source.database_name()
    );

    Ok(())
}

/// Collects metadata and saves the snapshot
async fn collect_snapshot(database_url: &str, output_path: &PathBuf) -> Result<()> {
    info!("Starting metadata collection...");
    info!("Target: {}", redact_database_url(database_url));
    info!("Output: {}", output_path.display());

    let source = create_source(database_url).await.map_err(|e| {
        error!("Failed to create metadata source: {}", e);
        e
    })?;

    let snapshot = source.collect_snapshot().await.map_err(|e| {
        error!("Metadata collection failed: {}", e);
        e
    })?;

    save_snapshot(&snapshot, output_path).await?;

    info!("Snapshot saved to {}", output_path.display());
    println!("Metadata collection completed successfully");
    println!("Output: {}", output_path.display());
    println!("{}", snapshot_summary(&snapshot));

    Ok(())
}
