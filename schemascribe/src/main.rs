//! Schema documentation generator.
//!
//! Turns a snapshot written by `schemascribe-collect` into a Markdown schema
//! document with collapsible table and procedure blocks, then writes an index
//! mapping each block to its line range in the document.

use clap::{Args, Parser, Subcommand};
use schemascribe::{
    DEFAULT_DOCUMENT, DEFAULT_SNAPSHOT, IndexFormat, RenderOptions, default_index_path,
    document_identity, load_snapshot, write_document, write_index,
};
use schemascribe_core::{Result, error::ScribeError, init_logging};
use std::path::PathBuf;
use tracing::{error, info};

/// Command-line interface for the schema document generator
#[derive(Parser)]
#[command(name = "schemascribe")]
#[command(about = "Markdown schema document and index generator")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a snapshot to Markdown and index it
    Render(RenderArgs),
    /// Regenerate the index for an existing document
    Index(IndexArgs),
}

#[derive(Args)]
struct RenderArgs {
    /// Snapshot written by schemascribe-collect
    #[arg(default_value = DEFAULT_SNAPSHOT)]
    input: PathBuf,

    /// Markdown output path
    #[arg(short, long, default_value = DEFAULT_DOCUMENT)]
    output: PathBuf,

    #[command(flatten)]
    index: IndexTarget,

    /// Omit the database views section
    #[arg(long)]
    no_views: bool,

    /// Externally produced view analysis, appended when the file exists
    #[arg(long, value_name = "FILE")]
    view_analysis: Option<PathBuf>,

    /// Engine label used in headings (taken from the snapshot by default)
    #[arg(long)]
    engine: Option<String>,
}

#[derive(Args)]
struct IndexArgs {
    /// Markdown document to index
    #[arg(default_value = DEFAULT_DOCUMENT)]
    document: PathBuf,

    #[command(flatten)]
    index: IndexTarget,

    /// Engine label for the index title (read from the document by default)
    #[arg(long)]
    engine: Option<String>,

    /// Database name for the index description (read from the document by default)
    #[arg(long)]
    database: Option<String>,
}

#[derive(Args)]
struct IndexTarget {
    /// Index output path (defaults to "<document stem> Index.<ext>")
    #[arg(long = "index", value_name = "FILE")]
    path: Option<PathBuf>,

    /// Index output format
    #[arg(long = "index-format", value_enum, default_value_t = IndexFormat::Yaml)]
    format: IndexFormat,
}

impl IndexTarget {
    fn resolve(&self, document: &std::path::Path) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| default_index_path(document, self.format))
    }
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

    let result = match &cli.command {
        Command::Render(args) => render(args).await,
        Command::Index(args) => index(args).await,
    };
    result.map_err(|e| {
        error!("{}", e);
        e
    })
}

async fn render(args: &RenderArgs) -> Result<()> {
    info!("Loading snapshot from {}", args.input.display());
    let snapshot = load_snapshot(&args.input).await?;

    let engine = args
        .engine
        .clone()
        .unwrap_or_else(|| snapshot.engine.clone());
    let options = RenderOptions {
        output: args.output.clone(),
        engine: Some(engine.clone()),
        include_views: !args.no_views,
        view_analysis: args.view_analysis.clone(),
    };
    let stats = write_document(&snapshot, &options).await?;

    let index_path = args.index.resolve(&args.output);
    let index = write_index(
        &args.output,
        &index_path,
        args.index.format,
        &engine,
        &snapshot.database,
    )
    .await?;

    println!("Schema document: {}", args.output.display());
    println!("Index: {}", index_path.display());
    println!(
        "Tables: {} | Foreign keys: {} | Procedures: {} | Views: {} | Indexed blocks: {}",
        stats.tables,
        stats.unique_foreign_keys,
        stats.procedures,
        stats.views,
        index.block_count()
    );
    Ok(())
}

async fn index(args: &IndexArgs) -> Result<()> {
    let (engine, database) = match (&args.engine, &args.database) {
        (Some(engine), Some(database)) => (engine.clone(), database.clone()),
        (engine, database) => {
            let document = tokio::fs::read_to_string(&args.document)
                .await
                .map_err(|e| {
                    ScribeError::io(format!("Failed to read {}", args.document.display()), e)
                })?;
            let (found_engine, found_database) = document_identity(&document).ok_or_else(|| {
                ScribeError::configuration(
                    "Document has no table schema heading; pass --engine and --database",
                )
            })?;
            (
                engine.clone().unwrap_or(found_engine),
                database.clone().unwrap_or(found_database),
            )
        }
    };

    let index_path = args.index.resolve(&args.document);
    let index = write_index(
        &args.document,
        &index_path,
        args.index.format,
        &engine,
        &database,
    )
    .await?;

    println!("Index: {}", index_path.display());
    println!("Indexed blocks: {}", index.block_count());
    Ok(())
}
