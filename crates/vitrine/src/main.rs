//! Vitrine CLI - image ingestion into a chunked blob store with a
//! category-filtered metadata index.
//!
//! # Usage
//!
//! ```bash
//! # Ingest a category tree of images
//! vitrine ingest ./photos/
//!
//! # Query metadata records
//! vitrine query --category Ribbons --limit 10
//!
//! # Stream a stored blob to stdout
//! vitrine fetch 0123456789abcdef0123456789abcdef > thumb.jpg
//!
//! # View configuration
//! vitrine config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Vitrine - image ingestion pipeline with a chunked blob store.
#[derive(Parser, Debug)]
#[command(name = "vitrine")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest a directory tree of images
    Ingest(cli::ingest::IngestArgs),

    /// Query metadata records by category hierarchy
    Query(cli::query::QueryArgs),

    /// Stream a stored blob by id
    Fetch(cli::fetch::FetchArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging from config, with CLI verbose override.
    // Note: logging isn't initialized yet, so use eprintln for config warnings.
    let config = match vitrine_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `vitrine config path`."
            );
            vitrine_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Vitrine v{}", vitrine_core::VERSION);

    // Dispatch to the appropriate command handler. Any error propagating
    // out of a handler is printed with its full chain and the process
    // exits non-zero.
    match cli.command {
        Commands::Ingest(args) => cli::ingest::execute(args, &config).await,
        Commands::Query(args) => cli::query::execute(args, &config).await,
        Commands::Fetch(args) => cli::fetch::execute(args, &config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
