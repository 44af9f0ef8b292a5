//! The `vitrine ingest` command: run-to-completion ingestion of a
//! category tree.

use clap::Args;
use std::path::PathBuf;

use vitrine_core::{Config, Ingestor};

/// Arguments for the `ingest` command.
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Root directory of the category tree
    #[arg(required = true, env = "VITRINE_ROOT")]
    pub root: PathBuf,
}

/// Execute the ingest command.
///
/// Exit status is 0 only on full success; unreadable files are skipped
/// and counted, any other failure propagates and exits non-zero.
pub async fn execute(args: IngestArgs, config: &Config) -> anyhow::Result<()> {
    let (store, index) = super::connect(config).await?;
    let ingestor = Ingestor::new(config, store, index);

    let stats = ingestor.run(&args.root).await?;

    println!(
        "Ingested {} images ({} skipped)",
        stats.ingested, stats.skipped
    );
    Ok(())
}
