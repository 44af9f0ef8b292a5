//! The `vitrine fetch` command: stream a stored blob by id.

use clap::Args;
use std::io::Write;
use std::path::PathBuf;

use vitrine_core::{Config, MediaService};

/// Arguments for the `fetch` command.
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Blob id to fetch
    #[arg(required = true)]
    pub id: String,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute the fetch command, streaming the blob chunk by chunk.
pub async fn execute(args: FetchArgs, config: &Config) -> anyhow::Result<()> {
    let (store, index) = super::connect(config).await?;
    let service = MediaService::new(store, index);

    let (blob, mut stream) = service.open_blob(&args.id).await?;
    tracing::debug!(
        id = %blob.id,
        file = %blob.file_name,
        content_type = %blob.content_type,
        length = blob.length,
        "Fetching blob"
    );

    match args.output {
        Some(path) => {
            let mut file = std::fs::File::create(&path)?;
            while let Some(chunk) = stream.next_chunk().await? {
                file.write_all(&chunk)?;
            }
            file.flush()?;
            eprintln!("Wrote {} bytes to {}", blob.length, path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            while let Some(chunk) = stream.next_chunk().await? {
                out.write_all(&chunk)?;
            }
            out.flush()?;
        }
    }
    Ok(())
}
