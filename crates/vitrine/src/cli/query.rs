//! The `vitrine query` command: category-filtered metadata queries.

use clap::Args;

use vitrine_core::{Config, MediaService, RecordFilter};

/// Arguments for the `query` command.
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Filter by top-level category
    #[arg(short, long)]
    pub category: Option<String>,

    /// Filter by subcategory
    #[arg(short, long)]
    pub subcategory: Option<String>,

    /// Filter by sub-subcategory
    #[arg(long)]
    pub sub_subcategory: Option<String>,

    /// Maximum number of records to return
    #[arg(short, long)]
    pub limit: Option<u32>,
}

/// Execute the query command. Prints one JSON record per line, newest
/// first, with blob ids rendered as opaque strings.
pub async fn execute(args: QueryArgs, config: &Config) -> anyhow::Result<()> {
    let (store, index) = super::connect(config).await?;
    let service = MediaService::new(store, index);

    let filter = RecordFilter {
        category: args.category,
        subcategory: args.subcategory,
        sub_subcategory: args.sub_subcategory,
        limit: args.limit,
    };

    let records = service.query(&filter).await?;
    for record in &records {
        println!("{}", serde_json::to_string(record)?);
    }
    tracing::debug!(count = records.len(), "Query complete");
    Ok(())
}
