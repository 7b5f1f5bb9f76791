//! Load a tab-separated places file into Elasticsearch.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use places::elasticsearch::{load_mapping, EsClient, EsPlaceStore};
use places::loader::load_file;
use places::store::{BulkPolicy, PlaceStore};

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Ingest a places file into Elasticsearch")]
struct Args {
    /// Tab-separated places file
    #[arg(short, long, default_value = "./materials/data.csv")]
    file: PathBuf,

    /// Elasticsearch URL
    #[arg(long, default_value = "http://localhost:9200")]
    es_url: String,

    /// Elasticsearch index name
    #[arg(long, default_value = "places")]
    index: String,

    /// Index mapping document
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Bulk failure policy: best_effort or fail_fast
    #[arg(long, default_value = "best_effort")]
    bulk_policy: BulkPolicy,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    info!("Places Ingest");
    info!("File: {}", args.file.display());

    let client = EsClient::new(&args.es_url, &args.index)
        .context("Failed to connect to Elasticsearch")?;

    if !client.health_check().await? {
        anyhow::bail!("Elasticsearch cluster is not healthy");
    }
    info!("Connected to Elasticsearch");

    let store: Arc<dyn PlaceStore> = Arc::new(EsPlaceStore::new(client));

    let mapping = load_mapping(args.schema.as_deref())?;
    store.ensure_index(&mapping).await?;

    let report = load_file(store.as_ref(), &args.file, args.bulk_policy).await?;
    info!(
        "Indexed {} documents ({} errors)",
        report.indexed(),
        report.failed
    );

    let doc_count = store.count().await?;
    info!("Total documents in index: {}", doc_count);

    Ok(())
}
