//! Places server.
//!
//! Ensures the index exists, loads the places file, then serves the
//! listing, recommendation and token endpoints.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use places::api::{build_router, AppState, PageTemplate};
use places::auth::JwtConfig;
use places::config::Config;
use places::elasticsearch::{load_mapping, EsClient, EsPlaceStore};
use places::loader::load_file;
use places::store::{BulkPolicy, MemoryStore, PlaceStore};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Environment variable holding the token signing secret
const SIGNING_KEY_VAR: &str = "MY_SIGNING_KEY";

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Places listing and recommendation server")]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address
    #[arg(short, long)]
    listen: Option<String>,

    /// Elasticsearch URL
    #[arg(long)]
    es_url: Option<String>,

    /// Elasticsearch index name
    #[arg(long)]
    index: Option<String>,

    /// Index mapping document
    #[arg(long)]
    schema: Option<PathBuf>,

    /// HTML template for the listing page
    #[arg(long)]
    template: Option<PathBuf>,

    /// Tab-separated places file loaded at startup
    #[arg(long)]
    data: Option<PathBuf>,

    /// Bulk failure policy: best_effort or fail_fast
    #[arg(long)]
    bulk_policy: Option<BulkPolicy>,

    /// Skip loading the places file
    #[arg(long)]
    no_load: bool,

    /// Keep places in process memory instead of Elasticsearch
    #[arg(long)]
    in_memory: bool,
}

impl Args {
    fn apply(self, mut config: Config) -> Config {
        if let Some(listen) = self.listen {
            config.server.listen = listen;
        }
        if let Some(url) = self.es_url {
            config.elasticsearch.url = url;
        }
        if let Some(index) = self.index {
            config.elasticsearch.index = index;
        }
        if self.schema.is_some() {
            config.elasticsearch.schema = self.schema;
        }
        if self.template.is_some() {
            config.server.template = self.template;
        }
        if let Some(data) = self.data {
            config.ingest.data_file = data;
        }
        if let Some(policy) = self.bulk_policy {
            config.ingest.bulk_policy = policy;
        }
        if self.no_load {
            config.ingest.load_on_start = false;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let in_memory = args.in_memory;
    let config = Config::load(args.config.as_deref())?;
    let config = args.apply(config);

    let secret = std::env::var(SIGNING_KEY_VAR).unwrap_or_default();
    let jwt = JwtConfig::from_secret(secret.as_bytes())
        .with_context(|| format!("{} environment variable is not set", SIGNING_KEY_VAR))?;

    let template = PageTemplate::load(config.server.template.as_deref())?;
    let mapping = load_mapping(config.elasticsearch.schema.as_deref())?;

    info!("Places Server");

    let store: Arc<dyn PlaceStore> = if in_memory {
        warn!("Using in-memory store, nothing will be persisted");
        Arc::new(MemoryStore::new())
    } else {
        info!("Connecting to Elasticsearch at {}", config.elasticsearch.url);
        let client = EsClient::new(&config.elasticsearch.url, &config.elasticsearch.index)
            .context("Failed to create Elasticsearch client")?;

        if !client.health_check().await? {
            anyhow::bail!("Elasticsearch cluster is not healthy");
        }
        Arc::new(EsPlaceStore::new(client))
    };

    store
        .ensure_index(&mapping)
        .await
        .context("Failed to create index")?;

    if config.ingest.load_on_start {
        match load_file(
            store.as_ref(),
            &config.ingest.data_file,
            config.ingest.bulk_policy,
        )
        .await
        {
            Ok(report) => info!(
                "Startup load finished: {} indexed, {} failed",
                report.indexed(),
                report.failed
            ),
            Err(e) => error!("Startup load failed: {:?}", e),
        }
    }

    let doc_count = store.count().await?;
    info!(
        "Serving index '{}' with {} documents",
        config.elasticsearch.index, doc_count
    );

    let app = build_router(AppState {
        store,
        credentials: Arc::new(config.credentials()),
        jwt,
        template,
    });

    info!("Starting server on {}", config.server.listen);

    let listener = tokio::net::TcpListener::bind(&config.server.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
