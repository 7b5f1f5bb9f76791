//! One-shot ingestion of a places file into a [`PlaceStore`].

mod parser;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::store::{BulkPolicy, BulkReport, PlaceStore};

pub use parser::{parse_places, parse_places_file, place_from_record};

/// Parse `path` and write every place to `store` in a single bulk request.
///
/// Parsing finishes before anything is written.
pub async fn load_file(
    store: &dyn PlaceStore,
    path: &Path,
    policy: BulkPolicy,
) -> Result<BulkReport> {
    let owned: PathBuf = path.to_path_buf();
    let places = tokio::task::spawn_blocking(move || parse_places_file(&owned))
        .await
        .context("Parser task panicked")??;

    let report = store
        .bulk_upsert(&places, policy)
        .await
        .context("Bulk write failed")?;

    if report.is_complete() {
        info!("Loaded {} places", report.submitted);
    } else {
        warn!(
            "Loaded {} of {} places ({} rejected)",
            report.indexed(),
            report.submitted,
            report.failed
        );
    }

    Ok(report)
}
