//! Elasticsearch index schema management.

use std::path::Path;

use anyhow::{Context, Result};
use elasticsearch::indices::{IndicesCreateParts, IndicesExistsParts, IndicesPutSettingsParts};
use serde_json::json;
use tracing::{info, warn};

use super::EsClient;
use crate::store::{StoreError, MAX_RESULT_WINDOW};

/// Schema JSON embedded at compile time
const PLACES_MAPPING: &str = include_str!("../../schema/places_mapping.json");

/// Read the index mapping from `path`, or use the embedded one.
pub fn load_mapping(path: Option<&Path>) -> Result<serde_json::Value> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read mapping file {}", path.display()))?,
        None => PLACES_MAPPING.to_string(),
    };

    serde_json::from_str(&raw).context("Failed to parse places mapping")
}

/// Index settings allowing deep pagination
pub fn result_window_settings() -> serde_json::Value {
    json!({
        "index": {
            "max_result_window": MAX_RESULT_WINDOW
        }
    })
}

/// Create the places index with `mapping` unless it already exists.
///
/// A freshly created index also gets its result window raised to
/// [`MAX_RESULT_WINDOW`].
pub async fn ensure_index(client: &EsClient, mapping: &serde_json::Value) -> Result<(), StoreError> {
    let es = client.client();
    let index_name = client.index_name.as_str();

    let exists = es
        .indices()
        .exists(IndicesExistsParts::Index(&[index_name]))
        .send()
        .await?
        .status_code()
        .is_success();

    if exists {
        info!("Index {} already exists, skipping creation", index_name);
        return Ok(());
    }

    info!("Creating index: {}", index_name);
    let response = es
        .indices()
        .create(IndicesCreateParts::Index(index_name))
        .body(mapping.clone())
        .send()
        .await?;

    let status = response.status_code();
    if !status.is_success() {
        return Err(StoreError::Rejected {
            status: status.as_u16(),
            body: response.text().await?,
        });
    }

    let body = response.json::<serde_json::Value>().await?;
    if !body["acknowledged"].as_bool().unwrap_or(false) {
        warn!("Index creation for {} was not acknowledged", index_name);
    }

    let response = es
        .indices()
        .put_settings(IndicesPutSettingsParts::Index(&[index_name]))
        .body(result_window_settings())
        .send()
        .await?;

    let status = response.status_code();
    if !status.is_success() {
        return Err(StoreError::Rejected {
            status: status.as_u16(),
            body: response.text().await?,
        });
    }

    info!("Index {} created successfully", index_name);
    Ok(())
}
