//! Bulk indexing operations for Elasticsearch.

use elasticsearch::http::request::JsonBody;
use elasticsearch::BulkParts;
use tracing::{debug, info, warn};

use super::EsClient;
use crate::models::Place;
use crate::store::{BulkPolicy, BulkReport, StoreError};

/// Build the NDJSON lines of a bulk request, one `index` action per place.
pub fn bulk_body(places: &[Place]) -> Result<Vec<serde_json::Value>, StoreError> {
    let mut body = Vec::with_capacity(places.len() * 2);

    for place in places {
        // Action line
        body.push(serde_json::json!({
            "index": {
                "_id": &place.id
            }
        }));
        // Document line
        body.push(serde_json::to_value(place)?);
    }

    Ok(body)
}

/// Count and log the rejected items of a bulk response.
pub fn count_failed_items(response_body: &serde_json::Value) -> usize {
    if !response_body["errors"].as_bool().unwrap_or(false) {
        return 0;
    }

    let Some(items) = response_body["items"].as_array() else {
        return 0;
    };

    let mut failed = 0;
    for item in items {
        let Some(ops) = item.as_object() else {
            continue;
        };
        for op in ops.values() {
            if op["error"].is_object() {
                failed += 1;
                warn!(
                    "Failed to index document {}: {}",
                    op["_id"].as_str().unwrap_or("?"),
                    op["error"]["reason"].as_str().unwrap_or("unknown reason")
                );
            }
        }
    }

    failed
}

/// Send all `places` to Elasticsearch as a single bulk request.
pub async fn bulk_index(
    client: &EsClient,
    places: &[Place],
    policy: BulkPolicy,
) -> Result<BulkReport, StoreError> {
    if places.is_empty() {
        return Ok(BulkReport::default());
    }

    let count = places.len();
    debug!("Flushing {} documents to Elasticsearch", count);

    let body: Vec<JsonBody<serde_json::Value>> =
        bulk_body(places)?.into_iter().map(JsonBody::from).collect();

    let response = client
        .client()
        .bulk(BulkParts::Index(&client.index_name))
        .body(body)
        .send()
        .await?;

    let status = response.status_code();
    if !status.is_success() {
        return Err(StoreError::Rejected {
            status: status.as_u16(),
            body: response.text().await?,
        });
    }

    let response_body = response.json::<serde_json::Value>().await?;
    let report = BulkReport {
        submitted: count,
        failed: count_failed_items(&response_body),
    };

    if report.is_complete() {
        info!("Indexed {} documents", count);
    } else {
        warn!(
            "Bulk request had {} errors out of {} documents",
            report.failed, count
        );
    }

    report.check(policy)
}
