//! Search query building and execution.

use serde_json::json;
use tracing::{debug, warn};

use super::EsClient;
use crate::models::Place;
use crate::store::StoreError;

/// Unsorted page of documents in index order
pub fn list_query(limit: usize, offset: usize) -> serde_json::Value {
    json!({
        "query": { "match_all": {} },
        "from": offset,
        "size": limit
    })
}

/// Closest documents to a point by arc distance, nearest first.
///
/// Documents without a mapped `location` are ignored for sorting.
pub fn nearest_query(lat: f64, lon: f64, size: usize) -> serde_json::Value {
    json!({
        "query": { "match_all": {} },
        "sort": [
            {
                "_geo_distance": {
                    "location": { "lat": lat, "lon": lon },
                    "order": "asc",
                    "unit": "km",
                    "distance_type": "arc",
                    "ignore_unmapped": true
                }
            }
        ],
        "size": size
    })
}

/// Decode hit sources into places, skipping any that do not fit.
pub fn parse_hits(response_body: &serde_json::Value) -> Vec<Place> {
    let Some(hits) = response_body["hits"]["hits"].as_array() else {
        return Vec::new();
    };

    hits.iter()
        .filter_map(|hit| {
            match serde_json::from_value::<Place>(hit["_source"].clone()) {
                Ok(place) => Some(place),
                Err(e) => {
                    warn!(
                        "Error decoding hit {}: {}",
                        hit["_id"].as_str().unwrap_or("?"),
                        e
                    );
                    None
                }
            }
        })
        .collect()
}

/// Run a search body against the client's index
pub async fn execute(client: &EsClient, body: serde_json::Value) -> Result<Vec<Place>, StoreError> {
    debug!("Search query: {}", body);

    let response = client
        .client()
        .search(elasticsearch::SearchParts::Index(&[client.index_name.as_str()]))
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
    Ok(parse_hits(&response_body))
}
