//! In-process store used for tests and for running without Elasticsearch.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{BulkPolicy, BulkReport, PlaceStore, StoreError, MAX_RESULT_WINDOW};
use crate::models::{GeoPoint, Place};

#[derive(Default)]
struct Documents {
    places: Vec<Place>,
    /// Position of each id in `places`
    by_id: HashMap<String, usize>,
}

impl Documents {
    fn upsert(&mut self, place: &Place) {
        if let Some(&pos) = self.by_id.get(&place.id) {
            self.places[pos] = place.clone();
            return;
        }
        self.by_id.insert(place.id.clone(), self.places.len());
        self.places.push(place.clone());
    }
}

/// Insertion-ordered place store keyed by id.
#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<Documents>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a single document by id
    pub fn get(&self, id: &str) -> Option<Place> {
        let docs = self.read();
        docs.by_id.get(id).map(|&pos| docs.places[pos].clone())
    }

    fn read(&self) -> RwLockReadGuard<'_, Documents> {
        self.docs.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Documents> {
        self.docs.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl PlaceStore for MemoryStore {
    async fn ensure_index(&self, _mapping: &serde_json::Value) -> Result<(), StoreError> {
        debug!("In-memory store needs no index");
        Ok(())
    }

    async fn bulk_upsert(
        &self,
        places: &[Place],
        policy: BulkPolicy,
    ) -> Result<BulkReport, StoreError> {
        let mut report = BulkReport {
            submitted: places.len(),
            failed: 0,
        };

        let mut docs = self.write();
        for place in places {
            // Same rule as Elasticsearch: an explicit _id must not be empty
            if place.id.is_empty() {
                warn!("Failed to index document: empty id");
                report.failed += 1;
                continue;
            }
            docs.upsert(place);
        }

        report.check(policy)
    }

    async fn list(&self, limit: usize, offset: usize) -> Result<(Vec<Place>, u64), StoreError> {
        if offset
            .checked_add(limit)
            .map_or(true, |end| end > MAX_RESULT_WINDOW)
        {
            return Err(StoreError::ResultWindow {
                offset,
                window: MAX_RESULT_WINDOW,
            });
        }

        let docs = self.read();
        let page = docs.places.iter().skip(offset).take(limit).cloned().collect();
        Ok((page, docs.places.len() as u64))
    }

    async fn nearest(&self, lat: f64, lon: f64, size: usize) -> Result<Vec<Place>, StoreError> {
        let origin = GeoPoint::new(lat, lon);

        let mut by_distance: Vec<(f64, Place)> = self
            .read()
            .places
            .iter()
            .map(|p| (p.distance_km(origin), p.clone()))
            .collect();
        by_distance.sort_by(|a, b| a.0.total_cmp(&b.0));

        Ok(by_distance
            .into_iter()
            .take(size)
            .map(|(_, place)| place)
            .collect())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.read().places.len() as u64)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(id: &str, lat: f64, lon: f64) -> Place {
        Place::new(id, format!("Place {}", id), GeoPoint::new(lat, lon))
    }

    #[tokio::test]
    async fn test_upsert_overwrites_same_id() {
        let store = MemoryStore::new();
        store
            .bulk_upsert(&[place("1", 1.0, 1.0), place("2", 2.0, 2.0)], BulkPolicy::BestEffort)
            .await
            .unwrap();

        let mut renamed = place("1", 1.0, 1.0);
        renamed.name = "Renamed".to_string();
        store
            .bulk_upsert(&[renamed], BulkPolicy::BestEffort)
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 2);
        assert_eq!(store.get("1").unwrap().name, "Renamed");

        // Overwrite keeps the first insert position
        let (listed, _) = store.list(10, 0).await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert!(store.get("3").is_none());
    }

    #[tokio::test]
    async fn test_empty_id_is_a_failed_item() {
        let store = MemoryStore::new();
        let report = store
            .bulk_upsert(&[place("", 0.0, 0.0), place("1", 0.0, 0.0)], BulkPolicy::BestEffort)
            .await
            .unwrap();
        assert_eq!(report, BulkReport { submitted: 2, failed: 1 });

        let err = store
            .bulk_upsert(&[place("", 0.0, 0.0)], BulkPolicy::FailFast)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::PartialBulk { failed: 1, total: 1 }));
    }

    #[tokio::test]
    async fn test_nearest_sorted_by_distance() {
        let store = MemoryStore::new();
        store
            .bulk_upsert(
                &[
                    place("far", 10.0, 10.0),
                    place("near", 0.1, 0.1),
                    place("mid", 1.0, 1.0),
                    place("farther", 20.0, 20.0),
                ],
                BulkPolicy::BestEffort,
            )
            .await
            .unwrap();

        let ids: Vec<String> = store
            .nearest(0.0, 0.0, 3)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["near", "mid", "far"]);
    }

    #[tokio::test]
    async fn test_list_past_result_window() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.list(10, MAX_RESULT_WINDOW).await,
            Err(StoreError::ResultWindow { .. })
        ));
        assert!(matches!(
            store.list(10, usize::MAX).await,
            Err(StoreError::ResultWindow { .. })
        ));
    }
}
