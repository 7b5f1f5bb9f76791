//! [`PlaceStore`] backed by Elasticsearch.

use async_trait::async_trait;

use super::bulk::bulk_index;
use super::schema::ensure_index;
use super::search::{execute, list_query, nearest_query};
use super::EsClient;
use crate::models::Place;
use crate::store::{BulkPolicy, BulkReport, PlaceStore, StoreError};

#[derive(Clone)]
pub struct EsPlaceStore {
    client: EsClient,
}

impl EsPlaceStore {
    pub fn new(client: EsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PlaceStore for EsPlaceStore {
    async fn ensure_index(&self, mapping: &serde_json::Value) -> Result<(), StoreError> {
        ensure_index(&self.client, mapping).await
    }

    async fn bulk_upsert(
        &self,
        places: &[Place],
        policy: BulkPolicy,
    ) -> Result<BulkReport, StoreError> {
        bulk_index(&self.client, places, policy).await
    }

    async fn list(&self, limit: usize, offset: usize) -> Result<(Vec<Place>, u64), StoreError> {
        let places = execute(&self.client, list_query(limit, offset)).await?;
        let total = self.client.doc_count().await?;
        Ok((places, total))
    }

    async fn nearest(&self, lat: f64, lon: f64, size: usize) -> Result<Vec<Place>, StoreError> {
        execute(&self.client, nearest_query(lat, lon, size)).await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.client.doc_count().await
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        self.client.health_check().await
    }
}
