//! Storage port for place documents.
//!
//! Handlers and the loader only see [`PlaceStore`]; the Elasticsearch
//! gateway and the in-memory store are interchangeable behind it.

mod memory;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::models::Place;

pub use memory::MemoryStore;

/// Maximum number of results a listing may page through
pub const MAX_RESULT_WINDOW: usize = 20_000;

/// Number of places returned by a recommendation
pub const RECOMMENDATION_SIZE: usize = 3;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid store url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("store transport failed: {0}")]
    Transport(String),

    #[error("store rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("malformed store response: {0}")]
    Malformed(String),

    #[error("bulk write failed for {failed} of {total} documents")]
    PartialBulk { failed: usize, total: usize },

    #[error("offset {offset} exceeds result window of {window}")]
    ResultWindow { offset: usize, window: usize },
}

impl From<elasticsearch::Error> for StoreError {
    fn from(err: elasticsearch::Error) -> Self {
        StoreError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Malformed(err.to_string())
    }
}

/// What to do when some items of a bulk write are rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkPolicy {
    /// Log rejected items and report them in [`BulkReport`]
    #[default]
    BestEffort,
    /// Fail the whole write when any item is rejected
    FailFast,
}

impl std::str::FromStr for BulkPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "best_effort" | "best-effort" => Ok(BulkPolicy::BestEffort),
            "fail_fast" | "fail-fast" => Ok(BulkPolicy::FailFast),
            other => Err(format!("unknown bulk policy: {}", other)),
        }
    }
}

/// Outcome of one bulk write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BulkReport {
    pub submitted: usize,
    pub failed: usize,
}

impl BulkReport {
    pub fn indexed(&self) -> usize {
        self.submitted - self.failed
    }

    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }

    /// Apply `policy` to this report
    pub fn check(self, policy: BulkPolicy) -> Result<Self, StoreError> {
        match policy {
            BulkPolicy::FailFast if !self.is_complete() => Err(StoreError::PartialBulk {
                failed: self.failed,
                total: self.submitted,
            }),
            _ => Ok(self),
        }
    }
}

/// Backing store for place documents.
#[async_trait]
pub trait PlaceStore: Send + Sync {
    /// Create the index from `mapping` unless it already exists.
    async fn ensure_index(&self, mapping: &serde_json::Value) -> Result<(), StoreError>;

    /// Upsert `places` keyed by id in a single batch.
    async fn bulk_upsert(
        &self,
        places: &[Place],
        policy: BulkPolicy,
    ) -> Result<BulkReport, StoreError>;

    /// A page of places in store order plus the total document count.
    ///
    /// The two values come from separate reads and are not consistent with
    /// each other under concurrent writes.
    async fn list(&self, limit: usize, offset: usize) -> Result<(Vec<Place>, u64), StoreError>;

    /// Up to `size` places ordered by ascending arc distance from the point.
    async fn nearest(&self, lat: f64, lon: f64, size: usize) -> Result<Vec<Place>, StoreError>;

    /// Total number of documents
    async fn count(&self) -> Result<u64, StoreError>;

    /// Whether the backend is reachable and healthy
    async fn health_check(&self) -> Result<bool, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_effort_keeps_partial_report() {
        let report = BulkReport {
            submitted: 5,
            failed: 2,
        };
        let checked = report.check(BulkPolicy::BestEffort).unwrap();
        assert_eq!(checked.indexed(), 3);
        assert!(!checked.is_complete());
    }

    #[test]
    fn test_fail_fast_rejects_partial_report() {
        let report = BulkReport {
            submitted: 5,
            failed: 1,
        };
        match report.check(BulkPolicy::FailFast) {
            Err(StoreError::PartialBulk { failed, total }) => {
                assert_eq!(failed, 1);
                assert_eq!(total, 5);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_fail_fast_accepts_complete_report() {
        let report = BulkReport {
            submitted: 5,
            failed: 0,
        };
        assert_eq!(report.check(BulkPolicy::FailFast).unwrap(), report);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("fail-fast".parse::<BulkPolicy>().unwrap(), BulkPolicy::FailFast);
        assert_eq!("best_effort".parse::<BulkPolicy>().unwrap(), BulkPolicy::BestEffort);
        assert!("retry".parse::<BulkPolicy>().is_err());
    }
}
