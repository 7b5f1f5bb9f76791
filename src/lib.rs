//! Places - geo-aware place listing and recommendations on Elasticsearch
//!
//! This library provides shared types and modules for the server and ingest binaries.

pub mod api;
pub mod auth;
pub mod config;
pub mod elasticsearch;
pub mod loader;
pub mod models;
pub mod store;

pub use models::{GeoPoint, Place};
pub use store::{BulkPolicy, BulkReport, PlaceStore, StoreError};
