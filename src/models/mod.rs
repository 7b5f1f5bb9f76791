//! Core data models for the places service.

pub mod page;
pub mod place;

pub use page::{PlacesPage, Recommendation, PAGE_SIZE};
pub use place::{GeoPoint, Place};
