//! Place document structure for Elasticsearch indexing.

use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

/// Geographic point (lat/lon).
///
/// Values are stored as given; out-of-range coordinates are not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A place record, indexed under its `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Stable external identifier, used as the document `_id`
    pub id: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    /// Indexed as `geo_point`
    pub location: GeoPoint,
}

impl Place {
    pub fn new(id: impl Into<String>, name: impl Into<String>, location: GeoPoint) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: String::new(),
            phone: String::new(),
            location,
        }
    }

    /// Haversine ("arc") distance to `point` in kilometres.
    pub fn distance_km(&self, point: GeoPoint) -> f64 {
        Haversine.distance(Point::from(self.location), Point::from(point)) / 1000.0
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(p: GeoPoint) -> Self {
        Point::new(p.lon, p.lat)
    }
}
