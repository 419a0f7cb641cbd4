//! Coordinates and bounding boxes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// An axis-aligned latitude/longitude box; all bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    #[must_use]
    pub fn is_inside(&self, bounds: &BoundingBox) -> bool {
        (bounds.min_lat..=bounds.max_lat).contains(&self.latitude)
            && (bounds.min_lon..=bounds.max_lon).contains(&self.longitude)
    }
}
