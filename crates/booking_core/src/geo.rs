//! Geographic value types shared across the booking flow.

use serde::{Deserialize, Serialize};

/// A labeled geographic coordinate, as produced by the address resolver or
/// the driver-position feed. Passed by value; never mutated after selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub label: String,
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(label: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            label: label.into(),
            lat,
            lon,
        }
    }
}

/// A drivable path between two points: ordered `(lat, lon)` waypoints plus
/// the road-network distance in kilometres. Replaced wholesale when either
/// endpoint changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteGeometry {
    pub waypoints: Vec<(f64, f64)>,
    pub distance_km: f64,
}

impl RouteGeometry {
    /// First waypoint of the path, if any.
    pub fn start(&self) -> Option<(f64, f64)> {
        self.waypoints.first().copied()
    }

    /// Last waypoint of the path, if any.
    pub fn end(&self) -> Option<(f64, f64)> {
        self.waypoints.last().copied()
    }
}
