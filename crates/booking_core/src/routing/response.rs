use serde::Deserialize;

use super::RoutingError;
use crate::geo::RouteGeometry;

#[derive(Deserialize)]
pub(super) struct RoutingResponse {
    #[serde(default)]
    pub(super) features: Vec<RouteFeature>,
}

#[derive(Deserialize)]
pub(super) struct RouteFeature {
    pub(super) geometry: Option<GeometryPayload>,
    #[serde(default)]
    pub(super) properties: RouteProperties,
}

#[derive(Deserialize, Default)]
pub(super) struct RouteProperties {
    /// Trip distance in meters.
    pub(super) distance: Option<f64>,
}

/// GeoJSON geometry as the routing collaborator emits it: coordinates in
/// `[lon, lat]` order, either one segment or several.
#[derive(Deserialize)]
#[serde(tag = "type")]
pub(super) enum GeometryPayload {
    LineString { coordinates: Vec<[f64; 2]> },
    MultiLineString { coordinates: Vec<Vec<[f64; 2]>> },
}

/// Normalize a routing response into a single ordered `(lat, lon)` path
/// plus a positive distance in kilometres.
pub(super) fn normalize(response: RoutingResponse) -> Result<RouteGeometry, RoutingError> {
    let feature = response.features.into_iter().next().ok_or(RoutingError::NoRoute)?;
    let geometry = feature.geometry.ok_or(RoutingError::NoRoute)?;

    let segment = match geometry {
        GeometryPayload::LineString { coordinates } => coordinates,
        // Take the first segment when the engine splits the path.
        GeometryPayload::MultiLineString { coordinates } => {
            coordinates.into_iter().next().ok_or(RoutingError::NoRoute)?
        }
    };
    if segment.is_empty() {
        return Err(RoutingError::NoRoute);
    }

    let waypoints: Vec<(f64, f64)> = segment.iter().map(|c| (c[1], c[0])).collect();

    let distance_m = feature.properties.distance.unwrap_or(0.0);
    if !distance_m.is_finite() || distance_m <= 0.0 {
        return Err(RoutingError::NoRoute);
    }

    Ok(RouteGeometry {
        waypoints,
        distance_km: distance_m / 1_000.0,
    })
}
