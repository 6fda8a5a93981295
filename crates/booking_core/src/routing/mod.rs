//! Route and distance computation between two selected points.
//!
//! The remote engine returns GeoJSON-style geometry in `[lon, lat]` order;
//! this module normalizes single- and multi-segment encodings into one
//! ordered `(lat, lon)` sequence and a scalar distance in kilometres.
//! Absent or malformed geometry is reported as [`RoutingError::NoRoute`],
//! which callers treat as a degraded state rather than a fatal one.

mod client;
mod response;

pub use client::HttpRouteClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::geo::{GeoPoint, RouteGeometry};

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("routing request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("routing service returned status {0}")]
    Status(u16),
    #[error("routing response rejected: {0}")]
    Malformed(String),
    #[error("no drivable route between the selected points")]
    NoRoute,
}

/// Collaborator seam for routing backends.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Compute a drivable route between two points.
    async fn route(
        &self,
        pickup: &GeoPoint,
        dropoff: &GeoPoint,
    ) -> Result<RouteGeometry, RoutingError>;
}
