//! Typed client surface for the ride-state service.
//!
//! The Ride entity is server-owned; this side holds only the most recently
//! fetched snapshot. Deserialization is strict: a snapshot missing a
//! required field is rejected as malformed rather than rendered with holes.

mod client;

pub use client::HttpRideService;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::geo::GeoPoint;
use crate::proposal::TripProposal;

#[derive(Debug, Error)]
pub enum RideServiceError {
    #[error("ride service request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("ride service returned status {0}")]
    Status(u16),
    #[error("ride snapshot rejected: {0}")]
    Malformed(String),
}

/// Opaque server-assigned ride identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RideId(pub String);

impl fmt::Display for RideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for RideId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Ride lifecycle status. `completed` and `cancelled` are terminal.
///
/// The service's historical emitters disagree on casing (`"BOOKED"` vs
/// `"booked"`), so parsing is case-insensitive; serialization is lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RideStatus {
    Booked,
    Ongoing,
    Completed,
    Cancelled,
}

impl RideStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RideStatus::Completed | RideStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RideStatus::Booked => "booked",
            RideStatus::Ongoing => "ongoing",
            RideStatus::Completed => "completed",
            RideStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RideStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let status = [
            RideStatus::Booked,
            RideStatus::Ongoing,
            RideStatus::Completed,
            RideStatus::Cancelled,
        ]
        .into_iter()
        .find(|status| s.eq_ignore_ascii_case(status.as_str()));
        status.ok_or_else(|| format!("unknown ride status {s:?}"))
    }
}

impl Serialize for RideStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RideStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

/// Assigned driver, present once the ride leaves `booked`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub name: String,
    pub car_number: String,
    pub lat: f64,
    pub lon: f64,
}

/// The full ride snapshot as last fetched. Replaced wholesale on every
/// poll tick, never merged field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    #[serde(alias = "_id")]
    pub id: RideId,
    pub user_id: String,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub distance_km: f64,
    pub car_type: String,
    pub price: f64,
    pub status: RideStatus,
    #[serde(default)]
    pub driver: Option<Driver>,
    pub payment_ref: String,
}

/// Creation payload for a freshly paid booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRide {
    pub user_id: String,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub distance_km: f64,
    pub car_type: String,
    pub price: f64,
    pub status: RideStatus,
    pub payment_ref: String,
}

impl NewRide {
    /// Assemble the creation payload from a paid proposal.
    pub fn from_proposal(user_id: &str, proposal: &TripProposal, payment_ref: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            pickup: proposal.pickup.clone(),
            dropoff: proposal.dropoff.clone(),
            distance_km: proposal.distance_km,
            car_type: proposal.car_type.clone(),
            price: proposal.amount,
            status: RideStatus::Booked,
            payment_ref: payment_ref.to_string(),
        }
    }
}

/// Collaborator seam for the ride-state service.
#[async_trait]
pub trait RideService: Send + Sync {
    /// Persist a new ride. Called exactly once per confirmed payment.
    async fn create(&self, ride: &NewRide) -> Result<Ride, RideServiceError>;

    /// Fetch the current snapshot. `Ok(None)` means the ride is absent.
    async fn fetch(&self, id: &RideId) -> Result<Option<Ride>, RideServiceError>;

    /// All rides ever booked by one user, newest first.
    async fn for_user(&self, user_id: &str) -> Result<Vec<Ride>, RideServiceError>;

    /// The most recently created ride for this session, if any.
    async fn latest(&self) -> Result<Option<Ride>, RideServiceError>;

    /// Request a status transition and return the updated snapshot.
    async fn set_status(&self, id: &RideId, status: RideStatus) -> Result<Ride, RideServiceError>;

    /// Ask the service to advance the simulated driver position. A command,
    /// not a read: the snapshot fetched afterwards is authoritative.
    async fn advance_driver(&self, id: &RideId) -> Result<Ride, RideServiceError>;
}
