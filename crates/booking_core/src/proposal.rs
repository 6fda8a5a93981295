//! Trip proposals: an immutable, priced booking offer.
//!
//! A proposal is built once the user confirms a vehicle class and is carried
//! across the navigation boundary into the payment flow as a flat key/value
//! set. Reconstruction on the receiving side fails loudly when any field was
//! lost; nothing is silently defaulted.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::GeoPoint;
use crate::pricing::{self, PricingError};
use crate::vehicles;

#[derive(Debug, Error)]
pub enum ProposalError {
    #[error("no pickup location selected")]
    MissingPickup,
    #[error("no dropoff location selected")]
    MissingDropoff,
    #[error("no routed distance available")]
    MissingDistance,
    #[error("no vehicle class selected")]
    MissingVehicle,
    #[error("unknown vehicle class {0:?}")]
    UnknownVehicle(String),
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error("handoff is missing field {0:?}")]
    MissingField(&'static str),
    #[error("handoff field {0:?} could not be parsed")]
    InvalidField(&'static str),
    #[error("handoff amount {got} does not match quoted fare {expected}")]
    AmountMismatch { expected: f64, got: f64 },
}

/// An immutable priced trip offer, ready for the payment handoff.
///
/// Invariant: `amount` equals the catalog rate for `car_type` times
/// `distance_km`, rounded to 2 decimals. `build` establishes it and
/// `from_handoff` re-checks it after transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripProposal {
    pub amount: f64,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub distance_km: f64,
    pub car_type: String,
}

impl TripProposal {
    /// Build a proposal from the current selections.
    ///
    /// Every input is required: absent pickup/dropoff/vehicle or a
    /// non-positive distance blocks progression locally, before any
    /// collaborator is contacted.
    pub fn build(
        pickup: Option<GeoPoint>,
        dropoff: Option<GeoPoint>,
        distance_km: Option<f64>,
        car_type: Option<&str>,
    ) -> Result<Self, ProposalError> {
        let pickup = pickup.ok_or(ProposalError::MissingPickup)?;
        let dropoff = dropoff.ok_or(ProposalError::MissingDropoff)?;
        let distance_km = match distance_km {
            Some(d) if d.is_finite() && d > 0.0 => d,
            _ => return Err(ProposalError::MissingDistance),
        };
        let name = car_type.ok_or(ProposalError::MissingVehicle)?;
        let vehicle =
            vehicles::find(name).ok_or_else(|| ProposalError::UnknownVehicle(name.to_string()))?;
        let amount = pricing::quote(&vehicle, distance_km)?;
        Ok(Self {
            amount,
            pickup,
            dropoff,
            distance_km,
            car_type: vehicle.name,
        })
    }

    /// Serialize every field into the flat key/value handoff channel.
    pub fn to_handoff(&self) -> Vec<(String, String)> {
        vec![
            ("amount".to_string(), self.amount.to_string()),
            (
                "pickup".to_string(),
                serde_json::to_string(&self.pickup).expect("GeoPoint serializes"),
            ),
            (
                "dropoff".to_string(),
                serde_json::to_string(&self.dropoff).expect("GeoPoint serializes"),
            ),
            ("distanceKm".to_string(), self.distance_km.to_string()),
            ("carType".to_string(), self.car_type.clone()),
        ]
    }

    /// Reconstruct a proposal on the receiving side of the handoff.
    ///
    /// Loss of any field is a fatal precondition failure, and the amount is
    /// re-derived from the catalog to confirm it still matches the quoted
    /// fare.
    pub fn from_handoff(params: &HashMap<String, String>) -> Result<Self, ProposalError> {
        fn field<'a>(
            params: &'a HashMap<String, String>,
            key: &'static str,
        ) -> Result<&'a str, ProposalError> {
            params
                .get(key)
                .map(String::as_str)
                .ok_or(ProposalError::MissingField(key))
        }

        let amount: f64 = field(params, "amount")?
            .parse()
            .map_err(|_| ProposalError::InvalidField("amount"))?;
        let pickup: GeoPoint = serde_json::from_str(field(params, "pickup")?)
            .map_err(|_| ProposalError::InvalidField("pickup"))?;
        let dropoff: GeoPoint = serde_json::from_str(field(params, "dropoff")?)
            .map_err(|_| ProposalError::InvalidField("dropoff"))?;
        let distance_km: f64 = field(params, "distanceKm")?
            .parse()
            .map_err(|_| ProposalError::InvalidField("distanceKm"))?;
        let car_type = field(params, "carType")?;

        let rebuilt = Self::build(Some(pickup), Some(dropoff), Some(distance_km), Some(car_type))?;
        if rebuilt.amount != amount {
            return Err(ProposalError::AmountMismatch {
                expected: rebuilt.amount,
                got: amount,
            });
        }
        Ok(rebuilt)
    }
}
