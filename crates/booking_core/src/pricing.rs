//! Fare quoting: maps a vehicle class and a routed distance to a price.

use thiserror::Error;

use crate::vehicles::VehicleClass;

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("distance must be a finite, non-negative number of km (got {0})")]
    InvalidDistance(f64),
}

/// Quote a fare for one vehicle class over a routed distance.
///
/// Formula: `amount = round(per_km_rate * distance_km, 2)`. Pure and
/// deterministic; the only rejected input is a negative or non-finite
/// distance. Distances always come from the routing engine, never from
/// user input.
pub fn quote(vehicle: &VehicleClass, distance_km: f64) -> Result<f64, PricingError> {
    if !distance_km.is_finite() || distance_km < 0.0 {
        return Err(PricingError::InvalidDistance(distance_km));
    }
    Ok(round_to_paise(vehicle.per_km_rate * distance_km))
}

/// Round to currency-minor-unit precision (2 decimals).
pub(crate) fn round_to_paise(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
