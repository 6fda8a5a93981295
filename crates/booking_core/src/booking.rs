//! Booking flow: drive the payment handoff, then persist the ride.
//!
//! Ride creation failure after a successful charge means money has moved
//! without a matching ride record. That is the most severe failure class in
//! the system: it is surfaced as a distinct reconciliation error with the
//! payment reference attached, logged for operators, and never papered over
//! by retrying the payment.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};

use crate::payment::{PaymentDetails, PaymentError, PaymentGateway, PaymentHandoff};
use crate::proposal::TripProposal;
use crate::rides::{NewRide, Ride, RideService, RideServiceError};

#[derive(Debug, Error)]
pub enum BookingError {
    #[error(transparent)]
    Payment(#[from] PaymentError),
    #[error("payment {payment_ref} succeeded but ride creation failed: {source}")]
    Reconciliation {
        payment_ref: String,
        source: RideServiceError,
    },
}

/// Pay for a proposal and persist the resulting ride.
///
/// Emits exactly one ride-creation request, and only after the payment
/// collaborator confirmed the charge.
pub async fn book_trip(
    gateway: Arc<dyn PaymentGateway>,
    rides: &dyn RideService,
    user_id: &str,
    proposal: &TripProposal,
    details: &PaymentDetails,
) -> Result<Ride, BookingError> {
    let mut handoff = PaymentHandoff::new(gateway);
    let confirmation = handoff.execute(proposal.amount, details).await?;

    let new_ride = NewRide::from_proposal(user_id, proposal, &confirmation.payment_reference);
    match rides.create(&new_ride).await {
        Ok(ride) => {
            info!(ride = %ride.id, car = %ride.car_type, price = ride.price, "ride booked");
            Ok(ride)
        }
        Err(source) => {
            error!(
                payment_ref = %confirmation.payment_reference,
                error = %source,
                "payment captured without a matching ride record"
            );
            Err(BookingError::Reconciliation {
                payment_ref: confirmation.payment_reference,
                source,
            })
        }
    }
}
