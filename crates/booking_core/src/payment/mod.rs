//! Payment handoff: authorize, confirm, and emit a payment reference.
//!
//! The handoff is an explicit state machine. Failures are terminal for the
//! attempt: there is no automatic retry anywhere in this module, since a
//! retried confirmation could double-charge. The authorization token is
//! consumed by value on the single confirmation attempt.

mod gateway;

pub use gateway::HttpPaymentGateway;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment authorization failed: {0}")]
    Authorization(String),
    #[error("payment confirmation failed: {0}")]
    Confirmation(String),
    #[error("payment request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("payment attempt already settled")]
    AlreadySettled,
}

/// Short-lived, single-use authorization for one charge.
#[derive(Debug)]
pub struct PaymentAuthorization {
    pub client_secret: String,
    pub amount_minor_units: i64,
}

/// Locally entered payment details, opaque to this crate.
#[derive(Debug, Clone)]
pub struct PaymentDetails {
    pub method_token: String,
}

/// Result of a confirmed charge.
#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    pub payment_reference: String,
}

/// Collaborator seam for the payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Request an authorization for the given amount in minor units.
    async fn create_authorization(
        &self,
        amount_minor_units: i64,
    ) -> Result<PaymentAuthorization, PaymentError>;

    /// Submit the single confirmation attempt for an authorization.
    async fn confirm(
        &self,
        authorization: PaymentAuthorization,
        details: &PaymentDetails,
    ) -> Result<PaymentConfirmation, PaymentError>;
}

/// Where a handoff attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffState {
    Idle,
    AuthorizationRequested,
    AuthorizationReceived,
    ConfirmationSubmitted,
    Confirmed,
    Failed,
}

/// Amounts travel to the provider in minor currency units.
pub fn minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// One payment attempt. A fresh attempt may be started from `Idle` or, on
/// user resubmission, from `Failed`; a settled handoff cannot run again.
pub struct PaymentHandoff {
    gateway: Arc<dyn PaymentGateway>,
    state: HandoffState,
}

impl PaymentHandoff {
    pub fn new(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            gateway,
            state: HandoffState::Idle,
        }
    }

    pub fn state(&self) -> HandoffState {
        self.state
    }

    /// Drive one attempt to `Confirmed` or `Failed`.
    pub async fn execute(
        &mut self,
        amount: f64,
        details: &PaymentDetails,
    ) -> Result<PaymentConfirmation, PaymentError> {
        match self.state {
            HandoffState::Idle | HandoffState::Failed => {}
            _ => return Err(PaymentError::AlreadySettled),
        }

        self.state = HandoffState::AuthorizationRequested;
        let authorization = match self.gateway.create_authorization(minor_units(amount)).await {
            Ok(authorization) => authorization,
            Err(err) => {
                self.state = HandoffState::Failed;
                return Err(err);
            }
        };
        self.state = HandoffState::AuthorizationReceived;

        self.state = HandoffState::ConfirmationSubmitted;
        match self.gateway.confirm(authorization, details).await {
            Ok(confirmation) => {
                self.state = HandoffState::Confirmed;
                Ok(confirmation)
            }
            Err(err) => {
                self.state = HandoffState::Failed;
                Err(err)
            }
        }
    }
}
