use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    PaymentAuthorization, PaymentConfirmation, PaymentDetails, PaymentError, PaymentGateway,
};
use crate::config::PaymentConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP adapter for the payment collaborator.
#[derive(Debug, Clone)]
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    endpoint: String,
    currency: String,
}

impl HttpPaymentGateway {
    pub fn new(config: &PaymentConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            endpoint: config.base_url.trim_end_matches('/').to_string(),
            currency: config.currency.clone(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateIntentRequest<'a> {
    amount: i64,
    currency: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateIntentResponse {
    client_secret: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmRequest<'a> {
    client_secret: &'a str,
    method_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmResponse {
    payment_reference: String,
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_authorization(
        &self,
        amount_minor_units: i64,
    ) -> Result<PaymentAuthorization, PaymentError> {
        let response = self
            .client
            .post(format!("{}/create-intent", self.endpoint))
            .json(&CreateIntentRequest {
                amount: amount_minor_units,
                currency: &self.currency,
            })
            .send()
            .await?;
        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Authorization(message));
        }
        let body: CreateIntentResponse = response
            .json()
            .await
            .map_err(|err| PaymentError::Authorization(err.to_string()))?;
        Ok(PaymentAuthorization {
            client_secret: body.client_secret,
            amount_minor_units,
        })
    }

    async fn confirm(
        &self,
        authorization: PaymentAuthorization,
        details: &PaymentDetails,
    ) -> Result<PaymentConfirmation, PaymentError> {
        let response = self
            .client
            .post(format!("{}/confirm-intent", self.endpoint))
            .json(&ConfirmRequest {
                client_secret: &authorization.client_secret,
                method_token: &details.method_token,
            })
            .send()
            .await?;
        if !response.status().is_success() {
            // Provider-supplied message, passed through verbatim.
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Confirmation(message));
        }
        let body: ConfirmResponse = response
            .json()
            .await
            .map_err(|err| PaymentError::Confirmation(err.to_string()))?;
        Ok(PaymentConfirmation {
            payment_reference: body.payment_reference,
        })
    }
}
