use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{NewRide, Ride, RideId, RideService, RideServiceError, RideStatus};
use crate::config::RidesConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP adapter for the ride-state service.
#[derive(Debug, Clone)]
pub struct HttpRideService {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRideService {
    pub fn new(config: &RidesConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            endpoint: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn read_body<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, RideServiceError> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|err| RideServiceError::Malformed(err.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, RideServiceError> {
        let response = self
            .client
            .get(format!("{}{}", self.endpoint, path))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(RideServiceError::Status(response.status().as_u16()));
        }
        Ok(Some(Self::read_body(response).await?))
    }

    async fn patch<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<Ride, RideServiceError> {
        let mut request = self.client.patch(format!("{}{}", self.endpoint, path));
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(RideServiceError::Status(response.status().as_u16()));
        }
        Self::read_body(response).await
    }
}

#[derive(Serialize)]
struct StatusUpdate {
    status: RideStatus,
}

#[async_trait]
impl RideService for HttpRideService {
    async fn create(&self, ride: &NewRide) -> Result<Ride, RideServiceError> {
        let response = self
            .client
            .post(format!("{}/rides", self.endpoint))
            .json(ride)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(RideServiceError::Status(response.status().as_u16()));
        }
        Self::read_body(response).await
    }

    async fn fetch(&self, id: &RideId) -> Result<Option<Ride>, RideServiceError> {
        self.get(&format!("/rides/{id}")).await
    }

    async fn for_user(&self, user_id: &str) -> Result<Vec<Ride>, RideServiceError> {
        Ok(self
            .get(&format!("/rides/user/{user_id}"))
            .await?
            .unwrap_or_default())
    }

    async fn latest(&self) -> Result<Option<Ride>, RideServiceError> {
        self.get("/rides/latest").await
    }

    async fn set_status(&self, id: &RideId, status: RideStatus) -> Result<Ride, RideServiceError> {
        self.patch(&format!("/rides/{id}/status"), Some(&StatusUpdate { status }))
            .await
    }

    async fn advance_driver(&self, id: &RideId) -> Result<Ride, RideServiceError> {
        self.patch::<()>(&format!("/rides/{id}/move-driver"), None)
            .await
    }
}
