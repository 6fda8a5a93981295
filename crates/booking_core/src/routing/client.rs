use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;

use super::response::{normalize, RoutingResponse};
use super::{RouteProvider, RoutingError};
use crate::config::RoutingConfig;
use crate::geo::{GeoPoint, RouteGeometry};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Thin HTTP client for the routing collaborator.
#[derive(Debug, Clone)]
pub struct HttpRouteClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpRouteClient {
    pub fn new(config: &RoutingConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            endpoint: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl RouteProvider for HttpRouteClient {
    async fn route(
        &self,
        pickup: &GeoPoint,
        dropoff: &GeoPoint,
    ) -> Result<RouteGeometry, RoutingError> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|err| RoutingError::Malformed(format!("bad endpoint: {err}")))?;
        let waypoints = format!(
            "{},{}|{},{}",
            pickup.lat, pickup.lon, dropoff.lat, dropoff.lon
        );
        url.query_pairs_mut()
            .append_pair("waypoints", &waypoints)
            .append_pair("mode", "drive")
            .append_pair("details", "geometry");
        if !self.api_key.is_empty() {
            url.query_pairs_mut().append_pair("apiKey", &self.api_key);
        }

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(RoutingError::Status(response.status().as_u16()));
        }
        let body = response.text().await?;
        let parsed: RoutingResponse =
            serde_json::from_str(&body).map_err(|err| RoutingError::Malformed(err.to_string()))?;
        normalize(parsed)
    }
}
