use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use super::{GeocodeError, GeocodeProvider};
use crate::config::GeocodingConfig;
use crate::geo::GeoPoint;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Thin HTTP client for the autocomplete collaborator.
#[derive(Debug, Clone)]
pub struct HttpGeocoder {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpGeocoder {
    pub fn new(config: &GeocodingConfig) -> Self {
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
impl GeocodeProvider for HttpGeocoder {
    async fn search(&self, text: &str, limit: usize) -> Result<Vec<GeoPoint>, GeocodeError> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|err| GeocodeError::Malformed(format!("bad endpoint: {err}")))?;
        url.query_pairs_mut()
            .append_pair("text", text)
            .append_pair("limit", &limit.to_string());
        if !self.api_key.is_empty() {
            url.query_pairs_mut().append_pair("apiKey", &self.api_key);
        }

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status().as_u16()));
        }
        let body = response.text().await?;
        let parsed: AutocompleteResponse = serde_json::from_str(&body)
            .map_err(|err| GeocodeError::Malformed(err.to_string()))?;
        Ok(parsed
            .features
            .into_iter()
            .map(|feature| GeoPoint {
                label: feature.properties.formatted,
                lat: feature.properties.lat,
                lon: feature.properties.lon,
            })
            .collect())
    }
}

#[derive(Deserialize)]
struct AutocompleteResponse {
    #[serde(default)]
    features: Vec<AutocompleteFeature>,
}

#[derive(Deserialize)]
struct AutocompleteFeature {
    properties: AutocompleteProperties,
}

#[derive(Deserialize)]
struct AutocompleteProperties {
    formatted: String,
    lat: f64,
    lon: f64,
}
