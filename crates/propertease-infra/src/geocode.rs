//! Google Geocoding API client.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use propertease_core::listing::Geocoder;
use propertease_types::error::GatewayError;
use propertease_types::geocode::{GeocodeResult, LatLng};

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeEntry>,
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct GeocodeEntry {
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Deserialize)]
struct Geometry {
    location: LatLng,
}

/// [`Geocoder`] calling the Google Geocoding JSON endpoint.
#[derive(Clone)]
pub struct GoogleGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleGeocoder {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

impl Geocoder for GoogleGeocoder {
    async fn geocode(
        &self,
        address: &str,
        api_key: &SecretString,
    ) -> Result<Vec<GeocodeResult>, GatewayError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("address", address), ("key", api_key.expose_secret())])
            .send()
            .await
            .map_err(|e| GatewayError::Upstream(format!("geocoding request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Upstream(format!(
                "geocoding API returned HTTP {status}"
            )));
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Upstream(format!("malformed geocoding response: {}", e.without_url())))?;

        match body.status.as_str() {
            "OK" => Ok(body
                .results
                .into_iter()
                .map(|entry| GeocodeResult {
                    formatted_address: entry.formatted_address,
                    location: entry.geometry.location,
                })
                .collect()),
            "ZERO_RESULTS" => Ok(Vec::new()),
            other => {
                let detail = body.error_message.unwrap_or_default();
                tracing::warn!(status = other, %detail, "geocoding API rejected request");
                Err(GatewayError::Upstream(format!(
                    "geocoding API status {other}: {detail}"
                )))
            }
        }
    }
}
