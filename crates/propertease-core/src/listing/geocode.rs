//! Address geocoding with the API key resolved through the secret chain.

use std::future::Future;
use std::sync::Arc;

use secrecy::SecretString;
use tracing::{Instrument, info, info_span};

use propertease_types::error::GatewayError;
use propertease_types::geocode::GeocodeResult;
use propertease_types::secret::SecretKey;

use crate::service::secret::SecretService;

/// Geocoding backend (Google Geocoding API in production).
pub trait Geocoder: Send + Sync {
    /// Look up an address. No matches is an empty list, not an error.
    fn geocode(
        &self,
        address: &str,
        api_key: &SecretString,
    ) -> impl Future<Output = Result<Vec<GeocodeResult>, GatewayError>> + Send;
}

/// Validates input, resolves the API key and delegates to a [`Geocoder`].
pub struct GeocodingService<G: Geocoder> {
    geocoder: G,
    secrets: Arc<SecretService>,
    api_key_secret: SecretKey,
}

impl<G: Geocoder> GeocodingService<G> {
    pub fn new(geocoder: G, secrets: Arc<SecretService>, api_key_secret: SecretKey) -> Self {
        Self {
            geocoder,
            secrets,
            api_key_secret,
        }
    }

    pub async fn geocode(&self, address: &str) -> Result<Vec<GeocodeResult>, GatewayError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(GatewayError::Validation("Address is required.".to_string()));
        }

        let api_key = self.secrets.require(&self.api_key_secret).await?;
        let span = info_span!("geocode.lookup", address_chars = address.len());
        let results = self.geocoder.geocode(address, &api_key).instrument(span).await?;
        info!(matches = results.len(), "address geocoded");
        Ok(results)
    }
}
