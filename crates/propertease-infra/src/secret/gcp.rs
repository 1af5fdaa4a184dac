//! Google Cloud Secret Manager provider.
//!
//! Reads `projects/{project}/secrets/{name}/versions/latest` through the
//! REST API. The bearer token comes from `GOOGLE_OAUTH_ACCESS_TOKEN` when
//! set, otherwise from the GCE/Cloud Run metadata server. Payloads are
//! base64-encoded by the API and decoded here.

use std::time::{Duration, Instant};

use base64::Engine;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;

use propertease_core::repository::secret::SecretProvider;
use propertease_types::error::SecretError;
use propertease_types::secret::SecretKey;

pub const DEFAULT_BASE_URL: &str = "https://secretmanager.googleapis.com/v1";

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Env var holding a pre-issued OAuth access token.
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

/// Where bearer tokens come from.
enum TokenSource {
    Static(SecretString),
    MetadataServer { url: String },
}

#[derive(Deserialize)]
struct MetadataToken {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

#[derive(Deserialize)]
struct AccessSecretVersionResponse {
    payload: SecretPayload,
}

#[derive(Deserialize)]
struct SecretPayload {
    data: String,
}

/// Read-only provider backed by Google Cloud Secret Manager.
pub struct GcpSecretManagerProvider {
    client: reqwest::Client,
    project: String,
    base_url: String,
    token_source: TokenSource,
    cached_token: Mutex<Option<(SecretString, Instant)>>,
}

impl GcpSecretManagerProvider {
    /// Provider for `project`, authenticating from the environment.
    pub fn new(client: reqwest::Client, project: impl Into<String>) -> Self {
        let token_source = match std::env::var(ACCESS_TOKEN_ENV) {
            Ok(token) if !token.is_empty() => TokenSource::Static(SecretString::from(token)),
            _ => TokenSource::MetadataServer {
                url: METADATA_TOKEN_URL.to_string(),
            },
        };
        Self {
            client,
            project: project.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            token_source,
            cached_token: Mutex::new(None),
        }
    }

    /// Use a fixed bearer token instead of the environment.
    pub fn with_token(mut self, token: SecretString) -> Self {
        self.token_source = TokenSource::Static(token);
        self
    }

    /// Override the API base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn version_url(&self, key: &SecretKey) -> String {
        format!(
            "{}/projects/{}/secrets/{}/versions/latest:access",
            self.base_url.trim_end_matches('/'),
            self.project,
            key.as_str()
        )
    }

    async fn access_token(&self) -> Result<SecretString, SecretError> {
        let url = match &self.token_source {
            TokenSource::Static(token) => return Ok(token.clone()),
            TokenSource::MetadataServer { url } => url,
        };

        let mut cached = self.cached_token.lock().await;
        if let Some((token, expires_at)) = cached.as_ref() {
            if Instant::now() < *expires_at {
                return Ok(token.clone());
            }
        }

        let response = self
            .client
            .get(url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| SecretError::ProviderUnavailable(format!("metadata server: {e}")))?;
        if !response.status().is_success() {
            return Err(SecretError::ProviderUnavailable(format!(
                "metadata server returned HTTP {}",
                response.status()
            )));
        }
        let token: MetadataToken = response
            .json()
            .await
            .map_err(|e| SecretError::Malformed(format!("metadata token: {e}")))?;

        // Refresh a minute early.
        let lifetime = Duration::from_secs(token.expires_in.saturating_sub(60));
        let secret = SecretString::from(token.access_token);
        *cached = Some((secret.clone(), Instant::now() + lifetime));
        Ok(secret)
    }
}

impl SecretProvider for GcpSecretManagerProvider {
    fn name(&self) -> &str {
        "gcp"
    }

    async fn get(&self, key: &SecretKey) -> Result<Option<SecretString>, SecretError> {
        let token = self.access_token().await?;
        let response = self
            .client
            .get(self.version_url(key))
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .map_err(|e| SecretError::ProviderUnavailable(format!("secret manager: {e}")))?;

        let status = response.status();
        match status.as_u16() {
            404 => return Ok(None),
            401 | 403 => {
                return Err(SecretError::ProviderUnavailable(format!(
                    "secret manager denied access (HTTP {status})"
                )));
            }
            _ if !status.is_success() => {
                return Err(SecretError::ProviderUnavailable(format!(
                    "secret manager returned HTTP {status}"
                )));
            }
            _ => {}
        }

        let body: AccessSecretVersionResponse = response
            .json()
            .await
            .map_err(|e| SecretError::Malformed(format!("secret manager response: {e}")))?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(body.payload.data.as_bytes())
            .map_err(|e| SecretError::Malformed(format!("payload is not base64: {e}")))?;
        let value = String::from_utf8(bytes)
            .map_err(|_| SecretError::Malformed("payload is not valid UTF-8".to_string()))?;

        tracing::debug!(secret = %key, "secret read from secret manager");
        Ok(Some(SecretString::from(value.trim_end().to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> GcpSecretManagerProvider {
        GcpSecretManagerProvider::new(reqwest::Client::new(), "propertease-test")
            .with_token(SecretString::from("token-abc".to_string()))
            .with_base_url(format!("{}/v1", server.uri()))
    }

    #[tokio::test]
    async fn test_get_decodes_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(
                "/v1/projects/propertease-test/secrets/google-maps-api-key/versions/latest:access",
            ))
            .and(header("authorization", "Bearer token-abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "projects/1/secrets/google-maps-api-key/versions/3",
                // "maps-key-123\n"
                "payload": {"data": "bWFwcy1rZXktMTIzCg=="}
            })))
            .mount(&server)
            .await;

        let value = provider(&server)
            .get(&SecretKey::new("google-maps-api-key"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value.expose_secret(), "maps-key-123");
    }

    #[tokio::test]
    async fn test_missing_secret_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let value = provider(&server).get(&SecretKey::new("nope")).await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_denied_is_provider_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = provider(&server).get(&SecretKey::new("k")).await.unwrap_err();
        assert!(matches!(err, SecretError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn test_bad_payload_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"payload": {"data": "%%%"}})),
            )
            .mount(&server)
            .await;

        let err = provider(&server).get(&SecretKey::new("k")).await.unwrap_err();
        assert!(matches!(err, SecretError::Malformed(_)));
    }
}
