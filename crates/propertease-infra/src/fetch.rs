//! HTTP image fetcher.
//!
//! Resolves `http(s)://` URLs with a GET and `data:` URLs by decoding them
//! in place, so images picked from disk by a client never leave the process.

use base64::Engine;

use propertease_core::gateway::fetch::display_url;
use propertease_core::gateway::{FetchedImage, ImageFetcher};
use propertease_types::error::GatewayError;

/// Largest remote image accepted, in bytes.
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// [`ImageFetcher`] backed by a shared reqwest client.
#[derive(Clone)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpImageFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            max_bytes: MAX_IMAGE_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    fn too_large(&self, url: &str) -> GatewayError {
        GatewayError::Validation(format!(
            "image '{url}' is larger than {} bytes",
            self.max_bytes
        ))
    }

    async fn fetch_remote(&self, url: &str) -> Result<FetchedImage, GatewayError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GatewayError::Fetch(format!("could not fetch image '{url}': {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Fetch(format!(
                "image request to '{url}' returned HTTP {status}"
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if response
            .content_length()
            .is_some_and(|len| len > self.max_bytes as u64)
        {
            return Err(self.too_large(url));
        }

        // The declared length may be missing or wrong; enforce the cap on the body.
        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| GatewayError::Fetch(format!("could not read image '{url}': {e}")))?
        {
            if bytes.len() + chunk.len() > self.max_bytes {
                return Err(self.too_large(url));
            }
            bytes.extend_from_slice(&chunk);
        }

        tracing::debug!(url, bytes = bytes.len(), content_type = ?content_type, "image fetched");
        Ok(FetchedImage {
            content_type,
            bytes,
        })
    }
}

/// Decode a `data:[<mediatype>][;base64],<data>` URL.
pub fn decode_data_url(url: &str) -> Result<FetchedImage, GatewayError> {
    let malformed = || GatewayError::Validation(format!("malformed data URL '{}'", display_url(url)));

    let rest = url.strip_prefix("data:").ok_or_else(malformed)?;
    let (meta, data) = rest.split_once(',').ok_or_else(malformed)?;

    let mut params = meta.split(';');
    let media_type = params.next().unwrap_or_default().trim();
    let is_base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        base64::engine::general_purpose::STANDARD
            .decode(data.trim())
            .map_err(|_| malformed())?
    } else {
        data.as_bytes().to_vec()
    };

    Ok(FetchedImage {
        content_type: (!media_type.is_empty()).then(|| media_type.to_string()),
        bytes,
    })
}

impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, GatewayError> {
        if url.starts_with("data:") {
            return decode_data_url(url);
        }
        let lower = url.to_ascii_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(GatewayError::Validation(format!(
                "unsupported image URL '{url}': expected http(s) or data URL"
            )));
        }
        self.fetch_remote(url).await
    }
}
