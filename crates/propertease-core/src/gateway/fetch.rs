//! Image resolution port.
//!
//! Both the vision gateway and the on-device session manager accept images
//! by URL and must turn them into inline bytes before a model sees them.

use propertease_types::error::GatewayError;
use propertease_types::llm::ContentPart;
use propertease_types::prompt::{DEFAULT_IMAGE_MIME, ImageInput, InlineImage, Prompt, PromptPart};

/// Raw result of fetching an image URL.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    /// Declared content type, if the source reported one.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Fetches the bytes behind an image URL (`http(s)://` or `data:`).
///
/// Implementations return `GatewayError::Fetch` when the source is
/// unreachable or answers with a non-success status.
pub trait ImageFetcher: Send + Sync {
    fn fetch(
        &self,
        url: &str,
    ) -> impl std::future::Future<Output = Result<FetchedImage, GatewayError>> + Send;
}

/// Fetch `url` and tag the bytes with a MIME type.
///
/// A declared non-image content type is a validation error. A missing one
/// falls back to `image/jpeg`.
pub async fn resolve_image<F: ImageFetcher + ?Sized>(
    fetcher: &F,
    url: &str,
) -> Result<InlineImage, GatewayError> {
    let fetched = fetcher.fetch(url).await?;
    if fetched.bytes.is_empty() {
        return Err(GatewayError::Fetch(format!("image at '{}' is empty", display_url(url))));
    }

    let mime_type = match fetched.content_type.as_deref().map(essence) {
        Some(ct) if ct.starts_with("image/") => ct.to_string(),
        Some(ct) if !ct.is_empty() => {
            return Err(GatewayError::Validation(format!(
                "imageUrl did not resolve to an image (content type: {ct})"
            )));
        }
        _ => DEFAULT_IMAGE_MIME.to_string(),
    };

    Ok(InlineImage::new(mime_type, fetched.bytes))
}

/// Turn a prompt into model-ready parts, resolving every image URL in order.
pub async fn resolve_prompt<F: ImageFetcher + ?Sized>(
    fetcher: &F,
    prompt: Prompt,
) -> Result<Vec<ContentPart>, GatewayError> {
    let mut parts = Vec::with_capacity(prompt.parts().len());
    for part in prompt.into_parts() {
        match part {
            PromptPart::Text(text) => parts.push(ContentPart::Text(text)),
            PromptPart::Image(ImageInput::Inline(image)) => parts.push(ContentPart::Image(image)),
            PromptPart::Image(ImageInput::Url(url)) => {
                parts.push(ContentPart::Image(resolve_image(fetcher, &url).await?));
            }
        }
    }
    Ok(parts)
}

/// Media type without parameters, lowercased (`Image/PNG; q=1` -> `image/png`).
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Shorten data URLs for log and error messages.
pub fn display_url(url: &str) -> &str {
    if url.starts_with("data:") {
        url.split(',').next().unwrap_or("data:")
    } else {
        url
    }
}
