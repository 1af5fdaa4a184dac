//! Vision gateway: image URL + prompt in, description text out.

use std::sync::Arc;

use tracing::{debug, info};

use propertease_types::error::GatewayError;
use propertease_types::llm::ContentPart;

use super::fetch::{ImageFetcher, display_url, resolve_image};
use super::text::ModelGateway;

/// Resolves the image behind a URL, then asks the vision model about it.
pub struct VisionGateway<F: ImageFetcher> {
    model: ModelGateway,
    fetcher: Arc<F>,
}

impl<F: ImageFetcher> VisionGateway<F> {
    /// `model` must already point at a vision-capable model selector.
    pub fn new(model: ModelGateway, fetcher: Arc<F>) -> Self {
        Self { model, fetcher }
    }

    pub fn model(&self) -> &ModelGateway {
        &self.model
    }

    /// Describe the image at `image_url` according to `prompt`.
    ///
    /// Both inputs are required; nothing is fetched or sent otherwise.
    pub async fn describe(&self, image_url: &str, prompt: &str) -> Result<String, GatewayError> {
        if image_url.trim().is_empty() || prompt.trim().is_empty() {
            return Err(GatewayError::Validation(
                "imageUrl and prompt are required".to_string(),
            ));
        }

        let image = resolve_image(self.fetcher.as_ref(), image_url.trim()).await?;
        info!(
            url = display_url(image_url),
            mime_type = %image.mime_type,
            bytes = image.bytes.len(),
            "image resolved"
        );

        let parts = vec![ContentPart::Text(prompt.to_string()), ContentPart::Image(image)];
        let text = self.model.generate_parts(parts).await?;
        debug!(chars = text.len(), "vision description complete");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StubFetcher, StubProvider, vision_gateway};

    #[tokio::test]
    async fn test_describe_returns_text_exactly() {
        let provider = StubProvider::replying("A red door");
        let fetcher = StubFetcher::image("image/jpeg", vec![0xff, 0xd8, 0xff]);
        let gateway = vision_gateway(&provider, &fetcher);

        let text = gateway
            .describe("https://example.com/door.jpg", "What color is the door?")
            .await
            .unwrap();
        assert_eq!(text, "A red door");
    }

    #[tokio::test]
    async fn test_describe_sends_prompt_then_image() {
        let provider = StubProvider::replying("ok");
        let fetcher = StubFetcher::image("image/png", vec![1, 2]);
        let gateway = vision_gateway(&provider, &fetcher);
        gateway.describe("https://example.com/a.png", "Describe").await.unwrap();

        let request = provider.last_request().unwrap();
        assert_eq!(request.selector.model, "gemini-pro-vision");
        assert_eq!(request.parts.len(), 2);
        assert_eq!(request.parts[0], ContentPart::Text("Describe".to_string()));
        assert!(matches!(&request.parts[1], ContentPart::Image(img) if img.mime_type == "image/png"));
    }

    #[tokio::test]
    async fn test_missing_fields_rejected_without_calls() {
        let provider = StubProvider::replying("unused");
        let fetcher = StubFetcher::image("image/png", vec![1]);
        let gateway = vision_gateway(&provider, &fetcher);

        for (url, prompt) in [("", "Describe"), ("https://example.com/a.png", ""), (" ", " ")] {
            let err = gateway.describe(url, prompt).await.unwrap_err();
            assert_eq!(
                err,
                GatewayError::Validation("imageUrl and prompt are required".to_string())
            );
        }
        assert_eq!(fetcher.calls(), 0);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_image_is_fetch_error() {
        let provider = StubProvider::replying("unused");
        let fetcher = StubFetcher::failing("connection refused");
        let gateway = vision_gateway(&provider, &fetcher);

        let err = gateway
            .describe("https://unreachable.invalid/a.png", "Describe")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "fetch");
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_model_failure_is_upstream_error() {
        let provider = StubProvider::failing("quota exceeded");
        let fetcher = StubFetcher::image("image/jpeg", vec![1]);
        let gateway = vision_gateway(&provider, &fetcher);

        let err = gateway
            .describe("https://example.com/a.jpg", "Describe")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "upstream");
    }
}
