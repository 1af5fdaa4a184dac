//! Gemini SSE stream adapter.
//!
//! `streamGenerateContent?alt=sse` answers with `text/event-stream` where
//! every `data:` line is a complete [`GeminiResponse`] JSON chunk. Each chunk
//! carries the next slice of candidate text; the last one carries the finish
//! reason and usage metadata.

use std::pin::Pin;

use eventsource_stream::Eventsource;
use futures_util::{Stream, StreamExt};
use secrecy::{ExposeSecret, SecretString};

use propertease_types::llm::{LlmError, StreamEvent, Usage};

use super::client::{retry_after_secs, status_error};
use super::types::{GeminiRequest, GeminiResponse};

/// Translate one decoded chunk into zero or more [`StreamEvent`]s.
fn process_chunk(chunk: &GeminiResponse, usage: &mut Option<Usage>) -> Result<Vec<StreamEvent>, LlmError> {
    if let Some(reason) = chunk.block_reason() {
        return Err(LlmError::Blocked(format!("prompt blocked: {reason}")));
    }

    let mut events = Vec::new();
    let text = chunk.text();
    if !text.is_empty() {
        events.push(StreamEvent::TextDelta { text });
    }
    if chunk.usage_metadata.is_some() {
        *usage = Some(chunk.usage());
    }
    if let Some(reason) = chunk.finish_reason() {
        events.push(StreamEvent::Finished { reason });
    }
    Ok(events)
}

/// Open a streaming request and adapt the SSE body into [`StreamEvent`]s.
pub fn create_gemini_stream(
    client: &reqwest::Client,
    url: &str,
    body: GeminiRequest,
    api_key: &SecretString,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
    let client = client.clone();
    let url = url.to_string();
    let api_key = api_key.clone();

    Box::pin(async_stream::try_stream! {
        let response = client
            .post(&url)
            .header("x-goog-api-key", api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        let response = if !status.is_success() {
            let retry_after = retry_after_secs(response.headers());
            let error_body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "Gemini stream API error response");
            Err(status_error(status, retry_after, &error_body))?
        } else {
            response
        };

        yield StreamEvent::Connected;

        let mut events = response.bytes_stream().eventsource();
        let mut usage = None;

        while let Some(event) = events.next().await {
            let event = event.map_err(|e| LlmError::Stream(format!("SSE read failed: {e}")))?;
            if event.data.trim().is_empty() {
                continue;
            }
            let chunk: GeminiResponse = serde_json::from_str(&event.data)
                .map_err(|e| LlmError::Deserialization(format!("stream chunk: {e}")))?;
            for stream_event in process_chunk(&chunk, &mut usage)? {
                yield stream_event;
            }
        }

        if let Some(usage) = usage {
            yield StreamEvent::Usage(usage);
        }
        yield StreamEvent::Done;
    })
}
