//! Text generation endpoints.
//!
//! - `POST /api/gemini` - one prompt, one complete reply
//! - `POST /api/gemini/stream` - the same prompt answered as Server-Sent Events
//!
//! SSE event types:
//! - `text_delta` - incremental text: `{ "text": "..." }`
//! - `usage` - token usage: `{ "input_tokens": N, "output_tokens": N }`
//! - `done` - stream complete: `{}`
//! - `error` - generation failed: `{ "error": "..." }`

use std::convert::Infallible;

use axum::Json;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;

use propertease_types::llm::StreamEvent;

use crate::http::error::{AppError, GENERATION_FAILED};
use crate::http::extractors::json::ApiJson;
use crate::state::AppState;

/// Request body shared by both text endpoints.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub text: String,
}

/// POST /api/gemini
pub async fn generate(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let prompt = body.prompt.unwrap_or_default();
    let text = state.gateway.generate(&prompt).await?;
    Ok(Json(GenerateResponse { text }))
}

/// POST /api/gemini/stream
///
/// Validation errors are returned as a plain 400 before the stream opens;
/// failures after that arrive as an `error` event.
pub async fn stream(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<GenerateRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let prompt = body.prompt.unwrap_or_default();
    let mut upstream = state.gateway.stream(&prompt)?;

    let sse_stream = async_stream::stream! {
        while let Some(event_result) = upstream.next().await {
            match event_result {
                Ok(StreamEvent::TextDelta { text }) => {
                    let data = json!({ "text": text });
                    yield Ok::<_, Infallible>(Event::default().event("text_delta").data(data.to_string()));
                }
                Ok(StreamEvent::Usage(usage)) => {
                    let data = json!({
                        "input_tokens": usage.input_tokens,
                        "output_tokens": usage.output_tokens,
                    });
                    yield Ok(Event::default().event("usage").data(data.to_string()));
                }
                Ok(StreamEvent::Done) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "generation stream failed");
                    let data = json!({ "error": GENERATION_FAILED });
                    yield Ok(Event::default().event("error").data(data.to_string()));
                    return;
                }
            }
        }

        yield Ok(Event::default().event("done").data("{}"));
    };

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::default()))
}
