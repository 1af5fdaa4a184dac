//! Image description endpoint.
//!
//! `POST /api/gemini-vision` with `{ "imageUrl": "...", "prompt": "..." }`.
//! The image may be an `http(s)` URL or a `data:` URL.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use crate::http::error::AppError;
use crate::http::extractors::json::ApiJson;
use crate::http::handlers::generate::GenerateResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionRequest {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
}

/// POST /api/gemini-vision
pub async fn describe(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<VisionRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let image_url = body.image_url.unwrap_or_default();
    let prompt = body.prompt.unwrap_or_default();
    let text = state.vision.describe(&image_url, &prompt).await?;
    Ok(Json(GenerateResponse { text }))
}
