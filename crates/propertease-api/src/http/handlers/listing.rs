//! Listing endpoints: recommendations and the geocoding proxy.
//!
//! - `GET /recommendations/{user_id}` - `{ "source": "cache"|"model", "properties": [...] }`
//! - `POST /api/geocode` `{ "address": "..." }` or `GET /api/geocode?address=...` - `{ "results": [...] }`
//! - `OPTIONS /api/geocode` - 204 with permissive CORS headers

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use propertease_types::geocode::GeocodeResult;
use propertease_types::property::Recommendations;

use crate::http::error::AppError;
use crate::http::extractors::json::ApiJson;
use crate::state::AppState;

/// GET /recommendations/{user_id}
pub async fn get_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Recommendations>, AppError> {
    let recommendations = state.recommendations.recommend(&user_id).await?;
    Ok(Json(recommendations))
}

/// Address for a geocoding lookup, from the body or the query string.
#[derive(Debug, Default, Deserialize)]
pub struct GeocodeRequest {
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GeocodeResponse {
    pub results: Vec<GeocodeResult>,
}

async fn lookup(state: &AppState, request: GeocodeRequest) -> Result<Json<GeocodeResponse>, AppError> {
    let address = request.address.unwrap_or_default();
    let results = state
        .geocoding
        .geocode(&address)
        .await
        .map_err(AppError::geocoding)?;
    Ok(Json(GeocodeResponse { results }))
}

/// POST /api/geocode
pub async fn geocode(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<GeocodeRequest>,
) -> Result<Json<GeocodeResponse>, AppError> {
    lookup(&state, body).await
}

/// GET /api/geocode?address=...
pub async fn geocode_query(
    State(state): State<AppState>,
    Query(query): Query<GeocodeRequest>,
) -> Result<Json<GeocodeResponse>, AppError> {
    lookup(&state, query).await
}

/// OPTIONS /api/geocode
pub async fn geocode_preflight() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
            (header::ACCESS_CONTROL_MAX_AGE, "3600"),
        ],
    )
}
