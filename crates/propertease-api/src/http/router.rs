//! Axum router configuration with middleware.
//!
//! Routes keep the paths the web client already calls (`/api/gemini`,
//! `/api/gemini-vision`, ...). Middleware: CORS, tracing.
//! A known path hit with the wrong method answers 405 `{error}`.

use axum::Router;
use axum::routing::{MethodRouter, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::error::AppError;
use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Text and vision generation
        .route("/api/gemini", strict(post(handlers::generate::generate)))
        .route("/api/gemini/stream", strict(post(handlers::generate::stream)))
        .route("/api/gemini-vision", strict(post(handlers::vision::describe)))
        // Demo chat
        .route(
            "/api/chat",
            strict(get(handlers::chat::get_transcript).post(handlers::chat::send_message)),
        )
        // Listings
        .route(
            "/recommendations/{user_id}",
            strict(get(handlers::listing::get_recommendations)),
        )
        .route(
            "/api/geocode",
            strict(
                post(handlers::listing::geocode)
                    .get(handlers::listing::geocode_query)
                    .options(handlers::listing::geocode_preflight),
            ),
        )
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Answer unlisted methods with a JSON 405 instead of an empty body.
fn strict(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.fallback(method_not_allowed)
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
