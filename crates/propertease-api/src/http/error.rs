//! Application error type mapping to HTTP status codes and `{error}` payloads.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use propertease_types::error::{ChatError, GatewayError};

/// Public message for a failed model call. The upstream detail is only logged.
pub const GENERATION_FAILED: &str = "Failed to generate content";

/// Public message for a failed geocoding lookup.
pub const GEOCODING_FAILED: &str = "Failed to geocode address";

/// Public message for a server-side configuration problem.
pub const NOT_CONFIGURED: &str = "Service is not configured";

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Gateway/service failure; `upstream_message` replaces upstream detail.
    Gateway {
        error: GatewayError,
        upstream_message: &'static str,
    },
    /// Chat controller rejected the message.
    Chat(ChatError),
    /// Request body was not valid JSON for the endpoint.
    MalformedBody(String),
    /// Route exists but not for this method.
    MethodNotAllowed,
}

impl AppError {
    /// A geocoding failure, reported without upstream detail.
    pub fn geocoding(error: GatewayError) -> Self {
        AppError::Gateway {
            error,
            upstream_message: GEOCODING_FAILED,
        }
    }

    /// HTTP status and public message for this error.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Gateway {
                error,
                upstream_message,
            } => match error {
                GatewayError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                GatewayError::Fetch(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
                GatewayError::Session(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
                GatewayError::Upstream(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, upstream_message.to_string())
                }
                GatewayError::Configuration(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, NOT_CONFIGURED.to_string())
                }
            },
            AppError::Chat(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::MalformedBody(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
            }
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(error: GatewayError) -> Self {
        AppError::Gateway {
            error,
            upstream_message: GENERATION_FAILED,
        }
    }
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedBody(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if let AppError::Gateway { error, .. } = &self {
            if status.is_server_error() {
                tracing::error!(kind = error.kind(), error = %error, "request failed");
            } else {
                tracing::debug!(kind = error.kind(), error = %error, "request rejected");
            }
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
