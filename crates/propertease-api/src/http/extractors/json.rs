//! JSON body extractor reporting malformed bodies as `{error}` payloads.

use axum::extract::FromRequest;

use crate::http::error::AppError;

/// `axum::Json` with rejections converted into [`AppError::MalformedBody`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
