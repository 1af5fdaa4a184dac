//! HTTP/REST API layer for PropertEase.
//!
//! Axum-based JSON API mirroring the gateway operations, with `{error}`
//! payloads for every failure and permissive CORS.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;

#[cfg(test)]
pub(crate) mod test_support;
