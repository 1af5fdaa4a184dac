//! HTTP request handlers for the REST API.

pub mod chat;
pub mod generate;
pub mod listing;
pub mod vision;
