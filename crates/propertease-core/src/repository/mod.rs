//! Storage and lookup ports implemented by `propertease-infra`.

pub mod cache;
pub mod secret;
