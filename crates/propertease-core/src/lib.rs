//! Gateway, chat and session logic for PropertEase.
//!
//! This crate defines the "ports" (provider, fetcher, runtime, cache and
//! secret traits) that the infrastructure layer implements, plus the
//! business logic built on top of them. It depends only on
//! `propertease-types` -- never on `propertease-infra` or any HTTP crate.

pub mod chat;
pub mod gateway;
pub mod listing;
pub mod llm;
pub mod local;
pub mod repository;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;
