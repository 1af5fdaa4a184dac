//! Shared domain types for PropertEase.
//!
//! This crate contains the types shared by the gateway, chat, on-device and
//! listing layers: prompts, chat messages, model request/response shapes,
//! configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod geocode;
pub mod llm;
pub mod local;
pub mod property;
pub mod prompt;
pub mod secret;
