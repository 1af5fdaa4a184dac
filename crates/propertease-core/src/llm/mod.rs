//! Model provider abstractions for PropertEase.
//!
//! - `ModelProvider`: RPITIT trait for concrete provider implementations
//! - `BoxModelProvider`: Object-safe wrapper for dynamic dispatch

pub mod box_provider;
pub mod provider;
