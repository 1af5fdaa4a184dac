//! Model and vision gateways.
//!
//! - `ModelGateway`: text prompt in, normalized text out
//! - `VisionGateway`: image URL + prompt, image resolved to inline bytes first
//! - `ImageFetcher`: port for turning an image URL into bytes

pub mod fetch;
pub mod text;
pub mod vision;

pub use fetch::{FetchedImage, ImageFetcher};
pub use text::{GatewayStream, ModelGateway};
pub use vision::VisionGateway;
