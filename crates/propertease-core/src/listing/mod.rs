//! Listing features backed by the gateways: recommendations and geocoding.

pub mod geocode;
pub mod recommendation;

pub use geocode::{Geocoder, GeocodingService};
pub use recommendation::RecommendationService;
