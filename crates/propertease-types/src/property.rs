//! Property listing and recommendation types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A property listing as produced by the recommendation model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub description: String,
    pub price: String,
    pub market_avg: String,
    /// Image URL of the listing.
    pub image: String,
    pub recommendation_reason: String,
}

/// Where a set of recommendations came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationSource {
    Cache,
    Model,
}

impl fmt::Display for RecommendationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecommendationSource::Cache => write!(f, "cache"),
            RecommendationSource::Model => write!(f, "model"),
        }
    }
}

/// Recommendations for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendations {
    pub source: RecommendationSource,
    pub properties: Vec<Property>,
}
