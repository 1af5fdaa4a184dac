//! Property recommendations generated by the text model and cached per user.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{Instrument, info, info_span, warn};

use propertease_types::config::RecommendationConfig;
use propertease_types::error::GatewayError;
use propertease_types::property::{Property, RecommendationSource, Recommendations};

use crate::gateway::ModelGateway;
use crate::repository::cache::RecommendationCache;

/// Cache key for a user's recommendations.
pub fn cache_key(user_id: &str) -> String {
    format!("recs:{user_id}")
}

/// Prompt asking the model for `count` listings as JSON.
pub fn listing_prompt(user_id: &str, count: u32) -> String {
    format!(
        "Generate {count} fictional property listings recommended for user {user_id}. \
         Respond with only a JSON object of the form {{\"properties\": [...]}}. \
         Each property must have the keys name, description, price, market_avg, \
         image (an https://images.unsplash.com URL of a house or apartment) and \
         recommendation_reason. Prices and market averages are strings such as \"$2,100/mo\"."
    )
}

#[derive(Deserialize)]
struct ListingReply {
    properties: Vec<Property>,
}

/// Parse the model reply into listings.
///
/// Accepts a bare JSON object or array, optionally wrapped in a fenced code block.
pub fn parse_listings(reply: &str) -> Result<Vec<Property>, GatewayError> {
    let body = strip_code_fence(reply);
    let parsed = if body.starts_with('[') {
        serde_json::from_str::<Vec<Property>>(body)
    } else {
        serde_json::from_str::<ListingReply>(body).map(|r| r.properties)
    };
    parsed.map_err(|e| GatewayError::Upstream(format!("model returned malformed listings: {e}")))
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (```json) up to the first newline.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Serves cached recommendations, generating and caching on a miss.
pub struct RecommendationService<C: RecommendationCache> {
    gateway: ModelGateway,
    cache: Arc<C>,
    ttl: Duration,
    count: u32,
}

impl<C: RecommendationCache> RecommendationService<C> {
    pub fn new(gateway: ModelGateway, cache: Arc<C>, config: &RecommendationConfig) -> Self {
        Self {
            gateway,
            cache,
            ttl: Duration::from_secs(config.cache_ttl_secs),
            count: config.count,
        }
    }

    pub async fn recommend(&self, user_id: &str) -> Result<Recommendations, GatewayError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(GatewayError::Validation("user id is required".to_string()));
        }

        let key = cache_key(user_id);
        if let Some(properties) = self.cache.get(&key).await {
            info!(%key, count = properties.len(), "recommendations served from cache");
            return Ok(Recommendations {
                source: RecommendationSource::Cache,
                properties,
            });
        }

        let span = info_span!("recommendations.generate", user_id);
        let reply = self
            .gateway
            .generate(&listing_prompt(user_id, self.count))
            .instrument(span)
            .await?;
        let properties = parse_listings(&reply).inspect_err(|e| {
            warn!(error = %e, "discarding unparseable recommendation reply");
        })?;

        self.cache.set(&key, properties.clone(), self.ttl).await;
        info!(%key, count = properties.len(), ttl_secs = self.ttl.as_secs(), "recommendations cached");
        Ok(Recommendations {
            source: RecommendationSource::Model,
            properties,
        })
    }
}
