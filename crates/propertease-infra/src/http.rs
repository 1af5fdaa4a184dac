//! Shared outbound HTTP client.

use std::time::Duration;

/// User agent sent on every outbound request.
pub const USER_AGENT: &str = concat!("propertease/", env!("CARGO_PKG_VERSION"));

/// Build the reqwest client shared by providers, fetchers and lookups.
///
/// `timeout` bounds each request end to end.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .build()
}
