use thiserror::Error;

use crate::llm::LlmError;

/// Errors surfaced by the gateways, the on-device session manager and the
/// listing services.
///
/// Each variant maps to one recovery story: configuration errors are fatal at
/// startup, validation errors are fixed by the caller, upstream/fetch errors
/// are retried, session errors need the environment to change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    Validation(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("fetch error: {0}")]
    Fetch(String),

    #[error("session error: {0}")]
    Session(String),
}

impl GatewayError {
    /// Short machine-readable kind, used in logs and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Configuration(_) => "configuration",
            GatewayError::Validation(_) => "validation",
            GatewayError::Upstream(_) => "upstream",
            GatewayError::Fetch(_) => "fetch",
            GatewayError::Session(_) => "session",
        }
    }
}

impl From<LlmError> for GatewayError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::AuthenticationFailed => {
                GatewayError::Configuration("model credential was rejected".to_string())
            }
            LlmError::InvalidRequest(msg) => GatewayError::Validation(msg),
            other => GatewayError::Upstream(other.to_string()),
        }
    }
}

/// Errors from the conversational state controller.
///
/// Gateway failures never show up here: they are folded into the fallback
/// reply. Only caller mistakes are reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyMessage,
}

/// Errors related to secret resolution.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("secret '{0}' not found")]
    NotFound(String),

    #[error("secret provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("secret payload is malformed: {0}")]
    Malformed(String),
}

/// Errors from loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(String),

    #[error("failed to parse config file: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_bare() {
        let err = GatewayError::Validation("Prompt is required".to_string());
        assert_eq!(err.to_string(), "Prompt is required");
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn test_llm_error_maps_to_upstream() {
        let err: GatewayError = LlmError::Provider {
            message: "HTTP 503".to_string(),
        }
        .into();
        assert!(matches!(err, GatewayError::Upstream(ref m) if m.contains("503")));
    }

    #[test]
    fn test_auth_failure_maps_to_configuration() {
        let err: GatewayError = LlmError::AuthenticationFailed.into();
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn test_secret_error_display() {
        let err = SecretError::NotFound("google-maps-api-key".to_string());
        assert_eq!(err.to_string(), "secret 'google-maps-api-key' not found");
    }
}
