//! Client configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the client can start with zero
//! configuration against a local development endpoint.

use std::time::Duration;

use tableside_shared::constants::{
    DEFAULT_API_ENDPOINT, DEFAULT_REQUEST_TIMEOUT_SECS, STREAM_PATH_SUFFIX,
};

/// GraphQL API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// GraphQL HTTP endpoint for queries and mutations.
    /// Env: `API_ENDPOINT`
    /// Default: `http://127.0.0.1:8080/graphql`
    pub endpoint: String,

    /// Endpoint of the server-sent-events subscription stream.
    /// Env: `STREAM_ENDPOINT`
    /// Default: the API endpoint with `/stream` appended.
    pub stream_endpoint: String,

    /// API key sent as the `x-api-key` header on every request.
    /// Env: `API_KEY`
    /// Default: none (no auth header).
    pub api_key: Option<String>,

    /// Per-request timeout for queries and mutations. Never applied to the
    /// subscription stream, which is expected to stay open indefinitely.
    /// Env: `REQUEST_TIMEOUT_SECS`
    /// Default: `10`
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_API_ENDPOINT.to_string(),
            stream_endpoint: stream_endpoint_for(DEFAULT_API_ENDPOINT),
            api_key: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(endpoint) = std::env::var("API_ENDPOINT") {
            config.stream_endpoint = stream_endpoint_for(&endpoint);
            config.endpoint = endpoint;
        }

        if let Ok(stream) = std::env::var("STREAM_ENDPOINT") {
            config.stream_endpoint = stream;
        }

        if let Ok(key) = std::env::var("API_KEY") {
            if !key.is_empty() {
                config.api_key = Some(key);
            }
        }

        if let Ok(val) = std::env::var("REQUEST_TIMEOUT_SECS") {
            match val.parse::<u64>() {
                Ok(secs) => config.request_timeout = Duration::from_secs(secs),
                Err(_) => {
                    tracing::warn!(value = %val, "Invalid REQUEST_TIMEOUT_SECS, using default");
                }
            }
        }

        config
    }
}

/// Derive the stream endpoint from the API endpoint.
fn stream_endpoint_for(endpoint: &str) -> String {
    format!("{}{}", endpoint.trim_end_matches('/'), STREAM_PATH_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.endpoint, "http://127.0.0.1:8080/graphql");
        assert_eq!(config.stream_endpoint, "http://127.0.0.1:8080/graphql/stream");
        assert_eq!(config.api_key, None);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_stream_endpoint_derivation() {
        assert_eq!(
            stream_endpoint_for("https://api.example.com/graphql/"),
            "https://api.example.com/graphql/stream"
        );
    }
}
