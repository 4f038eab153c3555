use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Provider {provider} failed: {source}")]
    Provider {
        provider: String,
        #[source]
        source: ProviderError,
    },

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

/// Failure scoped to a single news provider. The aggregation engine logs
/// these and treats the provider's contribution as empty.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error {code}: {message}")]
    Api { code: String, message: String },

    #[error("Failed to parse API response: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ProviderError {
    pub fn code(&self) -> &str {
        match self {
            ProviderError::Http { .. } => "HTTP_ERROR",
            ProviderError::Network(_) => "NETWORK_ERROR",
            ProviderError::Timeout(_) => "TIMEOUT",
            ProviderError::Api { code, .. } => code,
            ProviderError::Parse(_) => "PARSE_ERROR",
            ProviderError::InvalidUrl(_) => "INVALID_URL",
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_codes() {
        let api = ProviderError::Api {
            code: "apiKeyInvalid".to_string(),
            message: "Your API key is invalid".to_string(),
        };
        assert_eq!(api.code(), "apiKeyInvalid");
        assert_eq!(ProviderError::Timeout(Duration::from_secs(1)).code(), "TIMEOUT");
        assert_eq!(ProviderError::Parse("eof".into()).code(), "PARSE_ERROR");
    }

    #[test]
    fn test_provider_error_wraps_with_name() {
        let err = Error::Provider {
            provider: "GNews".to_string(),
            source: ProviderError::Http { status: 429, body: "slow down".into() },
        };
        assert_eq!(err.to_string(), "Provider GNews failed: HTTP 429: slow down");
    }
}
