use thiserror::Error;

/// Errors raised at the capability boundary
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("OpenRouter API error: {message}")]
    Api {
        message: String,
        status_code: Option<u16>,
    },

    #[error("OpenRouter rate limited, retry after {retry_after:?}s")]
    RateLimited { retry_after: Option<u64> },

    #[error("Failed to parse response. The model returned unstructured text instead of JSON: {0}")]
    Extraction(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AgentError {
    pub fn api(message: impl Into<String>, status_code: Option<u16>) -> Self {
        Self::Api {
            message: message.into(),
            status_code,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// The model answered but its output could not be used.
    pub fn is_malformed_response(&self) -> bool {
        matches!(self, Self::Extraction(_) | Self::Serialization(_))
    }
}

/// Result type alias for capability calls
pub type AgentResult<T> = Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(AgentError::RateLimited { retry_after: None }.is_rate_limited());
        assert!(AgentError::Extraction("no braces".to_string()).is_malformed_response());
        assert!(!AgentError::api("boom", Some(500)).is_malformed_response());
        assert!(!AgentError::api("boom", Some(500)).is_rate_limited());
    }
}
