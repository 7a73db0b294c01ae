//! Error types for provider API operations.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when fetching from the sports-data provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Required configuration is missing or unusable. No request was sent.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The request did not complete within the configured timeout.
    #[error("Request timed out after {}s: {url}", .timeout.as_secs_f64())]
    Timeout { url: String, timeout: Duration },

    /// The provider answered HTTP 429.
    #[error("Rate limited by provider{}", .retry_after.map(|d| format!(", retry after {}s", d.as_secs())).unwrap_or_default())]
    RateLimited { retry_after: Option<Duration> },

    /// The provider answered with any other non-2xx status.
    #[error("Provider returned HTTP {status}{}", .body.as_deref().map(|b| format!(": {b}")).unwrap_or_default())]
    Provider { status: u16, body: Option<String> },

    /// Network-level failure (DNS, connection reset, TLS, ...).
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// A 2xx response whose body is not JSON.
    #[error("Invalid JSON from provider: {message}")]
    Decode { message: String },
}

impl ProviderError {
    /// Create a configuration error.
    #[inline]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a transport error.
    #[inline]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Check if this error is a rate limit error.
    #[inline]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Timeouts and transport failures may succeed on a later attempt.
    #[inline]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Transport { .. })
    }

    /// Name of this failure in the error taxonomy used by sync reports.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "ConfigurationError",
            Self::Timeout { .. } => "Timeout",
            Self::RateLimited { .. } => "RateLimited",
            Self::Provider { .. } => "ProviderError",
            Self::Transport { .. } => "TransportError",
            Self::Decode { .. } => "DecodeError",
        }
    }

    /// HTTP status class to surface to callers of the ingestion pipeline.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Configuration { .. } => 500,
            Self::Timeout { .. } => 504,
            Self::RateLimited { .. } => 429,
            Self::Provider { status, .. } => *status,
            Self::Transport { .. } | Self::Decode { .. } => 502,
        }
    }
}

/// Get a short error message suitable for progress output.
pub fn short_error_message(err: &ProviderError) -> String {
    match err {
        ProviderError::Configuration { message } => format!("Config: {}", message),
        ProviderError::Timeout { .. } => "Timed out".to_string(),
        ProviderError::RateLimited { .. } => "Rate limited".to_string(),
        ProviderError::Provider { status, body } => match body {
            Some(body) if body.chars().count() > 50 => {
                let truncated: String = body.chars().take(47).collect();
                format!("HTTP {}: {}...", status, truncated)
            }
            Some(body) => format!("HTTP {}: {}", status, body),
            None => format!("HTTP {}", status),
        },
        ProviderError::Transport { .. } => "Network error".to_string(),
        ProviderError::Decode { .. } => "JSON parse error".to_string(),
    }
}

/// Result type for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;
