//! Provider API client.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::config::{Endpoint, ProviderConfig};
use super::error::{ProviderError, Result};
use super::rate_limit::ApiRateLimiter;
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpError, HttpRequest, HttpResponse, HttpTransport};

/// Longest upstream error body kept on `ProviderError::Provider`.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Authenticated client for the sports-data provider.
///
/// The client never retries; callers decide what to do with each failure.
#[derive(Clone)]
pub struct ProviderClient {
    transport: Arc<dyn HttpTransport>,
    config: ProviderConfig,
    rate_limiter: Option<ApiRateLimiter>,
}

impl ProviderClient {
    /// Create a client backed by reqwest.
    ///
    /// # Errors
    /// Returns `ProviderError::Configuration` if the API key or host is missing.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::with_timeout(config.timeout, &config.user_agent)
            .map_err(|e| ProviderError::transport(e.to_string()))?;
        Self::new_with_transport(config, Arc::new(transport))
    }

    /// Create a client over an arbitrary transport.
    ///
    /// # Errors
    /// Returns `ProviderError::Configuration` if the API key or host is missing.
    pub fn new_with_transport(
        config: ProviderConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        config.validate()?;
        let rate_limiter =
            (config.requests_per_second > 0).then(|| ApiRateLimiter::new(config.requests_per_second));
        Ok(Self {
            transport,
            config,
            rate_limiter,
        })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Wait for rate limiter if one is configured.
    async fn wait_for_rate_limit(&self) {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }
    }

    /// Build the full request URL for an endpoint and query parameters.
    fn request_url(&self, endpoint: &Endpoint, params: &[(&str, &str)]) -> Result<String> {
        let base = self.config.endpoints.url_for(endpoint)?;
        let url = if params.is_empty() {
            reqwest::Url::parse(&base)
        } else {
            reqwest::Url::parse_with_params(&base, params)
        }
        .map_err(|e| {
            ProviderError::configuration(format!(
                "invalid URL for {}: {} ({})",
                endpoint.family(),
                base,
                e
            ))
        })?;
        Ok(url.to_string())
    }

    /// Fetch one endpoint and return the decoded JSON payload untouched.
    ///
    /// # Errors
    /// - `Configuration` if the endpoint has no usable URL (nothing is sent)
    /// - `Timeout` if the request exceeds the configured timeout
    /// - `RateLimited` on HTTP 429
    /// - `Provider` on any other non-2xx status
    /// - `Transport` on network failure
    /// - `Decode` if a 2xx body is not JSON
    pub async fn fetch(&self, endpoint: &Endpoint, params: &[(&str, &str)]) -> Result<Value> {
        let url = self.request_url(endpoint, params)?;

        self.wait_for_rate_limit().await;

        let request = HttpRequest {
            url: url.clone(),
            headers: vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("x-rapidapi-key".to_string(), self.config.api_key.clone()),
                ("x-rapidapi-host".to_string(), self.config.host.clone()),
            ],
        };

        tracing::debug!(endpoint = %endpoint, url = %url, "Fetching from provider");

        let response = match tokio::time::timeout(self.config.timeout, self.transport.send(request))
            .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(HttpError::Timeout)) | Err(_) => {
                tracing::warn!(endpoint = %endpoint, timeout = ?self.config.timeout, "Provider request timed out");
                return Err(ProviderError::Timeout {
                    url,
                    timeout: self.config.timeout,
                });
            }
            Ok(Err(e)) => return Err(ProviderError::transport(e.to_string())),
        };

        classify_response(endpoint, response)
    }
}

/// Map a raw HTTP response onto the provider error taxonomy.
fn classify_response(endpoint: &Endpoint, response: HttpResponse) -> Result<Value> {
    if response.status == 429 {
        let retry_after = response
            .header("retry-after")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        tracing::warn!(endpoint = %endpoint, retry_after = ?retry_after, "Provider rate limit hit");
        return Err(ProviderError::RateLimited { retry_after });
    }

    if !response.is_success() {
        let body = String::from_utf8_lossy(&response.body).trim().to_string();
        let body = (!body.is_empty()).then(|| body.chars().take(MAX_ERROR_BODY_CHARS).collect());
        tracing::warn!(endpoint = %endpoint, status = response.status, "Provider returned an error status");
        return Err(ProviderError::Provider {
            status: response.status,
            body,
        });
    }

    serde_json::from_slice(&response.body).map_err(|e| ProviderError::Decode {
        message: e.to_string(),
    })
}
