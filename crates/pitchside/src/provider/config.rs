//! Provider configuration, validated once when the client is built.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use super::error::{ProviderError, Result};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(12);

/// Default proactive request rate against the provider.
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 2;

/// Default User-Agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("pitchside/", env!("CARGO_PKG_VERSION"));

/// A provider endpoint family, optionally carrying an entity id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Teams,
    News,
    MatchesRecent,
    MatchesUpcoming,
    Series,
    /// Single player profile; the URL template's `{id}` is replaced.
    Player(String),
    /// Single photo; the URL template's `{id}` is replaced.
    Photo(String),
}

impl Endpoint {
    /// Configuration key of the endpoint family.
    pub fn family(&self) -> &'static str {
        match self {
            Endpoint::Teams => "teams",
            Endpoint::News => "news",
            Endpoint::MatchesRecent => "matches_recent",
            Endpoint::MatchesUpcoming => "matches_upcoming",
            Endpoint::Series => "series",
            Endpoint::Player(_) => "player",
            Endpoint::Photo(_) => "photo",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Player(id) | Endpoint::Photo(id) => write!(f, "{}:{}", self.family(), id),
            _ => f.write_str(self.family()),
        }
    }
}

/// One URL per endpoint family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EndpointUrls {
    pub teams: Option<String>,
    pub news: Option<String>,
    pub matches_recent: Option<String>,
    pub matches_upcoming: Option<String>,
    pub series: Option<String>,
    /// Template containing `{id}`.
    pub player: Option<String>,
    /// Template containing `{id}`.
    pub photo: Option<String>,
}

impl EndpointUrls {
    /// Resolve the URL for an endpoint. Entity ids are percent-encoded before
    /// they replace `{id}`, so an id cannot add path segments or a query.
    ///
    /// # Errors
    /// Returns `ProviderError::Configuration` when the family has no URL, or
    /// for an empty entity id.
    pub fn url_for(&self, endpoint: &Endpoint) -> Result<String> {
        let configured = match endpoint {
            Endpoint::Teams => &self.teams,
            Endpoint::News => &self.news,
            Endpoint::MatchesRecent => &self.matches_recent,
            Endpoint::MatchesUpcoming => &self.matches_upcoming,
            Endpoint::Series => &self.series,
            Endpoint::Player(_) => &self.player,
            Endpoint::Photo(_) => &self.photo,
        };

        let url = configured
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                ProviderError::configuration(format!("no URL configured for {}", endpoint.family()))
            })?;

        match endpoint {
            Endpoint::Player(id) | Endpoint::Photo(id) => {
                if !url.contains("{id}") {
                    return Err(ProviderError::configuration(format!(
                        "{} URL must contain an {{id}} placeholder",
                        endpoint.family()
                    )));
                }
                if id.trim().is_empty() {
                    return Err(ProviderError::configuration(format!(
                        "{} id must not be empty",
                        endpoint.family()
                    )));
                }
                let encoded: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();
                Ok(url.replace("{id}", &encoded))
            }
            _ => Ok(url.to_string()),
        }
    }
}

/// Everything the provider client needs, passed in explicitly.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// API key sent as `x-rapidapi-key`.
    pub api_key: String,
    /// Host identifier sent as `x-rapidapi-host`.
    pub host: String,
    pub endpoints: EndpointUrls,
    pub timeout: Duration,
    /// Proactive pacing; 0 disables the limiter.
    pub requests_per_second: u32,
    pub user_agent: String,
}

// Hand-written so the API key never lands in logs.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("host", &self.host)
            .field("endpoints", &self.endpoints)
            .field("timeout", &self.timeout)
            .field("requests_per_second", &self.requests_per_second)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ProviderConfig {
    /// Create a configuration with default timeout and pacing.
    pub fn new(api_key: impl Into<String>, host: impl Into<String>, endpoints: EndpointUrls) -> Self {
        Self {
            api_key: api_key.into(),
            host: host.into(),
            endpoints,
            timeout: DEFAULT_TIMEOUT,
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_requests_per_second(mut self, rps: u32) -> Self {
        self.requests_per_second = rps;
        self
    }

    /// Check the secrets every request depends on.
    ///
    /// Endpoint URLs are checked per request so that one missing family only
    /// fails the calls that need it.
    ///
    /// # Errors
    /// Returns `ProviderError::Configuration` naming the first missing value.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::configuration("provider API key is not set"));
        }
        if self.host.trim().is_empty() {
            return Err(ProviderError::configuration("provider host is not set"));
        }
        if self.timeout.is_zero() {
            return Err(ProviderError::configuration("request timeout must be non-zero"));
        }
        Ok(())
    }
}
