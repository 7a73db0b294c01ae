//! Sports-data provider client.
//!
//! This module owns every outbound call to the provider: authentication
//! headers, the request timeout, proactive pacing, and classification of
//! failures into [`ProviderError`].
//!
//! # Module Structure
//!
//! - [`config`] - Explicit configuration validated when the client is built
//! - [`client`] - The [`ProviderClient`] itself
//! - [`error`] - Error taxonomy and HTTP status classes
//! - [`rate_limit`] - Shared `governor` limiter
//!
//! # Example
//!
//! ```ignore
//! use pitchside::provider::{Endpoint, EndpointUrls, ProviderClient, ProviderConfig};
//!
//! let config = ProviderConfig::new(api_key, "cricbuzz-cricket.p.rapidapi.com", urls);
//! let client = ProviderClient::new(config)?;
//! let payload = client.fetch(&Endpoint::MatchesRecent, &[]).await?;
//! ```

mod client;
pub mod config;
mod error;
mod rate_limit;

pub use client::ProviderClient;
pub use config::{
    DEFAULT_REQUESTS_PER_SECOND, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, Endpoint, EndpointUrls,
    ProviderConfig,
};
pub use error::{ProviderError, Result, short_error_message};
pub use rate_limit::ApiRateLimiter;
