//! Configuration file support for pitchside.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (`PITCHSIDE_` prefix, `__` between sections,
//!    e.g. `PITCHSIDE_PROVIDER__ENDPOINTS__NEWS`), plus the shortcuts
//!    `PITCHSIDE_API_KEY`, `PITCHSIDE_HOST` and `PITCHSIDE_DATABASE_URL`
//! 3. Config file (./pitchside.toml, then ~/.config/pitchside/config.toml)
//! 4. Built-in defaults
//!
//! The database URL defaults to `sqlite://~/.local/state/pitchside/pitchside.db` on Linux
//! (using the XDG state directory) if not explicitly configured.
//!
//! Example config file:
//! ```toml
//! [database]
//! url = "sqlite://~/.local/state/pitchside/pitchside.db"  # optional, this is the default
//!
//! [provider]
//! api_key = "..."  # or use PITCHSIDE_API_KEY
//! host = "cricbuzz-cricket.p.rapidapi.com"
//! timeout_secs = 12
//! requests_per_second = 2
//!
//! [provider.endpoints]
//! teams = "https://cricbuzz-cricket.p.rapidapi.com/teams/v1/international"
//! news = "https://cricbuzz-cricket.p.rapidapi.com/news/v1/index"
//! matches_recent = "https://cricbuzz-cricket.p.rapidapi.com/matches/v1/recent"
//! matches_upcoming = "https://cricbuzz-cricket.p.rapidapi.com/matches/v1/upcoming"
//! series = "https://cricbuzz-cricket.p.rapidapi.com/series/v1/international"
//! player = "https://cricbuzz-cricket.p.rapidapi.com/stats/v1/player/{id}"
//!
//! [sync]
//! retries = 0
//! upsert_retries = 3
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use pitchside::provider::{
    DEFAULT_REQUESTS_PER_SECOND, DEFAULT_TIMEOUT, EndpointUrls, ProviderConfig,
};
use pitchside::sync::SyncOptions;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub provider: ProviderSettings,
    pub sync: SyncConfig,
}

/// Database configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL.
    /// Supports sqlite:// and postgres:// schemes.
    pub url: Option<String>,
}

/// Provider access settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub host: Option<String>,
    pub timeout_secs: u64,
    pub requests_per_second: u32,
    pub endpoints: EndpointUrls,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            host: None,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            endpoints: EndpointUrls::default(),
        }
    }
}

/// Default sync options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Fetch retries for timeouts and transport errors. 0 disables retry.
    pub retries: u32,
    /// Retries for a locked or busy database per record.
    pub upsert_retries: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            retries: 0,
            upsert_retries: pitchside::store::DEFAULT_UPSERT_RETRIES,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/pitchside/config.toml)
    /// 3. Local config file (./pitchside.toml)
    /// 4. Environment variables with PITCHSIDE_ prefix
    /// 5. Shortcut environment variables
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(proj_dirs) = ProjectDirs::from("", "", "pitchside") {
            let xdg_config = proj_dirs.config_dir().join("config.toml");
            if xdg_config.exists() {
                tracing::debug!("Loading config from {:?}", xdg_config);
                builder = builder.add_source(
                    File::from(xdg_config)
                        .format(FileFormat::Toml)
                        .required(false),
                );
            }
        }

        let local_config = PathBuf::from("pitchside.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./pitchside.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // e.g., PITCHSIDE_PROVIDER__API_KEY -> provider.api_key
        builder = builder.add_source(
            Environment::with_prefix("PITCHSIDE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        match Self::apply_shortcuts(builder).and_then(|b| b.build()) {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    fn apply_shortcuts(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        builder
            .set_override_option("provider.api_key", std::env::var("PITCHSIDE_API_KEY").ok())?
            .set_override_option("provider.host", std::env::var("PITCHSIDE_HOST").ok())?
            .set_override_option("database.url", std::env::var("PITCHSIDE_DATABASE_URL").ok())
    }

    /// Get the database URL, falling back to the default state directory path.
    ///
    /// The `mode=rwc` parameter enables read-write access and creates the file if it doesn't exist.
    pub fn database_url(&self) -> Option<String> {
        self.database.url.clone().or_else(|| {
            Self::default_state_dir().map(|state_dir| {
                let db_path = state_dir.join("pitchside.db");
                format!("sqlite://{}?mode=rwc", db_path.display())
            })
        })
    }

    /// Provider configuration, unvalidated; the client validates it.
    pub fn provider_config(&self, no_rate_limit: bool) -> ProviderConfig {
        let provider = &self.provider;
        let rps = if no_rate_limit {
            0
        } else {
            provider.requests_per_second
        };
        ProviderConfig::new(
            provider.api_key.clone().unwrap_or_default(),
            provider.host.clone().unwrap_or_default(),
            provider.endpoints.clone(),
        )
        .with_timeout(Duration::from_secs(provider.timeout_secs))
        .with_requests_per_second(rps)
    }

    /// Sync options, with an optional override of the fetch retry count.
    pub fn sync_options(&self, retries: Option<u32>) -> SyncOptions {
        SyncOptions {
            upsert_retries: self.sync.upsert_retries,
            ..SyncOptions::default()
        }
        .with_retries(retries.unwrap_or(self.sync.retries))
    }

    /// Get the default state directory path.
    ///
    /// On Linux, this is `$XDG_STATE_HOME/pitchside` or `~/.local/state/pitchside`.
    /// On macOS/Windows, falls back to the data directory.
    pub fn default_state_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "pitchside").map(|dirs| {
            dirs.state_dir()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| dirs.data_dir().to_path_buf())
        })
    }
}
