//! Pitchside - cricket data ingestion and normalization.
//!
//! This library fetches raw payloads from a sports-data provider, normalizes
//! them into canonical match, team, player, series, news and photo records,
//! and upserts them into a document store keyed by each record's natural key.
//!
//! # Features
//!
//! - `sqlite` (default) / `postgres` - Database backend.
//! - `migrate` (default) - Enables database migration support. When enabled,
//!   you can use [`connect_and_migrate`] to run migrations on connection.
//!
//! # Example
//!
//! ```ignore
//! use pitchside::{connect_and_migrate, Collection, store};
//! use pitchside::provider::{ProviderClient, ProviderConfig};
//! use pitchside::sync::Orchestrator;
//!
//! let db = Arc::new(connect_and_migrate("sqlite://pitchside.db?mode=rwc").await?);
//! let client = ProviderClient::new(config)?;
//!
//! let report = Orchestrator::new(client, Arc::clone(&db)).run_all(None).await;
//! println!("{} jobs failed", report.failed());
//!
//! let live = store::find_recent(&db, Collection::Matches, 20).await?;
//! ```

pub mod db;
pub mod entity;
pub mod http;
pub mod normalize;
pub mod provider;
pub mod retry;
pub mod store;
pub mod sync;

#[cfg(feature = "migrate")]
pub mod migration;

pub use db::connect;
#[cfg(feature = "migrate")]
pub use db::connect_and_migrate;
pub use entity::prelude::*;
pub use normalize::{CanonicalRecord, NormalizationError, Record};
pub use provider::{ProviderClient, ProviderConfig, ProviderError};
pub use store::{PersistResult, StoreError};
pub use sync::{Orchestrator, SyncError, SyncKind, SyncReport};
