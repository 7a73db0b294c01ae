use thiserror::Error;

use crate::normalize::NormalizationError;
use crate::provider::ProviderError;
use crate::store::StoreError;

/// Any failure inside a sync job.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Normalization failed: {0}")]
    Normalization(#[from] NormalizationError),

    #[error("Persistence failed: {0}")]
    Store(#[from] StoreError),
}

impl SyncError {
    /// Taxonomy name reported for this failure.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Provider(e) => e.reason(),
            Self::Normalization(_) => "NormalizationError",
            Self::Store(_) => "PersistenceError",
        }
    }

    /// Short message for progress output and report rows.
    pub fn short_message(&self) -> String {
        match self {
            Self::Provider(e) => crate::provider::short_error_message(e),
            Self::Normalization(e) => e.to_string(),
            Self::Store(e) => e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
