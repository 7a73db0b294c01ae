//! Error types for payload normalization.

use serde_json::Value;
use thiserror::Error;

use crate::entity::collection::Collection;

/// Maximum characters of the offending payload kept on an error.
pub const FRAGMENT_MAX_CHARS: usize = 200;

/// Structurally unusable provider payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationError {
    /// The payload (or listing entry) is not a JSON object.
    #[error("{kind} payload is not a JSON object: {fragment}")]
    NotAnObject { kind: Collection, fragment: String },

    /// No probe found a usable natural key.
    #[error("{kind} payload has no recognized identifier: {fragment}")]
    MissingIdentifier { kind: Collection, fragment: String },

    /// A listing response lacks the array that holds its entries.
    #[error("{kind} listing has no `{container}` array: {fragment}")]
    MissingContainer {
        kind: Collection,
        container: &'static str,
        fragment: String,
    },
}

impl NormalizationError {
    pub fn not_an_object(kind: Collection, payload: &Value) -> Self {
        Self::NotAnObject {
            kind,
            fragment: fragment_of(payload),
        }
    }

    pub fn missing_identifier(kind: Collection, payload: &Value) -> Self {
        Self::MissingIdentifier {
            kind,
            fragment: fragment_of(payload),
        }
    }

    pub fn missing_container(kind: Collection, container: &'static str, payload: &Value) -> Self {
        Self::MissingContainer {
            kind,
            container,
            fragment: fragment_of(payload),
        }
    }

    /// Record kind the payload was being normalized as.
    pub fn kind(&self) -> Collection {
        match self {
            Self::NotAnObject { kind, .. }
            | Self::MissingIdentifier { kind, .. }
            | Self::MissingContainer { kind, .. } => *kind,
        }
    }

    /// Truncated rendering of the offending payload.
    pub fn fragment(&self) -> &str {
        match self {
            Self::NotAnObject { fragment, .. }
            | Self::MissingIdentifier { fragment, .. }
            | Self::MissingContainer { fragment, .. } => fragment,
        }
    }
}

/// Render a payload as compact JSON, cut to [`FRAGMENT_MAX_CHARS`].
pub fn fragment_of(payload: &Value) -> String {
    let rendered = payload.to_string();
    if rendered.chars().count() <= FRAGMENT_MAX_CHARS {
        return rendered;
    }
    let mut truncated: String = rendered.chars().take(FRAGMENT_MAX_CHARS).collect();
    truncated.push_str("...");
    truncated
}

/// Result type for normalization.
pub type Result<T> = std::result::Result<T, NormalizationError>;
