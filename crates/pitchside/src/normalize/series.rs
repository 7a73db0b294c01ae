//! Series records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{NormalizationError, Result};
use super::listing::ListingContext;
use super::probe::{self, FieldProbe, FieldProbe::Key};
use crate::entity::collection::Collection;

/// Canonical series document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Series {
    pub series_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub series_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    /// Month group label from the series listing ("JANUARY 2024").
    #[serde(skip_serializing_if = "String::is_empty")]
    pub month: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub match_ids: Vec<String>,
}

const SERIES_ID: &[FieldProbe] = &[Key("seriesId"), Key("id")];
const NAME: &[FieldProbe] = &[Key("seriesName"), Key("name")];
const START: &[FieldProbe] = &[Key("startDt"), Key("startDate")];
const END: &[FieldProbe] = &[Key("endDt"), Key("endDate")];
const MONTH: &[FieldProbe] = &[Key("month"), Key("date")];
const MATCH_IDS: &[FieldProbe] = &[Key("matchIds"), Key("matches")];

pub fn normalize(payload: &Value, context: &ListingContext) -> Result<Series> {
    if !payload.is_object() {
        return Err(NormalizationError::not_an_object(Collection::Series, payload));
    }
    let series_id = probe::id(payload, SERIES_ID)
        .ok_or_else(|| NormalizationError::missing_identifier(Collection::Series, payload))?;

    Ok(Series {
        series_id,
        series_name: probe::text(payload, NAME),
        start_date: probe::timestamp(payload, START),
        end_date: probe::timestamp(payload, END),
        month: probe::opt_text(payload, MONTH)
            .or_else(|| context.month.clone())
            .unwrap_or_default(),
        match_ids: probe::id_list(payload, MATCH_IDS),
    })
}
