//! Team records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{NormalizationError, Result};
use super::probe::{self, FieldProbe, FieldProbe::Key};
use crate::entity::collection::Collection;

/// Canonical team document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Team {
    pub team_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub team_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub team_short_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_name: Option<String>,
    /// Aggregate statistics, passed through as the provider sent them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<Value>,
}

const TEAM_ID: &[FieldProbe] = &[Key("teamId"), Key("id")];
const NAME: &[FieldProbe] = &[Key("teamName"), Key("name")];
const SHORT_NAME: &[FieldProbe] = &[Key("teamSName"), Key("teamShortName"), Key("shortName")];
const IMAGE_ID: &[FieldProbe] = &[Key("imageId"), Key("img")];
const COUNTRY: &[FieldProbe] = &[Key("countryName"), Key("country")];
const STATS: &[FieldProbe] = &[Key("stats"), Key("teamStats")];

pub fn normalize(payload: &Value) -> Result<Team> {
    if !payload.is_object() {
        return Err(NormalizationError::not_an_object(Collection::Teams, payload));
    }
    let team_id = probe::id(payload, TEAM_ID)
        .ok_or_else(|| NormalizationError::missing_identifier(Collection::Teams, payload))?;

    Ok(Team {
        team_id,
        team_name: probe::text(payload, NAME),
        team_short_name: probe::text(payload, SHORT_NAME),
        image_id: probe::id(payload, IMAGE_ID),
        country_name: probe::opt_text(payload, COUNTRY),
        stats: probe::first(payload, STATS)
            .filter(|s| s.is_object() || s.is_array())
            .cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_team_from_list_entry() {
        let team = normalize(&json!({
            "teamId": 2,
            "teamName": "India",
            "teamSName": "IND",
            "imageId": 172115,
            "countryName": "India"
        }))
        .unwrap();
        assert_eq!(team.team_id, "2");
        assert_eq!(team.team_name, "India");
        assert_eq!(team.team_short_name, "IND");
        assert_eq!(team.image_id.as_deref(), Some("172115"));
        assert_eq!(team.country_name.as_deref(), Some("India"));
        assert_eq!(team.stats, None);
    }

    #[test]
    fn test_stats_pass_through_untouched() {
        let stats = json!({"played": 10, "won": 7, "nested": {"nrr": "+1.2"}});
        let team = normalize(&json!({"id": "9", "name": "England", "stats": stats})).unwrap();
        assert_eq!(team.stats, Some(stats));
    }

    #[test]
    fn test_header_rows_have_no_identifier() {
        let err = normalize(&json!({"teamName": "Test Teams"})).unwrap_err();
        assert!(matches!(err, NormalizationError::MissingIdentifier { .. }));
    }

    #[test]
    fn test_absent_fields_are_omitted_when_serialized() {
        let doc = serde_json::to_value(normalize(&json!({"teamId": 5})).unwrap()).unwrap();
        assert_eq!(doc, json!({"teamId": "5"}));
    }
}
