//! Photo metadata records.
//!
//! Related keys are soft references and are never checked against other
//! collections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{NormalizationError, Result};
use super::probe::{self, FieldProbe, FieldProbe::Key};
use crate::entity::collection::Collection;

/// Canonical photo document.
///
/// `lastAccessed` is maintained by the store's photo read path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Photo {
    pub photo_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub caption: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub credit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub format: String,
    /// Size in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_news: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_matches: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_players: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_teams: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_date: Option<DateTime<Utc>>,
}

const PHOTO_ID: &[FieldProbe] = &[Key("photoId"), Key("imageId"), Key("id")];
const URL: &[FieldProbe] = &[Key("url"), Key("imageUrl"), Key("src")];
const CAPTION: &[FieldProbe] = &[Key("caption"), Key("title")];
const CREDIT: &[FieldProbe] = &[Key("credit"), Key("photographer")];
const WIDTH: &[FieldProbe] = &[Key("width"), Key("w")];
const HEIGHT: &[FieldProbe] = &[Key("height"), Key("h")];
const FORMAT: &[FieldProbe] = &[Key("format"), Key("contentType")];
const SIZE: &[FieldProbe] = &[Key("size"), Key("bytes")];
const TAGS: &[FieldProbe] = &[Key("tags"), Key("tag")];
const RELATED_NEWS: &[FieldProbe] = &[Key("relatedNews"), Key("newsIds")];
const RELATED_MATCHES: &[FieldProbe] = &[Key("relatedMatches"), Key("matchIds")];
const RELATED_PLAYERS: &[FieldProbe] = &[Key("relatedPlayers"), Key("playerIds")];
const RELATED_TEAMS: &[FieldProbe] = &[Key("relatedTeams"), Key("teamIds")];
const UPLOADED: &[FieldProbe] = &[Key("uploadedDate"), Key("uploadedAt"), Key("timestamp")];

pub fn normalize(payload: &Value) -> Result<Photo> {
    if !payload.is_object() {
        return Err(NormalizationError::not_an_object(Collection::Photos, payload));
    }
    let photo_id = probe::id(payload, PHOTO_ID)
        .ok_or_else(|| NormalizationError::missing_identifier(Collection::Photos, payload))?;

    Ok(Photo {
        photo_id,
        url: probe::text(payload, URL),
        caption: probe::text(payload, CAPTION),
        credit: probe::text(payload, CREDIT),
        width: probe::opt_count(payload, WIDTH),
        height: probe::opt_count(payload, HEIGHT),
        format: probe::text(payload, FORMAT),
        size: probe::opt_count(payload, SIZE),
        tags: probe::text_list(payload, TAGS),
        related_news: probe::id_list(payload, RELATED_NEWS),
        related_matches: probe::id_list(payload, RELATED_MATCHES),
        related_players: probe::id_list(payload, RELATED_PLAYERS),
        related_teams: probe::id_list(payload, RELATED_TEAMS),
        uploaded_date: probe::timestamp(payload, UPLOADED),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_photo_with_relations() {
        let photo = normalize(&json!({
            "photoId": 338542,
            "url": "https://static.example.com/i/338542.jpg",
            "caption": "Ollie Pope sweeps",
            "credit": "BCCI",
            "width": 1200,
            "height": "800",
            "format": "jpg",
            "tags": ["Ollie Pope", {"itemName": "England"}],
            "relatedNews": [129845],
            "relatedMatches": ["89654"],
            "relatedPlayers": [{"id": 8989}],
            "relatedTeams": "2,9"
        }))
        .unwrap();
        assert_eq!(photo.photo_id, "338542");
        assert_eq!(photo.width, Some(1200));
        assert_eq!(photo.height, Some(800));
        assert_eq!(photo.size, None);
        assert_eq!(photo.tags, vec!["Ollie Pope", "England"]);
        assert_eq!(photo.related_news, vec!["129845"]);
        assert_eq!(photo.related_players, vec!["8989"]);
        assert_eq!(photo.related_teams, vec!["2", "9"]);
    }

    #[test]
    fn test_dangling_relations_are_kept() {
        let photo = normalize(&json!({"photoId": 1, "relatedMatches": [999999999]})).unwrap();
        assert_eq!(photo.related_matches, vec!["999999999"]);
    }
}
