//! Player profile records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{NormalizationError, Result};
use super::probe::{self, FieldProbe, FieldProbe::Key};
use crate::entity::collection::Collection;

/// Canonical player document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Player {
    pub player_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub nick_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub role: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub batting_style: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub bowling_style: String,
    /// Name of the player's international side.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub team: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    /// Free text as the provider writes it ("November 05, 1988").
    #[serde(skip_serializing_if = "String::is_empty")]
    pub date_of_birth: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub birth_place: String,
}

const PLAYER_ID: &[FieldProbe] = &[Key("playerId"), Key("id")];
const NAME: &[FieldProbe] = &[Key("name"), Key("fullName")];
const NICK_NAME: &[FieldProbe] = &[Key("nickName"), Key("nickname")];
const ROLE: &[FieldProbe] = &[Key("role")];
const BATTING_STYLE: &[FieldProbe] = &[Key("bat"), Key("battingStyle")];
const BOWLING_STYLE: &[FieldProbe] = &[Key("bowl"), Key("bowlingStyle")];
const TEAM: &[FieldProbe] = &[Key("intlTeam"), Key("teamName"), Key("team")];
const IMAGE_ID: &[FieldProbe] = &[Key("faceImageId"), Key("imageId")];
const DATE_OF_BIRTH: &[FieldProbe] = &[Key("DoB"), Key("dob"), Key("dateOfBirth")];
const BIRTH_PLACE: &[FieldProbe] = &[Key("birthPlace"), Key("birthplace")];

pub fn normalize(payload: &Value) -> Result<Player> {
    if !payload.is_object() {
        return Err(NormalizationError::not_an_object(Collection::Players, payload));
    }
    let player_id = probe::id(payload, PLAYER_ID)
        .ok_or_else(|| NormalizationError::missing_identifier(Collection::Players, payload))?;

    Ok(Player {
        player_id,
        name: probe::text(payload, NAME),
        nick_name: probe::text(payload, NICK_NAME),
        role: probe::text(payload, ROLE),
        batting_style: probe::text(payload, BATTING_STYLE),
        bowling_style: probe::text(payload, BOWLING_STYLE),
        team: probe::text(payload, TEAM),
        image_id: probe::id(payload, IMAGE_ID),
        date_of_birth: probe::text(payload, DATE_OF_BIRTH),
        birth_place: probe::text(payload, BIRTH_PLACE),
    })
}
