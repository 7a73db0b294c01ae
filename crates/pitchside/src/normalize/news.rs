//! News story records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{NormalizationError, Result};
use super::probe::{self, FieldProbe, FieldProbe::Key};
use crate::entity::collection::Collection;

/// Canonical news document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewsStory {
    pub story_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub headline: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub intro: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub story_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    /// Series or match the story belongs to.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub context: String,
}

const STORY_ID: &[FieldProbe] = &[Key("storyId"), Key("id")];
const HEADLINE: &[FieldProbe] = &[Key("hline"), Key("headline"), Key("title")];
const INTRO: &[FieldProbe] = &[Key("intro"), Key("summary")];
const PUBLISHED: &[FieldProbe] = &[Key("pubTime"), Key("publishedAt"), Key("publishTime")];
const SOURCE: &[FieldProbe] = &[Key("source")];
const STORY_TYPE: &[FieldProbe] = &[Key("storyType"), Key("type")];
const IMAGE_ID: &[FieldProbe] = &[Key("imageId"), Key("coverImageId")];
const CONTEXT: &[FieldProbe] = &[Key("context")];

pub fn normalize(payload: &Value) -> Result<NewsStory> {
    if !payload.is_object() {
        return Err(NormalizationError::not_an_object(Collection::News, payload));
    }
    let story_id = probe::id(payload, STORY_ID)
        .ok_or_else(|| NormalizationError::missing_identifier(Collection::News, payload))?;

    Ok(NewsStory {
        story_id,
        headline: probe::text(payload, HEADLINE),
        intro: probe::text(payload, INTRO),
        published_at: probe::timestamp(payload, PUBLISHED),
        source: probe::text(payload, SOURCE),
        story_type: probe::text(payload, STORY_TYPE),
        image_id: probe::id(payload, IMAGE_ID),
        context: probe::text(payload, CONTEXT),
    })
}
