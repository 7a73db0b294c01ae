//! DocumentIndex entity - secondary index rows for documents.
//!
//! Rows are keyed by `(collection, natural_key)` rather than by document id so
//! they can be rebuilt from a canonical record alone.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::collection::Collection;

/// Indexed attribute of a document.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum IndexField {
    /// Photo tag.
    #[sea_orm(string_value = "tag")]
    Tag,
    /// Series membership or reference.
    #[sea_orm(string_value = "series")]
    Series,
    /// Team participation or reference.
    #[sea_orm(string_value = "team")]
    Team,
    /// Match reference.
    #[sea_orm(string_value = "match")]
    Match,
    /// News story reference.
    #[sea_orm(string_value = "news")]
    News,
    /// Player reference.
    #[sea_orm(string_value = "player")]
    Player,
    #[sea_orm(string_value = "match_type")]
    MatchType,
    #[sea_orm(string_value = "country")]
    Country,
    #[sea_orm(string_value = "story_type")]
    StoryType,
    /// Series month label.
    #[sea_orm(string_value = "month")]
    Month,
}

impl std::fmt::Display for IndexField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IndexField::Tag => "tag",
            IndexField::Series => "series",
            IndexField::Team => "team",
            IndexField::Match => "match",
            IndexField::News => "news",
            IndexField::Player => "player",
            IndexField::MatchType => "match_type",
            IndexField::Country => "country",
            IndexField::StoryType => "story_type",
            IndexField::Month => "month",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for IndexField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "tag" => Ok(IndexField::Tag),
            "series" => Ok(IndexField::Series),
            "team" => Ok(IndexField::Team),
            "match" => Ok(IndexField::Match),
            "news" => Ok(IndexField::News),
            "player" => Ok(IndexField::Player),
            "match_type" => Ok(IndexField::MatchType),
            "country" => Ok(IndexField::Country),
            "story_type" => Ok(IndexField::StoryType),
            "month" => Ok(IndexField::Month),
            _ => Err(format!("Unknown index field: {}", s)),
        }
    }
}

/// DocumentIndex model - one `(field, value)` pair of one document.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "document_index")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub collection: Collection,
    pub natural_key: String,
    pub field: IndexField,
    pub value: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
