//! Collection enum naming each kind of stored document.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Document collections, one per canonical record kind.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    #[sea_orm(string_value = "matches")]
    Matches,
    #[sea_orm(string_value = "teams")]
    Teams,
    #[sea_orm(string_value = "players")]
    Players,
    #[sea_orm(string_value = "series")]
    Series,
    #[sea_orm(string_value = "news")]
    News,
    #[sea_orm(string_value = "photos")]
    Photos,
}

impl Collection {
    /// Name of the natural key field inside documents of this collection.
    pub fn key_field(self) -> &'static str {
        match self {
            Collection::Matches => "matchId",
            Collection::Teams => "teamId",
            Collection::Players => "playerId",
            Collection::Series => "seriesId",
            Collection::News => "storyId",
            Collection::Photos => "photoId",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Matches => "matches",
            Collection::Teams => "teams",
            Collection::Players => "players",
            Collection::Series => "series",
            Collection::News => "news",
            Collection::Photos => "photos",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "matches" | "match" => Ok(Collection::Matches),
            "teams" | "team" => Ok(Collection::Teams),
            "players" | "player" => Ok(Collection::Players),
            "series" => Ok(Collection::Series),
            "news" | "story" | "stories" => Ok(Collection::News),
            "photos" | "photo" => Ok(Collection::Photos),
            _ => Err(format!("Unknown collection: {}", s)),
        }
    }
}
