//! Shape normalizer: raw provider payloads to canonical records.
//!
//! Normalization is pure. The same payload always produces the same record,
//! absent fields become zero values, and only structurally unusable input
//! (not an object, or no identifier) is an error.
//!
//! # Module Structure
//!
//! - [`probe`] - Precedence-ordered field probes
//! - [`status`] - Match status table and live-flag derivation
//! - [`listing`] - Listing splitters
//! - [`matches`], [`teams`], [`players`], [`series`], [`news`], [`photos`] -
//!   One canonical record type each
//!
//! # Example
//!
//! ```ignore
//! use pitchside::normalize::{self, listing};
//! use pitchside::Collection;
//!
//! for item in listing::split_listing(Collection::Matches, &payload)? {
//!     let record = normalize::normalize_item(Collection::Matches, &item)?;
//!     println!("{} -> {}", record.kind(), record.natural_key());
//! }
//! ```

mod error;
pub mod listing;
pub mod matches;
pub mod news;
pub mod photos;
pub mod players;
pub mod probe;
pub mod series;
pub mod status;
pub mod teams;

use serde_json::{Map, Value};

pub use error::{FRAGMENT_MAX_CHARS, NormalizationError, Result, fragment_of};
pub use listing::{ListingContext, ListingItem};
pub use matches::{Innings, Match, MatchTeam, Score};
pub use news::NewsStory;
pub use photos::Photo;
pub use players::Player;
pub use series::Series;
pub use status::MatchPhase;
pub use teams::Team;

use crate::entity::collection::Collection;
use crate::entity::document_index::IndexField;

/// A canonical record of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Match(Match),
    Team(Team),
    Player(Player),
    Series(Series),
    News(NewsStory),
    Photo(Photo),
}

/// Normalizer output: the canonical record plus the untouched raw fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    pub record: Record,
    pub raw: Value,
}

impl CanonicalRecord {
    pub fn kind(&self) -> Collection {
        match &self.record {
            Record::Match(_) => Collection::Matches,
            Record::Team(_) => Collection::Teams,
            Record::Player(_) => Collection::Players,
            Record::Series(_) => Collection::Series,
            Record::News(_) => Collection::News,
            Record::Photo(_) => Collection::Photos,
        }
    }

    pub fn natural_key(&self) -> &str {
        match &self.record {
            Record::Match(m) => &m.match_id,
            Record::Team(t) => &t.team_id,
            Record::Player(p) => &p.player_id,
            Record::Series(s) => &s.series_id,
            Record::News(n) => &n.story_id,
            Record::Photo(p) => &p.photo_id,
        }
    }

    /// Canonical fields as a JSON object, empty top-level fields omitted.
    pub fn to_document(&self) -> serde_json::Result<Map<String, Value>> {
        let value = match &self.record {
            Record::Match(m) => serde_json::to_value(m)?,
            Record::Team(t) => serde_json::to_value(t)?,
            Record::Player(p) => serde_json::to_value(p)?,
            Record::Series(s) => serde_json::to_value(s)?,
            Record::News(n) => serde_json::to_value(n)?,
            Record::Photo(p) => serde_json::to_value(p)?,
        };
        match value {
            Value::Object(map) => Ok(map),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                Ok(map)
            }
        }
    }

    /// Bring derived fields of a merged document back in line with the
    /// fields they derive from. Only matches have any.
    pub fn reconcile(&self, doc: &mut Map<String, Value>) {
        if let Record::Match(_) = &self.record {
            matches::reconcile_status(doc, matches::live_flag(&self.raw));
        }
    }

    /// Secondary index rows for this record.
    pub fn index_entries(&self) -> Vec<(IndexField, String)> {
        let mut entries = Vec::new();
        let mut push = |field: IndexField, value: &str| {
            if !value.is_empty() && !entries.iter().any(|(f, v)| *f == field && v == value) {
                entries.push((field, value.to_string()));
            }
        };

        match &self.record {
            Record::Match(m) => {
                push(IndexField::Series, &m.series_id);
                push(IndexField::MatchType, &m.match_type);
                for team in &m.teams {
                    push(IndexField::Team, &team.team_id);
                }
            }
            Record::Team(t) => {
                if let Some(country) = &t.country_name {
                    push(IndexField::Country, country);
                }
            }
            Record::Player(p) => push(IndexField::Team, &p.team),
            Record::Series(s) => {
                push(IndexField::Month, &s.month);
                for id in &s.match_ids {
                    push(IndexField::Match, id);
                }
            }
            Record::News(n) => push(IndexField::StoryType, &n.story_type),
            Record::Photo(p) => {
                for tag in &p.tags {
                    push(IndexField::Tag, tag);
                }
                for id in &p.related_news {
                    push(IndexField::News, id);
                }
                for id in &p.related_matches {
                    push(IndexField::Match, id);
                }
                for id in &p.related_players {
                    push(IndexField::Player, id);
                }
                for id in &p.related_teams {
                    push(IndexField::Team, id);
                }
            }
        }
        entries
    }
}

/// Normalize a single-entity payload.
///
/// # Errors
/// `NormalizationError` if the payload is not an object or has no identifier.
pub fn normalize(kind: Collection, payload: &Value) -> Result<CanonicalRecord> {
    normalize_with_context(kind, payload, &ListingContext::default())
}

/// Normalize one listing entry.
pub fn normalize_item(kind: Collection, item: &ListingItem<'_>) -> Result<CanonicalRecord> {
    normalize_with_context(kind, item.fragment, &item.context)
}

/// Normalize a payload, filling gaps from its listing context.
pub fn normalize_with_context(
    kind: Collection,
    payload: &Value,
    context: &ListingContext,
) -> Result<CanonicalRecord> {
    let record = match kind {
        Collection::Matches => Record::Match(matches::normalize(payload, context)?),
        Collection::Teams => Record::Team(teams::normalize(payload)?),
        Collection::Players => Record::Player(players::normalize(payload)?),
        Collection::Series => Record::Series(series::normalize(payload, context)?),
        Collection::News => Record::News(news::normalize(payload)?),
        Collection::Photos => Record::Photo(photos::normalize(payload)?),
    };
    Ok(CanonicalRecord {
        record,
        raw: payload.clone(),
    })
}
