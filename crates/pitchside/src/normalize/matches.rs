//! Match records.
//!
//! A match payload may be a listing entry (`matchInfo` + `matchScore`), a
//! single-match response (`matchHeader` + one of several score containers), or
//! a flat object. Scores live under whichever of `matchScore`, `liveScore`,
//! `finalScore` or `score` the provider chose for the match's state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{NormalizationError, Result};
use super::listing::ListingContext;
use super::probe::{self, FieldProbe, FieldProbe::Key, FieldProbe::Path};
use super::status;
use crate::entity::collection::Collection;

/// Canonical match document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Match {
    pub match_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub state: String,
    pub is_live: bool,
    /// Always written so a recognized status clears an earlier diagnostic.
    pub status_note: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub match_format: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub match_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub series_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub series_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub venue: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub teams: Vec<MatchTeam>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scorecard: Option<Vec<Innings>>,
}

/// A participant in a match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchTeam {
    pub team_id: String,
    pub team_name: String,
    pub team_short_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    pub score: Score,
}

/// A team's current score; every field defaults to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Score {
    pub runs: u32,
    pub wickets: u32,
    /// Cricket notation: 19.4 is nineteen overs and four balls.
    pub overs: f64,
    pub balls: u32,
    pub run_rate: f64,
}

/// One innings of a scorecard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Innings {
    pub innings_id: u32,
    pub batting_team_id: String,
    pub runs: u32,
    pub wickets: u32,
    pub overs: f64,
    pub declared: bool,
    pub follow_on: bool,
}

const MATCH_ID: &[FieldProbe] = &[
    Path(&["matchInfo", "matchId"]),
    Key("matchId"),
    Path(&["matchHeader", "matchId"]),
    Key("id"),
];
const TITLE: &[FieldProbe] = &[Key("title"), Key("name"), Path(&["matchInfo", "title"])];
const DESCRIPTION: &[FieldProbe] = &[
    Path(&["matchInfo", "matchDesc"]),
    Key("matchDesc"),
    Path(&["matchHeader", "matchDescription"]),
];
const STATUS: &[FieldProbe] = &[
    Path(&["matchInfo", "status"]),
    Key("status"),
    Path(&["matchHeader", "status"]),
];
const STATE: &[FieldProbe] = &[
    Path(&["matchInfo", "state"]),
    Key("state"),
    Path(&["matchHeader", "state"]),
];
const LIVE_FLAG: &[FieldProbe] = &[
    Path(&["matchInfo", "isLive"]),
    Key("isLive"),
    Key("live"),
];
const FORMAT: &[FieldProbe] = &[
    Path(&["matchInfo", "matchFormat"]),
    Key("matchFormat"),
    Path(&["matchHeader", "matchFormat"]),
];
const MATCH_TYPE: &[FieldProbe] = &[
    Path(&["matchInfo", "matchType"]),
    Key("matchType"),
    Path(&["matchHeader", "matchType"]),
];
const SERIES_ID: &[FieldProbe] = &[
    Path(&["matchInfo", "seriesId"]),
    Key("seriesId"),
    Path(&["matchHeader", "seriesId"]),
];
const SERIES_NAME: &[FieldProbe] = &[
    Path(&["matchInfo", "seriesName"]),
    Key("seriesName"),
    Path(&["matchHeader", "seriesName"]),
];
const VENUE: &[FieldProbe] = &[Key("venue"), Path(&["matchInfo", "venue"])];
const VENUE_INFO: &[FieldProbe] = &[
    Path(&["matchInfo", "venueInfo"]),
    Key("venueInfo"),
    Path(&["matchHeader", "venueInfo"]),
];
const START: &[FieldProbe] = &[
    Path(&["matchInfo", "startDate"]),
    Key("startDate"),
    Key("startTime"),
    Path(&["matchHeader", "matchStartTimestamp"]),
];
const END: &[FieldProbe] = &[
    Path(&["matchInfo", "endDate"]),
    Key("endDate"),
    Key("endTime"),
    Path(&["matchHeader", "matchCompleteTimestamp"]),
];

/// Where each team slot's details live, in precedence order.
const TEAM_SLOTS: [&[FieldProbe]; 2] = [
    &[
        Path(&["matchInfo", "team1"]),
        Key("team1"),
        Path(&["matchHeader", "team1"]),
    ],
    &[
        Path(&["matchInfo", "team2"]),
        Key("team2"),
        Path(&["matchHeader", "team2"]),
    ],
];

/// Score containers per team slot, in precedence order.
const SCORE_CONTAINERS: [&[FieldProbe]; 2] = [
    &[
        Path(&["matchScore", "team1Score"]),
        Path(&["liveScore", "team1Score"]),
        Path(&["finalScore", "team1Score"]),
        Path(&["score", "team1Score"]),
    ],
    &[
        Path(&["matchScore", "team2Score"]),
        Path(&["liveScore", "team2Score"]),
        Path(&["finalScore", "team2Score"]),
        Path(&["score", "team2Score"]),
    ],
];

/// Innings keys inside a score container, most recent first.
const INNINGS_KEYS: [&str; 2] = ["inngs2", "inngs1"];

const TEAM_ID: &[FieldProbe] = &[Key("teamId"), Key("id")];
const TEAM_NAME: &[FieldProbe] = &[Key("teamName"), Key("name")];
const TEAM_SHORT_NAME: &[FieldProbe] = &[Key("teamSName"), Key("teamShortName"), Key("shortName")];
const IMAGE_ID: &[FieldProbe] = &[Key("imageId"), Key("img")];

const RUNS: &[FieldProbe] = &[Key("runs"), Key("r")];
const WICKETS: &[FieldProbe] = &[Key("wickets"), Key("wkts"), Key("w")];
const OVERS: &[FieldProbe] = &[Key("overs"), Key("o")];
const BALLS: &[FieldProbe] = &[Key("balls"), Key("b")];
const RUN_RATE: &[FieldProbe] = &[Key("runRate"), Key("rr"), Key("crr")];
const INNINGS_ID: &[FieldProbe] = &[Key("inningsId"), Key("inningsNum")];
const DECLARED: &[FieldProbe] = &[Key("isDeclared"), Key("declared")];
const FOLLOW_ON: &[FieldProbe] = &[Key("isFollowOn"), Key("followOn")];

/// The provider's own live flag, if the payload carries one.
pub fn live_flag(payload: &Value) -> Option<bool> {
    probe::flag(payload, LIVE_FLAG)
}

/// Recompute `isLive` and `statusNote` of a stored match document from its
/// `state` and `status` fields.
///
/// A partial update may carry a live flag without a status, or no status at
/// all; after a top-level merge the stored status is the one `isLive` must
/// follow.
pub fn reconcile_status(doc: &mut Map<String, Value>, explicit: Option<bool>) {
    let field = |name: &str| doc.get(name).and_then(Value::as_str).unwrap_or_default().to_string();
    let reading = status::classify(&field("state"), &field("status"));
    let is_live = status::derive_live(&reading, explicit);

    doc.insert("isLive".to_string(), Value::Bool(is_live));
    doc.insert(
        "statusNote".to_string(),
        reading.note.map_or(Value::Null, Value::String),
    );
}

/// Normalize a match payload.
pub fn normalize(payload: &Value, context: &ListingContext) -> Result<Match> {
    if !payload.is_object() {
        return Err(NormalizationError::not_an_object(Collection::Matches, payload));
    }
    let match_id = probe::id(payload, MATCH_ID)
        .ok_or_else(|| NormalizationError::missing_identifier(Collection::Matches, payload))?;

    let status_text = probe::text(payload, STATUS);
    let state = probe::text(payload, STATE);
    let reading = status::classify(&state, &status_text);
    let is_live = status::derive_live(&reading, live_flag(payload));

    let (teams, scorecard) = read_teams(payload);
    let title = probe::opt_text(payload, TITLE)
        .unwrap_or_else(|| synthesize_title(&teams, &probe::text(payload, DESCRIPTION)));

    Ok(Match {
        match_id,
        title,
        status: status_text,
        state,
        is_live,
        status_note: reading.note,
        match_format: probe::text(payload, FORMAT),
        match_type: probe::opt_text(payload, MATCH_TYPE)
            .or_else(|| context.match_type.clone())
            .unwrap_or_default(),
        series_id: probe::id(payload, SERIES_ID)
            .or_else(|| context.series_id.clone())
            .unwrap_or_default(),
        series_name: probe::opt_text(payload, SERIES_NAME)
            .or_else(|| context.series_name.clone())
            .unwrap_or_default(),
        venue: read_venue(payload),
        start_time: probe::timestamp(payload, START),
        end_time: probe::timestamp(payload, END),
        teams,
        scorecard: (!scorecard.is_empty()).then_some(scorecard),
    })
}

/// "India vs Australia, 1st Test", or whatever parts are present.
fn synthesize_title(teams: &[MatchTeam], description: &str) -> String {
    let names: Vec<&str> = teams
        .iter()
        .map(|t| t.team_name.as_str())
        .filter(|n| !n.is_empty())
        .collect();
    match (names.is_empty(), description.is_empty()) {
        (true, _) => description.to_string(),
        (false, true) => names.join(" vs "),
        (false, false) => format!("{}, {}", names.join(" vs "), description),
    }
}

fn read_venue(payload: &Value) -> String {
    if let Some(venue) = probe::opt_text(payload, VENUE) {
        return venue;
    }
    let Some(info) = probe::first(payload, VENUE_INFO) else {
        return String::new();
    };
    [Key("ground"), Key("city")]
        .iter()
        .filter_map(|p| p.lookup(info).and_then(probe::as_text))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read team slots with their current score, and every innings found.
fn read_teams(payload: &Value) -> (Vec<MatchTeam>, Vec<Innings>) {
    let mut teams = Vec::new();
    let mut innings = Vec::new();

    let slotted: Vec<(usize, &Value)> = TEAM_SLOTS
        .iter()
        .enumerate()
        .filter_map(|(slot, probes)| probe::first(payload, probes).map(|t| (slot, t)))
        .filter(|(_, t)| t.is_object())
        .collect();

    let entries: Vec<(Option<usize>, &Value)> = if slotted.is_empty() {
        payload
            .get("teams")
            .and_then(Value::as_array)
            .map(|list| list.iter().filter(|t| t.is_object()).map(|t| (None, t)).collect())
            .unwrap_or_default()
    } else {
        slotted.into_iter().map(|(slot, t)| (Some(slot), t)).collect()
    };

    for (slot, entry) in entries {
        let team_id = probe::id(entry, TEAM_ID).unwrap_or_default();
        let container = slot
            .and_then(|s| probe::first(payload, SCORE_CONTAINERS[s]))
            .or_else(|| entry.get("score").filter(|s| s.is_object()));

        let team_innings = container.map(read_innings).unwrap_or_default();
        let score = team_innings
            .first()
            .map(|(_, raw)| read_score(raw))
            .unwrap_or_default();

        // Oldest first for the scorecard.
        for (id, raw) in team_innings.iter().rev() {
            innings.push((*id, read_innings_record(raw, &team_id)));
        }

        teams.push(MatchTeam {
            team_name: probe::text(entry, TEAM_NAME),
            team_short_name: probe::text(entry, TEAM_SHORT_NAME),
            image_id: probe::id(entry, IMAGE_ID),
            team_id,
            score,
        });
    }

    // Stable sort keeps team order for innings without an id.
    innings.sort_by_key(|(id, _)| id.unwrap_or(u32::MAX));
    (teams, innings.into_iter().map(|(_, i)| i).collect())
}

/// Innings objects in a score container, most recent first.
///
/// A container that holds runs directly is treated as a single innings.
fn read_innings(container: &Value) -> Vec<(Option<u32>, &Value)> {
    let found: Vec<&Value> = INNINGS_KEYS
        .iter()
        .filter_map(|key| container.get(key))
        .filter(|v| v.is_object())
        .collect();

    let found = if found.is_empty() && probe::first(container, RUNS).is_some() {
        vec![container]
    } else {
        found
    };

    found
        .into_iter()
        .map(|raw| (probe::opt_count(raw, INNINGS_ID), raw))
        .collect()
}

fn read_score(innings: &Value) -> Score {
    let runs = probe::count(innings, RUNS);
    let overs = probe::decimal(innings, OVERS);
    let balls = probe::opt_count(innings, BALLS).unwrap_or_else(|| balls_from_overs(overs));
    let run_rate = probe::opt_decimal(innings, RUN_RATE).unwrap_or_else(|| run_rate(runs, balls));
    Score {
        runs,
        wickets: probe::count(innings, WICKETS),
        overs,
        balls,
        run_rate,
    }
}

fn read_innings_record(innings: &Value, batting_team_id: &str) -> Innings {
    Innings {
        innings_id: probe::count(innings, INNINGS_ID),
        batting_team_id: batting_team_id.to_string(),
        runs: probe::count(innings, RUNS),
        wickets: probe::count(innings, WICKETS),
        overs: probe::decimal(innings, OVERS),
        declared: probe::flag(innings, DECLARED).unwrap_or(false),
        follow_on: probe::flag(innings, FOLLOW_ON).unwrap_or(false),
    }
}

/// 19.4 overs is 118 balls.
pub fn balls_from_overs(overs: f64) -> u32 {
    if overs <= 0.0 {
        return 0;
    }
    let tenths = (overs * 10.0).round() as u32;
    (tenths / 10) * 6 + (tenths % 10).min(5)
}

/// Runs per six balls, to two decimals.
pub fn run_rate(runs: u32, balls: u32) -> f64 {
    if balls == 0 {
        return 0.0;
    }
    (f64::from(runs) * 6.0 / f64::from(balls) * 100.0).round() / 100.0
}
