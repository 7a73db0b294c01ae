//! Listing splitters: turn an endpoint response into per-entity fragments.
//!
//! Fragments are borrowed from the listing unchanged so the stored `raw`
//! field is exactly what the provider sent for that entity. Context from the
//! enclosing groups (match type, series wrapper, month) travels alongside.

use serde_json::Value;

use super::error::{NormalizationError, Result};
use super::probe::{self, FieldProbe::Key};
use crate::entity::collection::Collection;

/// Values inherited from the groups enclosing a listing entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingContext {
    pub match_type: Option<String>,
    pub series_id: Option<String>,
    pub series_name: Option<String>,
    pub month: Option<String>,
}

/// One entity's raw fragment from a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingItem<'a> {
    pub fragment: &'a Value,
    pub context: ListingContext,
}

impl<'a> ListingItem<'a> {
    fn bare(fragment: &'a Value) -> Self {
        Self {
            fragment,
            context: ListingContext::default(),
        }
    }
}

/// Top-level array holding each collection's listing, if it has one.
pub fn container_key(kind: Collection) -> Option<&'static str> {
    match kind {
        Collection::Matches => Some("typeMatches"),
        Collection::Teams => Some("list"),
        Collection::News => Some("storyList"),
        Collection::Series => Some("seriesMapProto"),
        Collection::Players | Collection::Photos => None,
    }
}

/// Split a listing response.
///
/// Collections without a listing shape yield the payload as a single item.
///
/// # Errors
/// `NormalizationError` when the listing is not an object or lacks its
/// container array.
pub fn split_listing(kind: Collection, listing: &Value) -> Result<Vec<ListingItem<'_>>> {
    let Some(key) = container_key(kind) else {
        return Ok(vec![ListingItem::bare(listing)]);
    };
    if !listing.is_object() {
        return Err(NormalizationError::not_an_object(kind, listing));
    }
    let groups = listing
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| NormalizationError::missing_container(kind, key, listing))?;

    let items = match kind {
        Collection::Matches => split_matches(groups),
        Collection::Teams => split_teams(groups),
        Collection::News => split_news(groups),
        Collection::Series => split_series(groups),
        Collection::Players | Collection::Photos => vec![ListingItem::bare(listing)],
    };
    tracing::debug!(kind = %kind, items = items.len(), "Split listing");
    Ok(items)
}

/// Split a payload that may be either a listing or a single entity.
pub fn split_any(kind: Collection, payload: &Value) -> Result<Vec<ListingItem<'_>>> {
    match container_key(kind) {
        Some(key) if payload.get(key).is_some() => split_listing(kind, payload),
        _ => Ok(vec![ListingItem::bare(payload)]),
    }
}

/// `typeMatches[].seriesMatches[].seriesAdWrapper.matches[]`; ad slots have
/// no `seriesAdWrapper` and are skipped.
fn split_matches(type_groups: &[Value]) -> Vec<ListingItem<'_>> {
    let mut items = Vec::new();
    for type_group in type_groups {
        let match_type = probe::opt_text(type_group, &[Key("matchType")]);
        let wrappers = type_group
            .get("seriesMatches")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for wrapper in wrappers.iter().filter_map(|w| w.get("seriesAdWrapper")) {
            let context = ListingContext {
                match_type: match_type.clone(),
                series_id: probe::id(wrapper, &[Key("seriesId")]),
                series_name: probe::opt_text(wrapper, &[Key("seriesName")]),
                month: None,
            };
            let matches = wrapper
                .get("matches")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            items.extend(matches.iter().map(|fragment| ListingItem {
                fragment,
                context: context.clone(),
            }));
        }
    }
    items
}

/// Team lists interleave header rows (`{"teamName": "Test Teams"}`) that
/// carry no id.
fn split_teams(entries: &[Value]) -> Vec<ListingItem<'_>> {
    entries
        .iter()
        .filter(|e| !e.is_object() || probe::id(e, &[Key("teamId"), Key("id")]).is_some())
        .map(ListingItem::bare)
        .collect()
}

/// `storyList[].story`; ad entries are skipped.
fn split_news(entries: &[Value]) -> Vec<ListingItem<'_>> {
    entries
        .iter()
        .filter_map(|e| e.get("story"))
        .map(ListingItem::bare)
        .collect()
}

/// `seriesMapProto[].series[]`, with the group's month label as context.
fn split_series(groups: &[Value]) -> Vec<ListingItem<'_>> {
    let mut items = Vec::new();
    for group in groups {
        let month = probe::opt_text(group, &[Key("date"), Key("month")]);
        let series = group
            .get("series")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        items.extend(series.iter().map(|fragment| ListingItem {
            fragment,
            context: ListingContext {
                month: month.clone(),
                ..Default::default()
            },
        }));
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn match_listing() -> Value {
        json!({
            "typeMatches": [
                {
                    "matchType": "International",
                    "seriesMatches": [
                        {
                            "seriesAdWrapper": {
                                "seriesId": 7476,
                                "seriesName": "England tour of India, 2024",
                                "matches": [
                                    {"matchInfo": {"matchId": 1}},
                                    {"matchInfo": {"matchId": 2}}
                                ]
                            }
                        },
                        {"adDetail": {"name": "native_ad", "layout": "native_large"}}
                    ]
                },
                {
                    "matchType": "League",
                    "seriesMatches": [
                        {"seriesAdWrapper": {"seriesId": 8000, "seriesName": "BBL", "matches": [{"matchInfo": {"matchId": 3}}]}}
                    ]
                }
            ]
        })
    }

    #[test]
    fn test_match_listing_skips_ads_and_carries_context() {
        let listing = match_listing();
        let items = split_listing(Collection::Matches, &listing).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].context.match_type.as_deref(), Some("International"));
        assert_eq!(items[0].context.series_id.as_deref(), Some("7476"));
        assert_eq!(items[2].context.match_type.as_deref(), Some("League"));
        assert_eq!(items[2].context.series_name.as_deref(), Some("BBL"));
    }

    #[test]
    fn test_fragments_are_untouched() {
        let listing = match_listing();
        let items = split_listing(Collection::Matches, &listing).unwrap();
        assert_eq!(
            items[0].fragment,
            &listing["typeMatches"][0]["seriesMatches"][0]["seriesAdWrapper"]["matches"][0]
        );
    }

    #[test]
    fn test_team_listing_skips_headers() {
        let listing = json!({"list": [
            {"teamName": "Test Teams"},
            {"teamId": 2, "teamName": "India"},
            {"teamId": 9, "teamName": "England"},
            {"teamName": "Associate Teams"},
            {"teamId": 27, "teamName": "Ireland"}
        ]});
        let items = split_listing(Collection::Teams, &listing).unwrap();
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_news_listing_keeps_only_stories() {
        let listing = json!({"storyList": [
            {"story": {"id": 1, "hline": "A"}},
            {"ad": {"name": "ad"}},
            {"story": {"id": 2, "hline": "B"}}
        ]});
        let items = split_listing(Collection::News, &listing).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].fragment["hline"], "B");
    }

    #[test]
    fn test_series_listing_carries_month() {
        let listing = json!({"seriesMapProto": [
            {"date": "JANUARY 2024", "series": [{"id": 1}, {"id": 2}]},
            {"date": "FEBRUARY 2024", "series": [{"id": 3}]}
        ]});
        let items = split_listing(Collection::Series, &listing).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[2].context.month.as_deref(), Some("FEBRUARY 2024"));
    }

    #[test]
    fn test_listing_without_container_is_error() {
        let err = split_listing(Collection::News, &json!({"message": "quota"})).unwrap_err();
        assert!(matches!(
            err,
            NormalizationError::MissingContainer { container: "storyList", .. }
        ));

        let err = split_listing(Collection::Teams, &json!("nope")).unwrap_err();
        assert!(matches!(err, NormalizationError::NotAnObject { .. }));
    }

    #[test]
    fn test_split_any_accepts_single_entities() {
        let single = json!({"matchInfo": {"matchId": 1}});
        let items = split_any(Collection::Matches, &single).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].fragment, &single);

        let listing = match_listing();
        assert_eq!(split_any(Collection::Matches, &listing).unwrap().len(), 3);
    }

    #[test]
    fn test_players_and_photos_pass_through() {
        let player = json!({"id": "1413"});
        assert_eq!(split_listing(Collection::Players, &player).unwrap().len(), 1);
    }
}
