//! Document entity - one canonical record per collection and natural key.

use sea_orm::entity::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entity::collection::Collection;

/// Document model - canonical fields plus the raw provider fragment.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    /// Internal UUID primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    // ─── Identity ────────────────────────────────────────────────────────────
    pub collection: Collection,
    /// Provider identifier (`matchId`, `teamId`, ...). Unique per collection.
    pub natural_key: String,

    // ─── Content ─────────────────────────────────────────────────────────────
    /// Canonical fields, camelCase.
    #[sea_orm(column_type = "Json")]
    pub body: Json,
    /// Untouched provider payload fragment from the latest sync.
    #[sea_orm(column_type = "Json")]
    pub raw: Json,

    // ─── Tracking ────────────────────────────────────────────────────────────
    /// Set on every upsert.
    pub last_synced: DateTimeWithTimeZone,
    /// Set by read paths that track access (photos).
    pub last_accessed: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Decode the canonical fields into a record type.
    pub fn decode<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(self.body.clone())
    }

    /// The document as served: canonical fields, `raw`, `lastSynced`, `lastAccessed`.
    pub fn to_json(&self) -> Value {
        let mut doc = match &self.body {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        doc.insert("raw".to_string(), self.raw.clone());
        doc.insert(
            "lastSynced".to_string(),
            Value::String(self.last_synced.to_rfc3339()),
        );
        doc.insert(
            "lastAccessed".to_string(),
            self.last_accessed
                .map(|t| Value::String(t.to_rfc3339()))
                .unwrap_or(Value::Null),
        );
        Value::Object(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    use crate::normalize::Team;

    fn make_test_model() -> Model {
        Model {
            id: Uuid::new_v4(),
            collection: Collection::Teams,
            natural_key: "2".to_string(),
            body: json!({"teamId": "2", "teamName": "India"}),
            raw: json!({"teamId": 2, "teamName": "India"}),
            last_synced: Utc::now().fixed_offset(),
            last_accessed: None,
        }
    }

    #[test]
    fn test_decode_typed_record() {
        let team: Team = make_test_model().decode().unwrap();
        assert_eq!(team.team_id, "2");
        assert_eq!(team.team_name, "India");
        assert_eq!(team.team_short_name, "");
    }

    #[test]
    fn test_to_json_adds_tracking_fields() {
        let doc = make_test_model().to_json();
        assert_eq!(doc["teamName"], "India");
        assert_eq!(doc["raw"]["teamId"], 2);
        assert!(doc["lastSynced"].is_string());
        assert!(doc["lastAccessed"].is_null());
    }
}
