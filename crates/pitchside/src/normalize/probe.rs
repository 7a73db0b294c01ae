//! Precedence-ordered field probes over loosely-typed JSON.
//!
//! Every canonical field is read through a list of [`FieldProbe`]s. Probes are
//! tried in order and the first one that yields a usable value of the wanted
//! type wins. When none do, the caller gets the type's zero value.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

/// Candidate location of a field inside a provider object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldProbe {
    /// A key directly on the object.
    Key(&'static str),
    /// A chain of nested object keys.
    Path(&'static [&'static str]),
}

impl FieldProbe {
    /// Resolve the probe, treating `null` as absent.
    pub fn lookup<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        let found = match self {
            FieldProbe::Key(key) => value.get(key),
            FieldProbe::Path(path) => path.iter().try_fold(value, |v, key| v.get(key)),
        };
        found.filter(|v| !v.is_null())
    }
}

/// First probe whose value converts with `convert`.
pub fn probe<T>(value: &Value, probes: &[FieldProbe], convert: impl Fn(&Value) -> Option<T>) -> Option<T> {
    probes
        .iter()
        .filter_map(|p| p.lookup(value))
        .find_map(convert)
}

/// First present value of any type.
pub fn first<'a>(value: &'a Value, probes: &[FieldProbe]) -> Option<&'a Value> {
    probes.iter().find_map(|p| p.lookup(value))
}

pub fn text(value: &Value, probes: &[FieldProbe]) -> String {
    probe(value, probes, as_text).unwrap_or_default()
}

pub fn opt_text(value: &Value, probes: &[FieldProbe]) -> Option<String> {
    probe(value, probes, as_text)
}

/// Identifier given either as a string or an integer.
pub fn id(value: &Value, probes: &[FieldProbe]) -> Option<String> {
    probe(value, probes, as_id)
}

pub fn count(value: &Value, probes: &[FieldProbe]) -> u32 {
    probe(value, probes, as_count).unwrap_or_default()
}

pub fn opt_count(value: &Value, probes: &[FieldProbe]) -> Option<u32> {
    probe(value, probes, as_count)
}

pub fn decimal(value: &Value, probes: &[FieldProbe]) -> f64 {
    probe(value, probes, as_decimal).unwrap_or_default()
}

pub fn opt_decimal(value: &Value, probes: &[FieldProbe]) -> Option<f64> {
    probe(value, probes, as_decimal)
}

pub fn flag(value: &Value, probes: &[FieldProbe]) -> Option<bool> {
    probe(value, probes, as_flag)
}

pub fn timestamp(value: &Value, probes: &[FieldProbe]) -> Option<DateTime<Utc>> {
    probe(value, probes, as_timestamp)
}

pub fn id_list(value: &Value, probes: &[FieldProbe]) -> Vec<String> {
    probe(value, probes, |v| list_of(v, as_list_id)).unwrap_or_default()
}

pub fn text_list(value: &Value, probes: &[FieldProbe]) -> Vec<String> {
    probe(value, probes, |v| list_of(v, as_list_text)).unwrap_or_default()
}

/// Non-empty string, or a number rendered as text.
pub fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Non-empty string or integer.
pub fn as_id(v: &Value) -> Option<String> {
    match v {
        Value::String(_) => as_text(v),
        Value::Number(n) => n
            .as_u64()
            .map(|n| n.to_string())
            .or_else(|| n.as_i64().map(|n| n.to_string())),
        _ => None,
    }
}

/// Non-negative whole number, from a number or a numeric string.
pub fn as_count(v: &Value) -> Option<u32> {
    let n = as_decimal(v)?;
    (n >= 0.0).then(|| n.trunc().min(f64::from(u32::MAX)) as u32)
}

/// Finite number, from a number or a numeric string.
pub fn as_decimal(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

pub fn as_flag(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_u64()? {
            0 => Some(false),
            1 => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Epoch milliseconds (or seconds), RFC 3339, or a bare `YYYY-MM-DD` date.
pub fn as_timestamp(v: &Value) -> Option<DateTime<Utc>> {
    match v {
        Value::Number(n) => from_epoch(n.as_i64()?),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(n) = s.parse::<i64>() {
                return from_epoch(n);
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| Utc.from_utc_datetime(&dt))
        }
        _ => None,
    }
}

/// Values above this are taken to be milliseconds.
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

fn from_epoch(n: i64) -> Option<DateTime<Utc>> {
    if n <= 0 {
        return None;
    }
    if n >= EPOCH_MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(n)
    } else {
        DateTime::from_timestamp(n, 0)
    }
}

fn as_list_id(v: &Value) -> Option<String> {
    match v {
        Value::Object(_) => first(
            v,
            &[FieldProbe::Key("id"), FieldProbe::Key("matchId"), FieldProbe::Key("itemId")],
        )
        .and_then(as_id),
        _ => as_id(v),
    }
}

fn as_list_text(v: &Value) -> Option<String> {
    match v {
        Value::Object(_) => first(
            v,
            &[FieldProbe::Key("name"), FieldProbe::Key("itemName"), FieldProbe::Key("tag")],
        )
        .and_then(as_text),
        _ => as_text(v),
    }
}

/// Array items (or a comma-separated string), deduplicated in order.
fn list_of(v: &Value, item: fn(&Value) -> Option<String>) -> Option<Vec<String>> {
    let items: Vec<String> = match v {
        Value::Array(items) => items.iter().filter_map(item).collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => return None,
    };
    let mut seen = std::collections::HashSet::new();
    Some(items.into_iter().filter(|i| seen.insert(i.clone())).collect())
}
