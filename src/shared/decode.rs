//! Lenient decoding of backend values
//!
//! The hosted backend is loose about scalar shapes: numbers may arrive
//! as JSON numbers or as numeric strings, timestamps as epoch
//! milliseconds or as ISO strings, lists bare or wrapped in `{items}`.
//! All of that tolerance lives here so the rest of the crate works with
//! plain typed fields.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Numeric coercion matching the display layer's rules: anything that
/// is not a finite number becomes 0.
pub fn value_to_f64(v: &Value) -> f64 {
    match v {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).unwrap_or(0.0),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .unwrap_or(0.0),
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

pub fn value_to_i64(v: &Value) -> i64 {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => {
            let t = s.trim();
            t.parse::<i64>()
                .ok()
                .or_else(|| t.parse::<f64>().ok().map(|f| f as i64))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

/// Epoch milliseconds or an ISO-ish string; anything unparseable is
/// `None` and therefore matches no period bucket.
pub fn value_to_datetime(v: &Value) -> Option<DateTime<Utc>> {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        Value::String(s) => {
            let t = s.trim();
            if t.is_empty() {
                return None;
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(n) = NaiveDateTime::parse_from_str(t, "%Y-%m-%d %H:%M:%S") {
                return Some(Utc.from_utc_datetime(&n));
            }
            if let Ok(d) = NaiveDate::parse_from_str(t, "%Y-%m-%d") {
                let n = d.and_hms_opt(0, 0, 0)?;
                return Some(Utc.from_utc_datetime(&n));
            }
            None
        }
        _ => None,
    }
}

pub fn lenient_f64<'de, D>(de: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(de)?;
    Ok(value_to_f64(&v))
}

pub fn lenient_i64<'de, D>(de: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(de)?;
    Ok(value_to_i64(&v))
}

pub fn lenient_opt_i64<'de, D>(de: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(de)?;
    Ok(match v {
        None | Some(Value::Null) => None,
        Some(v) => Some(value_to_i64(&v)),
    })
}

pub fn lenient_opt_datetime<'de, D>(de: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(de)?;
    Ok(v.as_ref().and_then(value_to_datetime))
}

/// Strings may arrive as numbers; nulls collapse to `None`.
pub fn lenient_opt_string<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(de)?;
    Ok(match v {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// A list the backend sends either bare (`[...]`) or wrapped
/// (`{"items": [...]}`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Listish<T> {
    Wrapped { items: Vec<T> },
    Plain(Vec<T>),
}

impl<T> Listish<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Listish::Wrapped { items } => items,
            Listish::Plain(v) => v,
        }
    }
}

impl<T> Default for Listish<T> {
    fn default() -> Self {
        Listish::Plain(Vec::new())
    }
}

// ── Tests ──────────────────────────────────────────────────────
