//! Row deduplication by (age bucket, date_start, date_stop).
//!
//! The analytics API occasionally repeats rows for the same demographic
//! bucket and window. The first occurrence wins; later rows with the same
//! key are dropped even when their metric values differ.

use std::collections::HashSet;

use serde_json::{Map, Value};

/// Remove duplicate rows, preserving order. Non-object rows are never
/// dropped. Idempotent.
pub fn dedupe(rows: Vec<Value>) -> Vec<Value> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        let Some(obj) = row.as_object() else {
            out.push(row);
            continue;
        };
        let key = format!(
            "{}_{}_{}",
            age_bucket(obj),
            field_string(obj, "date_start", ""),
            field_string(obj, "date_stop", "")
        );
        if seen.insert(key) {
            out.push(row);
        }
    }
    out
}

/// Normalized age extraction: top-level `age`, falling back to the nested
/// `dimensions.age` the tiktok rows use. Absent or null buckets collapse to
/// "Unknown".
pub(crate) fn age_bucket(obj: &Map<String, Value>) -> String {
    if let Some(age) = non_null(obj.get("age")) {
        return coerce(age);
    }
    if let Some(age) = obj
        .get("dimensions")
        .and_then(Value::as_object)
        .and_then(|dims| non_null(dims.get("age")))
    {
        return coerce(age);
    }
    "Unknown".to_string()
}

fn field_string(obj: &Map<String, Value>, key: &str, default: &str) -> String {
    match non_null(obj.get(key)) {
        Some(v) => coerce(v),
        None => default.to_string(),
    }
}

fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn coerce(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
