//! Record Normalizer: maps arbitrarily-keyed visit records onto a domain's
//! canonical field set.
//!
//! Normalization runs in two explicit steps so that the empty-list rule stays
//! visible:
//!
//! 1. **resolve** walks each field's alias list and takes the first non-blank
//!    value, falling back to an explicitly supplied empty list and then to the
//!    field default;
//! 2. **prune** drops null and empty-string values. Empty lists survive.

use serde_json::Value;

use crate::domain::{Domain, FieldSpec};
use crate::models::Record;

/// Null, empty string, empty list and empty object count as "no data".
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// True if `key` is present in `record` with a non-blank value.
pub fn has_value(record: &Record, key: &str) -> bool {
    record.get(key).map_or(false, |v| !is_blank(v))
}

pub fn normalize_record(domain: &Domain, raw: &Value) -> Record {
    let empty = Record::new();
    let source = raw.as_object().unwrap_or(&empty);
    prune(resolve(domain, source))
}

pub fn normalize_history(domain: &Domain, history: &Value) -> Vec<Record> {
    match history {
        Value::Array(records) => records.iter().map(|r| normalize_record(domain, r)).collect(),
        _ => Vec::new(),
    }
}

fn resolve(domain: &Domain, source: &Record) -> Vec<(&'static str, Value)> {
    domain
        .fields
        .iter()
        .map(|field| {
            let value = resolve_field(field, source)
                .or_else(|| field.default.map(|default| default()))
                .unwrap_or(Value::Null);
            (field.canonical, value)
        })
        .collect()
}

fn resolve_field(field: &FieldSpec, source: &Record) -> Option<Value> {
    let mut explicit_empty_list = None;

    for alias in field.aliases {
        match source.get(*alias) {
            Some(value) if !is_blank(value) => return Some(value.clone()),
            Some(Value::Array(_)) => {
                explicit_empty_list.get_or_insert(Value::Array(Vec::new()));
            }
            _ => {}
        }
    }

    explicit_empty_list
}

fn prune(resolved: Vec<(&'static str, Value)>) -> Record {
    resolved
        .into_iter()
        .filter(|(_, value)| match value {
            Value::Null => false,
            Value::String(s) => !s.is_empty(),
            _ => true,
        })
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}
