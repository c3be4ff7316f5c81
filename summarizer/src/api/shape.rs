//! Structural checks on request bodies, run before the pipeline.

use serde_json::{Map, Value};

use crate::domain::Domain;
use crate::error::FieldErrors;
use crate::models::{OutputFormat, ProviderRequest, SummaryRequest};

pub const MAX_NOTES_CHARS: usize = 1000;

const HISTORY: &str = "historico";
const FORMAT: &str = "formato";
const NOTES: &str = "observacoes";

/// Looks a field up under its canonical key, then its English alias.
/// A `null` value counts as absent.
fn lookup<'a>(body: &'a Map<String, Value>, canonical: &str, alias: &str) -> Option<&'a Value> {
    [canonical, alias]
        .iter()
        .filter_map(|key| body.get(*key))
        .find(|value| !value.is_null())
}

fn push(errors: &mut FieldErrors, field: impl Into<String>, message: impl Into<String>) {
    errors.entry(field.into()).or_default().push(message.into());
}

fn parse_format(body: &Map<String, Value>, errors: &mut FieldErrors) -> OutputFormat {
    match lookup(body, FORMAT, "format") {
        None => OutputFormat::default(),
        Some(Value::String(s)) => OutputFormat::parse(s).unwrap_or_else(|| {
            push(errors, FORMAT, "Format must be one of: texto, html, markdown");
            OutputFormat::default()
        }),
        Some(_) => {
            push(errors, FORMAT, "The formato field must be a string");
            OutputFormat::default()
        }
    }
}

/// Body of the pass-through route: a history array, possibly empty, and an
/// optional format. Records are forwarded as sent.
pub fn parse_history_request(body: &Value) -> Result<ProviderRequest, FieldErrors> {
    let mut errors = FieldErrors::new();

    let Some(body) = body.as_object() else {
        push(&mut errors, "body", "The request body must be a JSON object");
        return Err(errors);
    };

    let mut records = Vec::new();
    match lookup(body, HISTORY, "history") {
        None => push(&mut errors, HISTORY, "The historico field is required"),
        Some(Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                match item {
                    Value::Object(record) => records.push(record.clone()),
                    _ => {
                        let field = format!("{}.{}", HISTORY, i);
                        let message = format!("The {} field must be an object", field);
                        push(&mut errors, field, message);
                    }
                }
            }
        }
        Some(_) => push(&mut errors, HISTORY, "The historico field must be an array"),
    }

    let format = parse_format(body, &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ProviderRequest { records, format })
}

pub fn parse_request(domain: &Domain, body: &Value) -> Result<SummaryRequest, FieldErrors> {
    let mut errors = FieldErrors::new();

    let Some(body) = body.as_object() else {
        push(&mut errors, "body", "The request body must be a JSON object");
        return Err(errors);
    };

    let subject_info = match lookup(body, domain.subject_key, "subjectInfo") {
        None => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(Value::Array(items)) if items.is_empty() => Map::new(),
        Some(_) => {
            push(
                &mut errors,
                domain.subject_key,
                format!("The {} field must be an object", domain.subject_key),
            );
            Map::new()
        }
    };

    let history = lookup(body, HISTORY, "history").cloned();
    match &history {
        None => push(&mut errors, HISTORY, domain.history_required),
        Some(Value::Array(items)) if items.is_empty() => push(
            &mut errors,
            HISTORY,
            format!("At least one {} is required in the history", domain.record_label_lower()),
        ),
        Some(Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                if !item.is_object() && !item.is_array() {
                    let field = format!("{}.{}", HISTORY, i);
                    let message = format!("The {} field must be an object", field);
                    push(&mut errors, field, message);
                }
            }
        }
        Some(_) => push(&mut errors, HISTORY, "The historico field must be an array"),
    }

    let format = parse_format(body, &mut errors);

    let notes = match lookup(body, NOTES, "notes") {
        None => None,
        Some(Value::String(s)) if s.chars().count() > MAX_NOTES_CHARS => {
            push(
                &mut errors,
                NOTES,
                format!("The observacoes field may not be greater than {} characters", MAX_NOTES_CHARS),
            );
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            push(&mut errors, NOTES, "The observacoes field must be a string");
            None
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(SummaryRequest {
        subject_info,
        history: history.unwrap_or(Value::Null),
        format,
        notes,
    })
}
