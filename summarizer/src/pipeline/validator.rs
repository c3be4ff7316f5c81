//! Minimum-Data Validator: decides whether a raw history can be summarized.

use serde_json::Value;

use super::normalizer::has_value;
use crate::domain::Domain;

/// Returns every problem found in `history`; an empty list means it is usable.
///
/// Errors accumulate across records; each message carries the record index.
pub fn validate_minimum(domain: &Domain, history: &Value) -> Vec<String> {
    let records = match history {
        Value::Array(records) if !records.is_empty() => records,
        _ => return vec![domain.history_required.to_string()],
    };

    let mut errors = Vec::new();
    let label = domain.record_label;

    for (index, record) in records.iter().enumerate() {
        let Some(record) = record.as_object() else {
            errors.push(format!("{label} {index} must be an object"));
            continue;
        };

        if !domain.date_aliases.iter().any(|key| has_value(record, key)) {
            errors.push(format!("{label} {index}: consultation/visit date is required"));
        }

        let substantive = domain
            .substance_groups
            .iter()
            .any(|group| group.iter().any(|key| has_value(record, key)));

        if !substantive {
            errors.push(format!(
                "{label} {index}: must contain at least {}",
                domain.substance_description
            ));
        }
    }

    errors
}
