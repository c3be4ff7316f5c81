//! Advisory messages about data completeness. Warnings never block a run.

use serde_json::Value;

use super::normalizer::has_value;
use crate::domain::{BoosterWatch, Domain};
use crate::models::{OutputFormat, ProviderOutcome, Record};

pub const PLAIN_TEXT_WARNING: &str =
    "Plain text format selected - consider HTML or Markdown for better formatting";
pub const TERSE_SUMMARY_WARNING: &str =
    "Generated summary is very terse - consider including more detail in the input data";
pub const MOCK_PROVIDER_WARNING: &str =
    "Summary generated by the Mock provider - configure a real AI provider for production";

/// Summaries shorter than this, after trimming, are flagged as terse.
pub const MIN_SUMMARY_CHARS: usize = 100;

/// Only this exact provider name triggers the mock warning.
pub const MOCK_PROVIDER_NAME: &str = "Mock";

/// Warnings computed before the provider is invoked, in a fixed order.
pub fn collect_warnings(
    domain: &Domain,
    subject_info: &Record,
    format: OutputFormat,
    records: &[Record],
) -> Vec<String> {
    let mut warnings = Vec::new();

    if subject_info.is_empty() {
        warnings.push(domain.subject_missing_warning.to_string());
    }

    if records.len() < 2 {
        warnings.push(domain.single_record_warning.to_string());
    }

    let label = domain.record_label_lower();
    for rule in domain.missing_rules {
        let missing = records
            .iter()
            .filter(|record| !rule.fields.iter().any(|key| has_value(record, key)))
            .count();
        if missing > 0 {
            warnings.push(format!("{missing} {label}(s) without {}", rule.subject));
        }
    }

    if format == OutputFormat::Text {
        warnings.push(PLAIN_TEXT_WARNING.to_string());
    }

    if let Some(watch) = &domain.booster_watch {
        let due = vaccines_due(watch, records);
        if !due.is_empty() {
            warnings.push(format!(
                "Vaccines that may be due for a booster: {} - check the vaccination schedule",
                due.join(", ")
            ));
        }
    }

    warnings
}

/// Vaccine names matching the watch list, deduplicated in first-seen order.
pub fn vaccines_due(watch: &BoosterWatch, records: &[Record]) -> Vec<String> {
    let mut due: Vec<String> = Vec::new();

    let names = records
        .iter()
        .filter_map(|record| record.get(watch.field))
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(Value::as_str);

    for name in names {
        let lowered = name.to_lowercase();
        if watch.tokens.iter().any(|token| lowered.contains(token)) && !due.iter().any(|d| d == name) {
            due.push(name.to_string());
        }
    }

    due
}

/// Warnings derived from the provider's answer.
pub fn post_processing_warnings(outcome: &ProviderOutcome) -> Vec<String> {
    let mut warnings = Vec::new();

    if outcome.success && outcome.summary.trim().chars().count() < MIN_SUMMARY_CHARS {
        warnings.push(TERSE_SUMMARY_WARNING.to_string());
    }

    if outcome.provider == MOCK_PROVIDER_NAME {
        warnings.push(MOCK_PROVIDER_WARNING.to_string());
    }

    warnings
}

/// Per-record improvement hints for the validate endpoint, computed on raw input.
pub fn suggestions(domain: &Domain, subject_info: &Record, history: &Value) -> Vec<String> {
    let mut suggestions = Vec::new();

    if subject_info.is_empty() {
        suggestions.push(domain.subject_suggestion.to_string());
    }

    let Some(records) = history.as_array() else {
        return suggestions;
    };

    let empty = Record::new();
    for (index, raw) in records.iter().enumerate() {
        let record = raw.as_object().unwrap_or(&empty);
        for rule in domain.suggestion_rules {
            if !rule.fields.iter().any(|key| has_value(record, key)) {
                suggestions.push(format!(
                    "{} {index}: including {} improves summary quality",
                    domain.record_label, rule.subject
                ));
            }
        }
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CLINICAL, VETERINARY};
    use crate::pipeline::normalizer::normalize_history;
    use serde_json::json;

    fn full_visit(date: &str) -> Value {
        json!({
            "data_consulta": date,
            "peso": 75.0,
            "altura": 1.75,
            "pamax": 130,
            "pamin": 85,
            "hipotese_diagnostico": ["Hipertensão"],
        })
    }

    fn subject() -> Record {
        json!({"nome": "João"}).as_object().cloned().unwrap()
    }

    #[test]
    fn single_record_history_is_flagged() {
        let records = normalize_history(&CLINICAL, &json!([full_visit("01/01/2025")]));
        let warnings = collect_warnings(&CLINICAL, &subject(), OutputFormat::Html, &records);
        assert_eq!(warnings, vec![CLINICAL.single_record_warning]);
    }

    #[test]
    fn two_complete_records_produce_no_warnings() {
        let records = normalize_history(
            &CLINICAL,
            &json!([full_visit("01/01/2025"), full_visit("01/02/2025")]),
        );
        let warnings = collect_warnings(&CLINICAL, &subject(), OutputFormat::Markdown, &records);
        assert!(warnings.is_empty(), "{warnings:?}");
    }

    #[test]
    fn clinical_counts_are_aggregated() {
        let records = normalize_history(
            &CLINICAL,
            &json!([
                {"data_consulta": "x", "medicacoes": ["a"]},
                {"data_consulta": "y", "peso": 70},
            ]),
        );
        let warnings = collect_warnings(&CLINICAL, &Record::new(), OutputFormat::Text, &records);
        assert_eq!(
            warnings,
            vec![
                CLINICAL.subject_missing_warning.to_string(),
                "1 visit(s) without anthropometric data (weight/height)".to_string(),
                "2 visit(s) without blood pressure".to_string(),
                "2 visit(s) without a diagnostic hypothesis".to_string(),
                PLAIN_TEXT_WARNING.to_string(),
            ]
        );
    }

    // The validator accepts `diagnostico` while the warning only reads
    // `hipotese_diagnostico`. Alias resolution moves `diagnostico` onto the
    // canonical key first, so the two never disagree on pipeline input.
    #[test]
    fn diagnosis_alias_satisfies_the_warning_after_normalization() {
        let history = json!([
            {"data_consulta": "x", "diagnostico": ["flu"]},
            {"data_consulta": "y", "hipotese_diagnostico": [], "diagnostico": ["cold"]},
        ]);
        let records = normalize_history(&CLINICAL, &history);
        assert_eq!(records[0]["hipotese_diagnostico"], json!(["flu"]));
        assert_eq!(records[1]["hipotese_diagnostico"], json!(["cold"]));

        let warnings = collect_warnings(&CLINICAL, &subject(), OutputFormat::Html, &records);
        assert!(!warnings.iter().any(|w| w.contains("diagnostic hypothesis")));
    }

    #[test]
    fn blank_diagnosis_under_every_alias_is_warned() {
        let history = json!([{"data_consulta": "x", "diagnostico": [], "medicacoes": ["a"]}]);
        let records = normalize_history(&CLINICAL, &history);
        let warnings = collect_warnings(&CLINICAL, &subject(), OutputFormat::Html, &records);
        assert!(warnings.contains(&"1 visit(s) without a diagnostic hypothesis".to_string()));
    }

    #[test]
    fn veterinary_rules_and_booster_scan() {
        let records = normalize_history(
            &VETERINARY,
            &json!([
                {"data_consulta": "x", "vacinas": ["V8 completa", "Antirrábica"]},
                {"data_consulta": "y", "peso": 20, "vacinas": ["v8 completa", "V8 completa", "Giárdia"]},
            ]),
        );
        let warnings = collect_warnings(&VETERINARY, &subject(), OutputFormat::Html, &records);
        assert_eq!(
            warnings,
            vec![
                "1 consultation(s) without the animal's weight",
                "2 consultation(s) without exam results",
                "2 consultation(s) without a diagnosis",
                "Vaccines that may be due for a booster: V8 completa, Antirrábica, v8 completa - check the vaccination schedule",
            ]
        );
    }

    #[test]
    fn booster_scan_is_case_insensitive() {
        let watch = VETERINARY.booster_watch.as_ref().unwrap();
        let records = normalize_history(
            &VETERINARY,
            &json!([{"vacinas": ["ANTIRRÁBICA", "Reforço ANUAL", "Leptospirose"]}]),
        );
        assert_eq!(vaccines_due(watch, &records), vec!["ANTIRRÁBICA", "Reforço ANUAL"]);
    }

    #[test]
    fn post_processing_flags_terse_and_mock() {
        let terse = ProviderOutcome::success("short", "Mock");
        assert_eq!(
            post_processing_warnings(&terse),
            vec![TERSE_SUMMARY_WARNING, MOCK_PROVIDER_WARNING]
        );

        let long = ProviderOutcome::success("x".repeat(MIN_SUMMARY_CHARS), "Gemini");
        assert!(post_processing_warnings(&long).is_empty());

        let padded = ProviderOutcome::success(format!("   {}   ", "y".repeat(99)), "Gemini");
        assert_eq!(post_processing_warnings(&padded), vec![TERSE_SUMMARY_WARNING]);
    }

    #[test]
    fn only_the_exact_mock_name_is_flagged() {
        let vet = ProviderOutcome::success("z".repeat(200), "Mock Veterinary");
        assert!(post_processing_warnings(&vet).is_empty());
    }

    #[test]
    fn suggestions_follow_raw_keys() {
        let history = json!([
            {"data_consulta": "x", "diagnostico": ["flu"]},
            {"data_consulta": "y", "peso": 70, "pamax": 120},
        ]);
        assert_eq!(
            suggestions(&CLINICAL, &Record::new(), &history),
            vec![
                CLINICAL.subject_suggestion.to_string(),
                "Visit 0: including anthropometric data improves summary quality".to_string(),
                "Visit 0: including blood pressure improves summary quality".to_string(),
                "Visit 1: including a diagnostic hypothesis improves summary quality".to_string(),
            ]
        );
    }

    #[test]
    fn veterinary_suggestions() {
        let history = json!([{"data_consulta": "x", "exames": ["Hemograma"]}]);
        assert_eq!(
            suggestions(&VETERINARY, &subject(), &history),
            vec![
                "Consultation 0: including the animal's weight improves summary quality",
                "Consultation 0: including vaccine history improves summary quality",
            ]
        );
    }
}
