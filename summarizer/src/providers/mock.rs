use async_trait::async_trait;
use serde_json::Value;

use super::format::line_breaks;
use super::prompt::scalar_text;
use super::SummaryProvider;
use crate::domain::{Domain, DomainKind, DATE_FIELD};
use crate::error::ProviderError;
use crate::models::{ProviderOutcome, ProviderRequest, Record};

/// Offline backend producing a deterministic summary of the last record.
pub struct MockProvider {
    domain: &'static Domain,
}

impl MockProvider {
    pub fn new(domain: &'static Domain) -> Self {
        Self { domain }
    }

    fn clinical_summary(total: usize, last: &Record) -> String {
        let mut summary = format!("CLINICAL SUMMARY (MOCK)\n\nTotal visits: {}\n\n", total);

        if let Some(date) = last.get(DATE_FIELD) {
            summary.push_str(&format!("Last visit: {}\n", scalar_text(date)));
        }
        if let Some(diagnosis) = last.get("hipotese_diagnostico") {
            summary.push_str(&format!("Diagnostic hypothesis: {}\n", list_text(diagnosis)));
        }
        if let (Some(weight), Some(height)) = (last.get("peso"), last.get("altura")) {
            let bmi = last.get("imc").map(scalar_text).unwrap_or_else(|| "N/A".to_string());
            summary.push_str(&format!(
                "Weight: {}kg, Height: {}, BMI: {}\n",
                scalar_text(weight),
                scalar_text(height),
                bmi
            ));
        }
        if let (Some(systolic), Some(diastolic)) = (last.get("pamax"), last.get("pamin")) {
            summary.push_str(&format!(
                "Blood pressure: {}/{} mmHg\n",
                scalar_text(systolic),
                scalar_text(diastolic)
            ));
        }
        if let Some(medications) = last.get("medicacoes") {
            summary.push_str(&format!("Medications: {}\n", list_text(medications)));
        }

        summary.push_str("\n[This summary was generated by the mock backend for development and testing]");
        summary
    }

    fn veterinary_summary(total: usize, last: &Record) -> String {
        let mut summary = format!("VETERINARY SUMMARY (MOCK)\n\nTotal consultations: {}\n\n", total);

        if let Some(date) = last.get(DATE_FIELD) {
            summary.push_str(&format!("Last consultation: {}\n", scalar_text(date)));
        }
        if let Some(weight) = last.get("peso") {
            summary.push_str(&format!("Current weight: {}kg\n", scalar_text(weight)));
        }

        let listed = [
            ("diagnosticos", "Diagnoses"),
            ("vacinas", "Vaccines given"),
            ("exames_resultados", "Exams performed"),
            ("medicacoes", "Medications"),
        ];
        for (key, label) in listed {
            if let Some(value) = last.get(key) {
                summary.push_str(&format!("{}: {}\n", label, list_text(value)));
            }
        }

        summary.push_str("\nVeterinary guidance:\n");
        summary.push_str("- Keep up regular check-ups\n");
        summary.push_str("- Watch behaviour and appetite\n");
        summary.push_str("- Come back if anything changes\n");
        summary.push_str(
            "\n[This summary was generated by the mock backend for veterinary development and testing]",
        );
        summary
    }
}

/// Joins array items with ", "; scalars are shown as they are.
fn list_text(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(scalar_text).collect::<Vec<_>>().join(", "),
        other => scalar_text(other),
    }
}

#[async_trait]
impl SummaryProvider for MockProvider {
    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderOutcome, ProviderError> {
        let Some(last) = request.records.last() else {
            return Ok(ProviderOutcome::failure(self.domain.no_records_error, self.name()));
        };

        let total = request.records.len();
        let summary = match self.domain.kind {
            DomainKind::Clinical => Self::clinical_summary(total, last),
            DomainKind::Veterinary => Self::veterinary_summary(total, last),
        };

        Ok(ProviderOutcome::success(
            line_breaks(&summary, request.format),
            self.name(),
        ))
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        match self.domain.kind {
            DomainKind::Clinical => "Mock",
            DomainKind::Veterinary => "Mock Veterinary",
        }
    }
}
