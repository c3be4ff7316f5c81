// Orchestration: validate -> check availability -> normalize -> warn -> invoke -> assemble

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::normalizer::normalize_history;
use super::validator::validate_minimum;
use super::warnings::{collect_warnings, post_processing_warnings, suggestions};
use crate::domain::Domain;
use crate::metrics;
use crate::models::{
    ProcessedData, ProviderOutcome, ProviderRequest, SummaryRequest, SummaryResult,
    ValidationReport,
};
use crate::providers::SummaryProvider;

pub const INTERNAL_ERROR_WARNING: &str = "Internal system error";

pub struct SummaryService {
    domain: &'static Domain,
    provider: Arc<dyn SummaryProvider>,
}

impl SummaryService {
    pub fn new(domain: &'static Domain, provider: Arc<dyn SummaryProvider>) -> Self {
        Self { domain, provider }
    }

    pub fn domain(&self) -> &'static Domain {
        self.domain
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn generate(&self, request: &SummaryRequest) -> SummaryResult {
        let request_id = Uuid::new_v4();
        let domain = self.domain.kind.as_str();
        let provider_name = self.provider.name().to_string();

        let errors = validate_minimum(self.domain, &request.history);
        if !errors.is_empty() {
            info!("Summary [{}] ({}) rejected: {} problem(s)", request_id, domain, errors.len());
            metrics::record_outcome(self.domain.kind, "invalid");
            let joined = errors.join(", ");
            return SummaryResult::failure(
                format!("Insufficient data to generate summary: {}", joined),
                provider_name,
                vec![format!("Minimum data requirements not met: {}", joined)],
            );
        }

        if !self.provider.is_available() {
            warn!("Summary [{}] ({}): provider '{}' unavailable", request_id, domain, provider_name);
            metrics::record_outcome(self.domain.kind, "unavailable");
            return SummaryResult::failure(
                format!("AI provider '{}' is not available", provider_name),
                provider_name,
                vec!["AI provider unavailable at the moment".to_string()],
            );
        }

        let normalized = std::panic::catch_unwind(AssertUnwindSafe(|| {
            normalize_history(self.domain, &request.history)
        }));
        let records = match normalized {
            Ok(records) => records,
            Err(panic) => return self.internal_error(request_id, panic_message(&*panic), Vec::new()),
        };

        let processed_data = ProcessedData {
            total_records: records.len(),
            subject_info: request.subject_info.clone(),
            requested_format: request.format,
            notes: request.notes.clone(),
            processed_history: records.clone(),
        };

        let warnings = collect_warnings(self.domain, &request.subject_info, request.format, &records);

        let provider_request = ProviderRequest {
            records,
            format: request.format,
        };

        info!(
            "Summary [{}] ({}): invoking '{}' with {} record(s)",
            request_id, domain, provider_name, provider_request.records.len()
        );

        let invoked = AssertUnwindSafe(self.provider.generate(&provider_request))
            .catch_unwind()
            .await;

        let outcome = match invoked {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => return self.internal_error(request_id, err.to_string(), warnings),
            Err(panic) => return self.internal_error(request_id, panic_message(&*panic), warnings),
        };

        if outcome.success {
            let mut all_warnings = warnings;
            all_warnings.extend(post_processing_warnings(&outcome));
            info!("Summary [{}] ({}) generated by '{}'", request_id, domain, outcome.provider);
            metrics::record_outcome(self.domain.kind, "success");
            return SummaryResult::success(outcome.summary, outcome.provider, processed_data, all_warnings);
        }

        error!(
            "Summary [{}] ({}): provider '{}' failed: {:?}",
            request_id, domain, outcome.provider, outcome.error
        );
        metrics::record_outcome(self.domain.kind, "provider_error");
        SummaryResult::failure(
            outcome
                .error
                .unwrap_or_else(|| "Unknown error while generating summary".to_string()),
            outcome.provider,
            warnings,
        )
    }

    /// Pass-through summary: no validation, normalization or warnings.
    ///
    /// Availability is checked before the history, so an unconfigured backend
    /// is reported even for an empty request.
    pub async fn summarize_raw(&self, request: &ProviderRequest) -> ProviderOutcome {
        let request_id = Uuid::new_v4();
        let domain = self.domain.kind.as_str();
        let provider_name = self.provider.name().to_string();

        if !self.provider.is_available() {
            warn!("Raw summary [{}] ({}): provider '{}' unavailable", request_id, domain, provider_name);
            metrics::record_outcome(self.domain.kind, "unavailable");
            return ProviderOutcome::failure(
                format!("AI provider '{}' is not available", provider_name),
                provider_name,
            );
        }

        if request.records.is_empty() {
            metrics::record_outcome(self.domain.kind, "invalid");
            return ProviderOutcome::failure(self.domain.no_records_error, provider_name);
        }

        info!(
            "Raw summary [{}] ({}): invoking '{}' with {} record(s)",
            request_id, domain, provider_name, request.records.len()
        );

        let invoked = AssertUnwindSafe(self.provider.generate(request))
            .catch_unwind()
            .await;

        let outcome = match invoked {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => ProviderOutcome::failure(err.to_string(), provider_name),
            Err(panic) => ProviderOutcome::failure(panic_message(&*panic), provider_name),
        };

        if outcome.success {
            metrics::record_outcome(self.domain.kind, "success");
        } else {
            error!("Raw summary [{}] ({}) failed: {:?}", request_id, domain, outcome.error);
            metrics::record_outcome(self.domain.kind, "provider_error");
        }
        outcome
    }

    /// Checks a request without calling the provider.
    pub fn validate(&self, request: &SummaryRequest) -> ValidationReport {
        let errors = validate_minimum(self.domain, &request.history);
        ValidationReport {
            valid: errors.is_empty(),
            errors,
            normalized_data: normalize_history(self.domain, &request.history),
            suggestions: suggestions(self.domain, &request.subject_info, &request.history),
        }
    }

    fn internal_error(&self, request_id: Uuid, message: String, mut warnings: Vec<String>) -> SummaryResult {
        error!("Summary [{}] internal error: {}", request_id, message);
        metrics::record_outcome(self.domain.kind, "internal_error");
        warnings.push(INTERNAL_ERROR_WARNING.to_string());
        SummaryResult::failure(
            format!("Internal error: {}", message),
            self.provider.name(),
            warnings,
        )
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected fault".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CLINICAL, VETERINARY};
    use crate::error::ProviderError;
    use crate::models::{OutputFormat, ProviderOutcome, Record};
    use crate::pipeline::warnings::{MOCK_PROVIDER_WARNING, PLAIN_TEXT_WARNING};
    use crate::providers::MockProvider;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Script {
        Succeed(&'static str),
        Fail(&'static str),
        Raise,
        Panic,
    }

    struct ScriptedProvider {
        script: Script,
        available: bool,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(script: Script) -> Arc<Self> {
            Arc::new(Self { script, available: true, calls: AtomicUsize::new(0) })
        }

        fn unavailable() -> Arc<Self> {
            Arc::new(Self { script: Script::Succeed("unused"), available: false, calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl SummaryProvider for ScriptedProvider {
        async fn generate(&self, _request: &ProviderRequest) -> Result<ProviderOutcome, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.script {
                Script::Succeed(text) => Ok(ProviderOutcome::success(text, "Scripted")),
                Script::Fail(message) => Ok(ProviderOutcome::failure(message, "Scripted")),
                Script::Raise => Err(ProviderError::EmptySummary),
                Script::Panic => panic!("provider exploded"),
            }
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn name(&self) -> &str {
            "Scripted"
        }
    }

    fn request(history: Value, format: OutputFormat) -> SummaryRequest {
        SummaryRequest {
            subject_info: Record::new(),
            history,
            format,
            notes: None,
        }
    }

    fn visit() -> Value {
        json!({
            "data_consulta": "15/01/2025",
            "peso": 75.0,
            "altura": 1.75,
            "hipotese_diagnostico": ["Hipertensão"],
            "medicacoes": ["Losartana 50mg"],
        })
    }

    #[tokio::test]
    async fn stub_end_to_end() {
        let service = SummaryService::new(&CLINICAL, Arc::new(MockProvider::new(&CLINICAL)));
        let result = service.generate(&request(json!([visit()]), OutputFormat::Text)).await;

        assert!(result.success);
        assert!(result.error.is_none());
        assert!(!result.summary.is_empty());
        assert_eq!(result.provider, "Mock");
        assert_eq!(result.processed_data.as_ref().unwrap().total_records, 1);
        assert!(result.warnings.contains(&PLAIN_TEXT_WARNING.to_string()));
        assert!(result.warnings.contains(&MOCK_PROVIDER_WARNING.to_string()));
    }

    #[tokio::test]
    async fn invalid_history_never_reaches_the_provider() {
        let provider = ScriptedProvider::new(Script::Succeed("x"));
        let service = SummaryService::new(&CLINICAL, provider.clone());

        let result = service.generate(&request(json!([{"peso": 70}]), OutputFormat::Html)).await;

        assert!(!result.success);
        let error = result.error.unwrap();
        assert!(error.starts_with("Insufficient data to generate summary: "));
        assert!(error.contains("Visit 0: consultation/visit date is required"));
        assert_eq!(result.provider, "Scripted");
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].starts_with("Minimum data requirements not met: "));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unavailable_provider_is_reported_by_name() {
        let provider = ScriptedProvider::unavailable();
        let service = SummaryService::new(&CLINICAL, provider.clone());

        let result = service.generate(&request(json!([visit()]), OutputFormat::Html)).await;

        assert_eq!(result.error.as_deref(), Some("AI provider 'Scripted' is not available"));
        assert_eq!(result.warnings, vec!["AI provider unavailable at the moment"]);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn provider_failure_keeps_precomputed_warnings() {
        let provider = ScriptedProvider::new(Script::Fail("upstream said no"));
        let service = SummaryService::new(&CLINICAL, provider.clone());

        let result = service.generate(&request(json!([visit()]), OutputFormat::Text)).await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("upstream said no"));
        assert!(result.processed_data.is_none());
        assert!(result.warnings.contains(&PLAIN_TEXT_WARNING.to_string()));
        assert!(!result.warnings.iter().any(|w| w.contains("terse")));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn escaped_provider_error_becomes_internal_error() {
        let service = SummaryService::new(&CLINICAL, ScriptedProvider::new(Script::Raise));

        let result = service.generate(&request(json!([visit()]), OutputFormat::Text)).await;

        assert_eq!(result.error.as_deref(), Some("Internal error: Generated summary is empty."));
        assert_eq!(result.warnings.last().map(String::as_str), Some(INTERNAL_ERROR_WARNING));
        assert!(result.warnings.contains(&PLAIN_TEXT_WARNING.to_string()));
    }

    #[tokio::test]
    async fn provider_panic_is_contained() {
        let service = SummaryService::new(&CLINICAL, ScriptedProvider::new(Script::Panic));

        let result = service.generate(&request(json!([visit()]), OutputFormat::Html)).await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Internal error: provider exploded"));
        assert_eq!(result.provider, "Scripted");
        assert_eq!(result.warnings.last().map(String::as_str), Some(INTERNAL_ERROR_WARNING));
    }

    #[tokio::test]
    async fn terse_summary_is_flagged() {
        let service = SummaryService::new(&CLINICAL, ScriptedProvider::new(Script::Succeed("ok")));
        let result = service
            .generate(&request(json!([visit(), visit()]), OutputFormat::Markdown))
            .await;

        assert!(result.success);
        assert!(result.warnings.iter().any(|w| w.contains("terse")));
    }

    #[test]
    fn validate_reports_without_invoking() {
        let provider = ScriptedProvider::new(Script::Succeed("x"));
        let service = SummaryService::new(&VETERINARY, provider.clone());

        let report = service.validate(&request(
            json!([{"data_atendimento": "01/01/2025", "vacinas": ["V8"]}, {"peso": 3}]),
            OutputFormat::Text,
        ));

        assert!(!report.valid);
        assert_eq!(report.errors, vec!["Consultation 1: consultation/visit date is required"]);
        assert_eq!(report.normalized_data.len(), 2);
        assert_eq!(report.normalized_data[0]["data_consulta"], "01/01/2025");
        assert!(!report.suggestions.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    fn raw(records: Vec<Value>) -> ProviderRequest {
        ProviderRequest {
            records: records
                .into_iter()
                .map(|r| r.as_object().cloned().unwrap())
                .collect(),
            format: OutputFormat::Text,
        }
    }

    #[tokio::test]
    async fn raw_summary_checks_availability_before_history() {
        let provider = ScriptedProvider::unavailable();
        let service = SummaryService::new(&CLINICAL, provider.clone());

        let outcome = service.summarize_raw(&raw(vec![])).await;

        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("AI provider 'Scripted' is not available"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn raw_summary_rejects_empty_history() {
        let provider = ScriptedProvider::new(Script::Succeed("x"));
        let service = SummaryService::new(&CLINICAL, provider.clone());

        let outcome = service.summarize_raw(&raw(vec![])).await;

        assert_eq!(outcome.error.as_deref(), Some(CLINICAL.no_records_error));
        assert_eq!(outcome.provider, "Scripted");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn raw_summary_skips_normalization() {
        let service = SummaryService::new(&CLINICAL, Arc::new(MockProvider::new(&CLINICAL)));

        let outcome = service
            .summarize_raw(&raw(vec![json!({"data_atendimento": "02/02/2025", "medicacoes": ["Dipirona"]})]))
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.provider, "Mock");
        assert!(!outcome.summary.contains("02/02/2025"));
        assert!(outcome.summary.contains("Medications: Dipirona"));
    }

    #[tokio::test]
    async fn raw_summary_contains_escaped_errors() {
        let service = SummaryService::new(&VETERINARY, ScriptedProvider::new(Script::Raise));

        let outcome = service.summarize_raw(&raw(vec![json!({"peso": 3})])).await;

        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("Generated summary is empty."));
    }
}
