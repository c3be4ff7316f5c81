//! Prometheus metrics for summary runs, exposed on `GET /metrics`.

use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};
use tracing::warn;

use crate::domain::DomainKind;

/// Pipeline runs - labels: domain, outcome
pub static SUMMARY_REQUESTS: Lazy<Result<IntCounterVec, prometheus::Error>> = Lazy::new(|| {
    register_int_counter_vec!(
        "summary_requests_total",
        "Total number of summary pipeline runs",
        &["domain", "outcome"]
    )
});

pub fn record_outcome(domain: DomainKind, outcome: &str) {
    match SUMMARY_REQUESTS.as_ref() {
        Ok(counter) => counter.with_label_values(&[domain.as_str(), outcome]).inc(),
        Err(e) => warn!("summary_requests_total unavailable: {}", e),
    }
}

/// Encodes the default registry in the Prometheus text format.
pub fn render() -> Result<(Vec<u8>, String), prometheus::Error> {
    // Touch the counter so it is registered even before the first request.
    Lazy::force(&SUMMARY_REQUESTS);

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer)?;
    Ok((buffer, encoder.format_type().to_string()))
}
