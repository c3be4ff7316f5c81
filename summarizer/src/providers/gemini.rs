use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{format, prompt, SummaryProvider};
use crate::domain::{Domain, DomainKind};
use crate::error::ProviderError;
use crate::models::{ProviderOutcome, ProviderRequest};

const BACKEND: &str = "Gemini";

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

/// Google Gemini `generateContent` backend.
pub struct GeminiProvider {
    domain: &'static Domain,
    client: reqwest::Client,
    api_key: Option<String>,
    api_url: Option<String>,
}

impl GeminiProvider {
    pub fn new(
        domain: &'static Domain,
        client: reqwest::Client,
        api_key: Option<String>,
        api_url: Option<String>,
    ) -> Self {
        Self {
            domain,
            client,
            api_key,
            api_url,
        }
    }

    async fn request_summary(
        &self,
        api_key: &str,
        api_url: &str,
        request: &ProviderRequest,
    ) -> Result<String, ProviderError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt::single_prompt(self.domain, request)?),
                }],
            }],
        };

        debug!("Calling {} with {} record(s)", BACKEND, request.records.len());

        let response = self
            .client
            .post(api_url)
            .header("Content-Type", "application/json")
            .header("X-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Upstream {
                backend: BACKEND,
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)?;
        let summary = parsed
            .first_text()
            .ok_or(ProviderError::InvalidResponse(BACKEND))?;
        if summary.trim().is_empty() {
            return Err(ProviderError::EmptySummary);
        }

        Ok(format::render(self.domain.kind, &summary, request.format))
    }
}

#[async_trait]
impl SummaryProvider for GeminiProvider {
    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderOutcome, ProviderError> {
        if request.records.is_empty() {
            return Ok(ProviderOutcome::failure(self.domain.no_records_error, self.name()));
        }
        let (Some(api_key), Some(api_url)) = (self.api_key.as_deref(), self.api_url.as_deref()) else {
            return Ok(ProviderOutcome::failure(
                format!("{} API is not configured", BACKEND),
                self.name(),
            ));
        };

        match self.request_summary(api_key, api_url, request).await {
            Ok(summary) => Ok(ProviderOutcome::success(summary, self.name())),
            Err(e) => {
                error!("{} request failed: {}", self.name(), e);
                Ok(ProviderOutcome::failure(
                    format!("{}{}", self.domain.provider_error_prefix, e),
                    self.name(),
                ))
            }
        }
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some() && self.api_url.is_some()
    }

    fn name(&self) -> &str {
        match self.domain.kind {
            DomainKind::Clinical => "Gemini",
            DomainKind::Veterinary => "Gemini Veterinary",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CLINICAL, VETERINARY};
    use crate::models::OutputFormat;
    use serde_json::{json, Value};
    use std::net::SocketAddr;
    use warp::http::StatusCode;
    use warp::Filter;

    /// Serves a single canned answer on an ephemeral port.
    fn fake_backend(status: StatusCode, body: Value) -> SocketAddr {
        let route = warp::post()
            .and(warp::header::exact("x-goog-api-key", "secret"))
            .map(move || warp::reply::with_status(warp::reply::json(&body), status));
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        addr
    }

    fn provider(domain: &'static Domain, addr: SocketAddr) -> GeminiProvider {
        GeminiProvider::new(
            domain,
            reqwest::Client::new(),
            Some("secret".into()),
            Some(format!("http://{}/generate", addr)),
        )
    }

    fn request(format: OutputFormat) -> ProviderRequest {
        ProviderRequest {
            records: vec![json!({"data_consulta": "15/01/2025"}).as_object().cloned().unwrap()],
            format,
        }
    }

    #[tokio::test]
    async fn reads_first_candidate_text() {
        let addr = fake_backend(
            StatusCode::OK,
            json!({"candidates": [{"content": {"parts": [{"text": "**Stable** patient"}]}}]}),
        );

        let outcome = provider(&CLINICAL, addr)
            .generate(&request(OutputFormat::Text))
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.summary, "Stable patient");
        assert_eq!(outcome.provider, "Gemini");
    }

    #[tokio::test]
    async fn upstream_status_becomes_failure() {
        let addr = fake_backend(StatusCode::FORBIDDEN, json!({"error": "denied"}));

        let outcome = provider(&CLINICAL, addr)
            .generate(&request(OutputFormat::Text))
            .await
            .unwrap();

        assert!(!outcome.success);
        let error = outcome.error.unwrap();
        assert!(error.starts_with("Error calling Gemini API (Status: 403)"));
        assert!(error.contains("denied"));
    }

    #[tokio::test]
    async fn veterinary_errors_are_prefixed() {
        let addr = fake_backend(StatusCode::OK, json!({"candidates": []}));

        let outcome = provider(&VETERINARY, addr)
            .generate(&request(OutputFormat::Html))
            .await
            .unwrap();

        assert_eq!(outcome.provider, "Gemini Veterinary");
        assert_eq!(
            outcome.error.as_deref(),
            Some("Error generating veterinary summary: Invalid response structure from Gemini API.")
        );
    }

    #[tokio::test]
    async fn blank_text_is_rejected() {
        let addr = fake_backend(
            StatusCode::OK,
            json!({"candidates": [{"content": {"parts": [{"text": "   "}]}}]}),
        );

        let outcome = provider(&CLINICAL, addr)
            .generate(&request(OutputFormat::Markdown))
            .await
            .unwrap();

        assert_eq!(outcome.error.as_deref(), Some("Generated summary is empty."));
    }
}
