use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{format, prompt, SummaryProvider};
use crate::domain::{Domain, DomainKind};
use crate::error::ProviderError;
use crate::models::{ProviderOutcome, ProviderRequest};

const BACKEND: &str = "Perplexity";
const TEMPERATURE: f32 = 0.5;
const MAX_TOKENS: u32 = 500;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChatMessage>,
}

/// Perplexity chat completions backend.
pub struct PerplexityProvider {
    domain: &'static Domain,
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl PerplexityProvider {
    pub fn new(
        domain: &'static Domain,
        client: reqwest::Client,
        api_key: Option<String>,
        base_url: String,
        model: String,
    ) -> Self {
        Self {
            domain,
            client,
            api_key,
            base_url,
            model,
        }
    }

    async fn request_summary(&self, api_key: &str, request: &ProviderRequest) -> Result<String, ProviderError> {
        let (system, user) = prompt::chat_messages(self.domain, request)?;
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: Some(system),
                },
                ChatMessage {
                    role: "user".into(),
                    content: Some(user),
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        debug!("Calling {} ({}) with {} record(s)", BACKEND, self.model, request.records.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
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

        let parsed: ChatResponse = serde_json::from_str(&text)?;
        let summary = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or(ProviderError::InvalidResponse(BACKEND))?;
        if summary.trim().is_empty() {
            return Err(ProviderError::EmptySummary);
        }

        Ok(format::render(self.domain.kind, &summary, request.format))
    }
}

#[async_trait]
impl SummaryProvider for PerplexityProvider {
    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderOutcome, ProviderError> {
        if request.records.is_empty() {
            return Ok(ProviderOutcome::failure(self.domain.no_records_error, self.name()));
        }
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(ProviderOutcome::failure(
                format!("{} API is not configured", BACKEND),
                self.name(),
            ));
        };

        match self.request_summary(api_key, request).await {
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
        self.api_key.is_some()
    }

    fn name(&self) -> &str {
        match self.domain.kind {
            DomainKind::Clinical => "Perplexity",
            DomainKind::Veterinary => "Perplexity Veterinary",
        }
    }
}
