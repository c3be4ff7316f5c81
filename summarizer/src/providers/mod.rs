//! Summary backends.
//!
//! The orchestration service only sees the [`SummaryProvider`] trait; which
//! backend implements it is decided once at startup from configuration and
//! injected into the service.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::Config;
use crate::domain::Domain;
use crate::error::ProviderError;
use crate::models::{ProviderOutcome, ProviderRequest};

pub mod format;
pub mod gemini;
pub mod mock;
pub mod perplexity;
pub mod prompt;

pub use gemini::GeminiProvider;
pub use mock::MockProvider;
pub use perplexity::PerplexityProvider;

/// Turns a normalized history into summary text.
///
/// Backends report ordinary failures (bad upstream status, empty answer) as a
/// failed [`ProviderOutcome`]. An `Err` means something unexpected escaped and
/// is treated by the caller as an internal error.
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderOutcome, ProviderError>;

    /// Whether the backend is configured well enough to be called.
    fn is_available(&self) -> bool;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Mock,
    Gemini,
    Perplexity,
}

impl ProviderKind {
    /// Unknown selections fall back to the mock backend.
    pub fn from_selection(selection: &str) -> Self {
        let normalized = selection.trim().to_lowercase();
        let base = normalized
            .strip_suffix("-veterinary")
            .or_else(|| normalized.strip_suffix("-veterinario"))
            .unwrap_or(normalized.as_str());

        match base {
            "gemini" => Self::Gemini,
            "perplexity" => Self::Perplexity,
            "mock" | "" => Self::Mock,
            other => {
                warn!("Unknown summary provider '{}', falling back to mock", other);
                Self::Mock
            }
        }
    }
}

pub fn http_client(config: &Config) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.provider_timeout_secs))
        .build()
}

pub fn build_provider(
    domain: &'static Domain,
    selection: &str,
    config: &Config,
    client: reqwest::Client,
) -> Arc<dyn SummaryProvider> {
    let provider: Arc<dyn SummaryProvider> = match ProviderKind::from_selection(selection) {
        ProviderKind::Mock => Arc::new(MockProvider::new(domain)),
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(
            domain,
            client,
            config.gemini_api_key.clone(),
            config.gemini_api_url.clone(),
        )),
        ProviderKind::Perplexity => Arc::new(PerplexityProvider::new(
            domain,
            client,
            config.perplexity_api_key.clone(),
            config.perplexity_api_url.clone(),
            config.perplexity_model.clone(),
        )),
    };

    info!(
        "{} summaries use provider '{}' (available: {})",
        domain.kind.as_str(),
        provider.name(),
        provider.is_available()
    );
    provider
}
