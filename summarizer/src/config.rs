use anyhow::Result;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub log_level: String,
    /// Backend for the clinical (human patient) pipeline.
    pub summary_provider: String,
    /// Backend for the veterinary pipeline.
    pub veterinary_provider: String,
    pub gemini_api_key: Option<String>,
    pub gemini_api_url: Option<String>,
    pub perplexity_api_key: Option<String>,
    pub perplexity_api_url: String,
    pub perplexity_model: String,
    pub provider_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            log_level: std::env::var("LOG_LEVEL")
                .unwrap_or_else(|_| "info".to_string()),
            summary_provider: std::env::var("SUMMARY_PROVIDER")
                .unwrap_or_else(|_| "mock".to_string()),
            veterinary_provider: std::env::var("VETERINARY_PROVIDER")
                .unwrap_or_else(|_| "mock".to_string()),
            gemini_api_key: non_empty_var("GEMINI_API_KEY"),
            gemini_api_url: non_empty_var("GEMINI_API_URL"),
            perplexity_api_key: non_empty_var("PERPLEXITY_API_KEY"),
            perplexity_api_url: std::env::var("PERPLEXITY_API_URL")
                .unwrap_or_else(|_| "https://api.perplexity.ai".to_string()),
            perplexity_model: std::env::var("PERPLEXITY_MODEL")
                .unwrap_or_else(|_| "sonar-pro".to_string()),
            provider_timeout_secs: std::env::var("PROVIDER_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()?,
        })
    }
}

impl Default for Config {
    /// Stub-only configuration, no credentials.
    fn default() -> Self {
        Config {
            port: 8080,
            log_level: "info".to_string(),
            summary_provider: "mock".to_string(),
            veterinary_provider: "mock".to_string(),
            gemini_api_key: None,
            gemini_api_url: None,
            perplexity_api_key: None,
            perplexity_api_url: "https://api.perplexity.ai".to_string(),
            perplexity_model: "sonar-pro".to_string(),
            provider_timeout_secs: 60,
        }
    }
}

// An empty credential counts as missing so the provider reports itself unavailable.
fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
