use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A visit record: raw client input before normalization, canonical keys after.
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    #[default]
    #[serde(rename = "texto", alias = "text")]
    Text,
    #[serde(rename = "html")]
    Html,
    #[serde(rename = "markdown")]
    Markdown,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "texto",
            Self::Html => "html",
            Self::Markdown => "markdown",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "texto" | "text" => Some(Self::Text),
            "html" => Some(Self::Html),
            "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }
}

// Pipeline input, built from a shape-validated request body.
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub subject_info: Record,
    /// Raw history as sent; the minimum-data validator decides whether it is usable.
    pub history: Value,
    pub format: OutputFormat,
    pub notes: Option<String>,
}

/// What a summary backend is asked to summarize.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub records: Vec<Record>,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderOutcome {
    pub success: bool,
    pub summary: String,
    pub provider: String,
    pub error: Option<String>,
}

impl ProviderOutcome {
    pub fn success(summary: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            success: true,
            summary: summary.into(),
            provider: provider.into(),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            success: false,
            summary: String::new(),
            provider: provider.into(),
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedData {
    pub total_records: usize,
    pub subject_info: Record,
    pub requested_format: OutputFormat,
    pub notes: Option<String>,
    pub processed_history: Vec<Record>,
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryResult {
    pub success: bool,
    pub summary: String,
    pub provider: String,
    pub processed_data: Option<ProcessedData>,
    pub warnings: Vec<String>,
    pub error: Option<String>,
}

impl SummaryResult {
    pub fn success(
        summary: String,
        provider: String,
        processed_data: ProcessedData,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            success: true,
            summary,
            provider,
            processed_data: Some(processed_data),
            warnings,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>, provider: impl Into<String>, warnings: Vec<String>) -> Self {
        Self {
            success: false,
            summary: String::new(),
            provider: provider.into(),
            processed_data: None,
            warnings,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub normalized_data: Vec<Record>,
    pub suggestions: Vec<String>,
}

// API response models
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub summary: String,
    pub provider: String,
    pub processed_data: ProcessedData,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SummaryErrorResponse {
    pub error: String,
    pub provider: String,
    pub warnings: Vec<String>,
}

/// Body of a successful pass-through summary.
#[derive(Debug, Serialize)]
pub struct HistorySummaryResponse {
    pub summary: String,
    pub provider: String,
}

#[derive(Debug, Serialize)]
pub struct HistorySummaryErrorResponse {
    pub error: String,
    pub provider: String,
}

impl ProviderOutcome {
    pub fn into_response(self) -> Result<HistorySummaryResponse, HistorySummaryErrorResponse> {
        if self.success {
            Ok(HistorySummaryResponse {
                summary: self.summary,
                provider: self.provider,
            })
        } else {
            Err(HistorySummaryErrorResponse {
                error: self
                    .error
                    .unwrap_or_else(|| "Unknown error while generating summary".to_string()),
                provider: self.provider,
            })
        }
    }
}

impl SummaryResult {
    /// Splits the result into the success or failure wire body.
    pub fn into_response(self) -> Result<SummaryResponse, SummaryErrorResponse> {
        match (self.success, self.processed_data) {
            (true, Some(processed_data)) => Ok(SummaryResponse {
                summary: self.summary,
                provider: self.provider,
                processed_data,
                warnings: self.warnings,
            }),
            _ => Err(SummaryErrorResponse {
                error: self
                    .error
                    .unwrap_or_else(|| "Unknown error while generating summary".to_string()),
                provider: self.provider,
                warnings: self.warnings,
            }),
        }
    }
}
