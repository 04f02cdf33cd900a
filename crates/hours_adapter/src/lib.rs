#![forbid(unsafe_code)]

use hours_engines::generation::GenerationClient;
use hours_pipeline::row::normalize_hours;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NormalizeHoursRequest {
    pub hours_text: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NormalizeHoursResponse {
    pub original_text: String,
    pub formatted_candidate: String,
    pub is_valid: bool,
    pub failed_rules: Vec<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AdapterHealthResponse {
    pub status: String,
    pub outcome: String,
    pub reason: Option<String>,
}

/// Single-record service runtime: one generation client, one pipeline
/// invocation per request. Formatting problems surface as client errors,
/// never as a crash; only the upstream boundary can actually fail.
#[derive(Debug, Clone)]
pub struct AdapterRuntime {
    client: GenerationClient,
}

impl AdapterRuntime {
    pub fn new(client: GenerationClient) -> Self {
        Self { client }
    }

    pub fn default_from_env() -> Self {
        Self::new(GenerationClient::default_from_env())
    }

    pub fn health_report(&self) -> AdapterHealthResponse {
        AdapterHealthResponse {
            status: "ok".to_string(),
            outcome: "READY".to_string(),
            reason: None,
        }
    }

    pub fn normalize(
        &self,
        request: NormalizeHoursRequest,
    ) -> Result<NormalizeHoursResponse, String> {
        let hours_text = request.hours_text.trim();
        if hours_text.is_empty() {
            return Err("hours_text must not be empty".to_string());
        }
        let normalized =
            normalize_hours(hours_text, &self.client).map_err(|err| err.safe_detail())?;
        Ok(NormalizeHoursResponse {
            original_text: normalized.candidate.original_text().to_string(),
            formatted_candidate: normalized.candidate.formatted().to_string(),
            is_valid: normalized.candidate.is_valid(),
            failed_rules: normalized.report.failed_rule_labels(),
        })
    }
}
