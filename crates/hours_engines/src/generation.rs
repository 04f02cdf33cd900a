#![forbid(unsafe_code)]

use std::env;
use std::thread;
use std::time::Duration;

use serde_json::Value;

/// Boundary failure from the generation service. The pipeline never retries;
/// callers re-issue the row if they want another attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamError {
    pub provider: &'static str,
    pub error_kind: &'static str,
    pub http_status: Option<u16>,
}

impl UpstreamError {
    fn new(provider: &'static str, error_kind: &'static str, http_status: Option<u16>) -> Self {
        Self {
            provider,
            error_kind,
            http_status,
        }
    }

    pub fn safe_detail(&self) -> String {
        match self.http_status {
            Some(status) => format!(
                "provider={} error={} status={}",
                self.provider, self.error_kind, status
            ),
            None => format!("provider={} error={}", self.provider, self.error_kind),
        }
    }
}

const PROVIDER: &str = "hours_completion";

/// Externally supplied service endpoint, credential, and deployment id.
/// A fixture response bypasses the network entirely (and the rate-limit
/// pause) so callers can exercise the pipeline without a live service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationProviderConfig {
    pub completion_url: Option<String>,
    pub api_key: Option<String>,
    pub deployment: Option<String>,
    pub user_agent: String,
    pub fixture_completion: Option<String>,
}

impl GenerationProviderConfig {
    pub fn from_env() -> Self {
        Self {
            completion_url: env::var("HOURS_OAI_URL").ok().and_then(trim_non_empty),
            api_key: env::var("HOURS_OAI_KEY").ok().and_then(trim_non_empty),
            deployment: env::var("HOURS_OAI_DEPLOYMENT").ok().and_then(trim_non_empty),
            user_agent: env::var("HOURS_HTTP_USER_AGENT")
                .unwrap_or_else(|_| "hours-pipeline/1.0".to_string()),
            fixture_completion: None,
        }
    }

    pub fn fixture(completion: impl Into<String>) -> Self {
        Self {
            completion_url: None,
            api_key: None,
            deployment: None,
            user_agent: "hours-pipeline/1.0".to_string(),
            fixture_completion: Some(completion.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    pub timeout_ms: u32,
    /// Fixed pause honored after every live call, per call, to respect the
    /// service rate limit.
    pub post_call_delay_ms: u64,
    pub max_completion_tokens: u32,
    pub temperature: f32,
}

impl GenerationConfig {
    pub fn mvp_v1() -> Self {
        Self {
            timeout_ms: 10_000,
            post_call_delay_ms: 50,
            max_completion_tokens: 256,
            temperature: 0.2,
        }
    }
}

/// Token the prompt teaches the model to emit after exactly one entry.
pub const COMPLETION_STOP_TOKEN: &str = "%%";

/// The sole external boundary: one synchronous completion request per
/// preprocessed clause. Returns the raw candidate-entry string untouched
/// except for stop-token and whitespace trimming; trusting its shape is the
/// rule battery's job, never this client's.
#[derive(Debug, Clone)]
pub struct GenerationClient {
    config: GenerationConfig,
    provider_config: GenerationProviderConfig,
}

impl GenerationClient {
    pub fn new(config: GenerationConfig, provider_config: GenerationProviderConfig) -> Self {
        Self {
            config,
            provider_config,
        }
    }

    pub fn default_from_env() -> Self {
        Self::new(GenerationConfig::mvp_v1(), GenerationProviderConfig::from_env())
    }

    pub fn generate(&self, clause: &str) -> Result<String, UpstreamError> {
        if let Some(fixture) = self.provider_config.fixture_completion.as_deref() {
            return Ok(trim_completion(fixture));
        }

        let url = self
            .provider_config
            .completion_url
            .as_deref()
            .ok_or_else(|| UpstreamError::new(PROVIDER, "missing_config", None))?;
        let api_key = self
            .provider_config
            .api_key
            .as_deref()
            .ok_or_else(|| UpstreamError::new(PROVIDER, "missing_config", None))?;

        let payload = serde_json::json!({
            "model": self.provider_config.deployment,
            "prompt": clause,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_completion_tokens,
            "top_p": 1,
            "best_of": 1,
            "stop": [COMPLETION_STOP_TOKEN],
        });

        let agent = build_http_agent(self.config.timeout_ms, &self.provider_config.user_agent)
            .map_err(|_| UpstreamError::new(PROVIDER, "config_invalid", None))?;
        let response = agent
            .post(url)
            .set("Content-Type", "application/json")
            .set("Accept", "application/json")
            .set("api-key", api_key)
            .send_json(payload)
            .map_err(upstream_error_from_ureq);
        // Rate limit is per call, so the pause applies on failure paths too.
        thread::sleep(Duration::from_millis(self.config.post_call_delay_ms));
        let response = response?;

        let body: Value = serde_json::from_reader(response.into_reader())
            .map_err(|_| UpstreamError::new(PROVIDER, "json_parse", None))?;
        let text = body
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.get("text"))
            .and_then(Value::as_str)
            .ok_or_else(|| UpstreamError::new(PROVIDER, "empty_completion", None))?;
        Ok(trim_completion(text))
    }
}

fn trim_completion(raw: &str) -> String {
    raw.trim()
        .trim_end_matches(COMPLETION_STOP_TOKEN)
        .trim()
        .to_string()
}

fn build_http_agent(timeout_ms: u32, user_agent: &str) -> Result<ureq::Agent, String> {
    if timeout_ms == 0 {
        return Err("timeout must be > 0".to_string());
    }
    let timeout = Duration::from_millis(u64::from(timeout_ms).max(100));
    Ok(ureq::AgentBuilder::new()
        .timeout_connect(timeout)
        .timeout_read(timeout)
        .timeout_write(timeout)
        .user_agent(user_agent)
        .build())
}

fn upstream_error_from_ureq(err: ureq::Error) -> UpstreamError {
    match err {
        ureq::Error::Status(status, _) => {
            UpstreamError::new(PROVIDER, "http_non_200", Some(status as u16))
        }
        ureq::Error::Transport(transport) => {
            let combined = format!("{:?} {}", transport.kind(), transport);
            UpstreamError::new(PROVIDER, classify_transport_error_kind(&combined), None)
        }
    }
}

fn classify_transport_error_kind(raw: &str) -> &'static str {
    let lower = raw.to_ascii_lowercase();
    if lower.contains("timeout") {
        "timeout"
    } else if lower.contains("tls") || lower.contains("ssl") {
        "tls"
    } else if lower.contains("dns") {
        "dns"
    } else if lower.contains("connection") || lower.contains("connect") {
        "connection"
    } else {
        "transport"
    }
}

fn trim_non_empty(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
