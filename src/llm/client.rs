use reqwest::{Client, ClientBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::llm::backoff::calculate_backoff_delay;
use crate::llm::errors::LlmError;
use crate::llm::types::{ChatRequest, ChatResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_PATTERN_MODEL: &str = "gpt-4o";
pub const DEFAULT_VALIDATION_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 500;
const USER_AGENT: &str = concat!("pattern-scraper/", env!("CARGO_PKG_VERSION"));
const MAX_ERROR_BODY_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmSettings {
    pub base_url: String,
    pub api_key: String,
    pub pattern_model: String,
    pub validation_model: String,
    pub max_retries: u32,
    pub timeout: Duration,
    pub retry_base_delay: Duration,
}

impl LlmSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            pattern_model: DEFAULT_PATTERN_MODEL.to_string(),
            validation_model: DEFAULT_VALIDATION_MODEL.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry_base_delay: Duration::from_millis(DEFAULT_RETRY_BASE_DELAY_MS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }
}

/// OpenAI-compatible chat completions client in JSON mode.
#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    endpoint: Url,
    settings: LlmSettings,
}

impl LlmClient {
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        if settings.api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let endpoint = Url::parse(&format!(
            "{}/chat/completions",
            settings.base_url.trim_end_matches('/')
        ))?;

        let http = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(10))
            .timeout(settings.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| LlmError::Unknown(e.to_string()))?;

        Ok(Self {
            http,
            endpoint,
            settings,
        })
    }

    pub fn settings(&self) -> &LlmSettings {
        &self.settings
    }

    /// Send one JSON-mode request and decode the first choice into `T`,
    /// retrying transient failures.
    #[instrument(skip_all, fields(model = %model))]
    pub async fn complete_json<T: DeserializeOwned>(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<T, LlmError> {
        let request = ChatRequest::json(model, system_prompt, user_prompt);
        let base_delay_ms = self.settings.retry_base_delay.as_millis() as u64;
        let mut attempt = 0;

        loop {
            match self.send(&request).await {
                Ok(content) => {
                    return serde_json::from_str(strip_code_fences(&content))
                        .map_err(|e| LlmError::Parse(e.to_string()));
                }
                Err(e) if e.should_retry() && attempt < self.settings.max_retries => {
                    let delay = calculate_backoff_delay(attempt, base_delay_ms);
                    warn!(attempt, error = %e, delay_ms = delay.as_millis() as u64, "Retrying completion");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.settings.api_key)
            .json(request)
            .send()
            .await
            .map_err(LlmError::from_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Http {
                status,
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let content = completion.first_content().ok_or(LlmError::EmptyResponse)?;
        debug!(chars = content.len(), "Received completion");
        Ok(content.to_string())
    }
}

/// Drop a surrounding markdown code fence, if the model added one.
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
