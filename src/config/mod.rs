//! Configuration loaded from environment variables.
//!
//! Every setting has a default, so an empty environment yields a usable
//! configuration apart from the API key, which the HTTP capabilities check
//! when the client is built.

use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::cache::CachePolicy;
use crate::llm::LlmSettings;
use crate::llm::client::{
    DEFAULT_BASE_URL, DEFAULT_MAX_RETRIES, DEFAULT_PATTERN_MODEL, DEFAULT_TIMEOUT_SECS,
    DEFAULT_VALIDATION_MODEL,
};
use crate::validation::ValidationSettings;

pub const ENV_MAX_VALIDATION_ATTEMPTS: &str = "SCRAPER_MAX_VALIDATION_ATTEMPTS";
pub const ENV_SANITIZE: &str = "SCRAPER_SANITIZE";
pub const ENV_CACHE_POLICY: &str = "SCRAPER_CACHE";
pub const ENV_LLM_BASE_URL: &str = "LLM_BASE_URL";
pub const ENV_LLM_API_KEY: &str = "LLM_API_KEY";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_LLM_PATTERN_MODEL: &str = "LLM_PATTERN_MODEL";
pub const ENV_LLM_VALIDATION_MODEL: &str = "LLM_VALIDATION_MODEL";
pub const ENV_LLM_MAX_RETRIES: &str = "LLM_MAX_RETRIES";
pub const ENV_LLM_TIMEOUT_SECS: &str = "LLM_TIMEOUT_SECS";

/// Repair rounds per scrape when nothing is configured.
const DEFAULT_MAX_VALIDATION_ATTEMPTS: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    validation: ValidationSettings,
    cache_policy: CachePolicy,
    llm: LlmSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let validation = ValidationSettings::new(
            parse_var(ENV_SANITIZE, parse_bool)?.unwrap_or(true),
            parse_var(ENV_MAX_VALIDATION_ATTEMPTS, u32::from_str)?
                .unwrap_or(DEFAULT_MAX_VALIDATION_ATTEMPTS),
        );
        let cache_policy = parse_var(ENV_CACHE_POLICY, CachePolicy::from_str)?.unwrap_or_default();

        let api_key = var(ENV_LLM_API_KEY)
            .or_else(|| var(ENV_OPENAI_API_KEY))
            .unwrap_or_default();
        let mut llm = LlmSettings::new(api_key)
            .with_base_url(var(ENV_LLM_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()));
        llm.pattern_model =
            var(ENV_LLM_PATTERN_MODEL).unwrap_or_else(|| DEFAULT_PATTERN_MODEL.to_string());
        llm.validation_model =
            var(ENV_LLM_VALIDATION_MODEL).unwrap_or_else(|| DEFAULT_VALIDATION_MODEL.to_string());
        llm.max_retries = parse_var(ENV_LLM_MAX_RETRIES, u32::from_str)?.unwrap_or(DEFAULT_MAX_RETRIES);
        llm.timeout = Duration::from_secs(
            parse_var(ENV_LLM_TIMEOUT_SECS, u64::from_str)?.unwrap_or(DEFAULT_TIMEOUT_SECS),
        );

        Ok(Self {
            validation,
            cache_policy,
            llm,
        })
    }

    pub fn validation(&self) -> ValidationSettings {
        self.validation
    }

    pub fn cache_policy(&self) -> CachePolicy {
        self.cache_policy
    }

    pub fn llm(&self) -> &LlmSettings {
        &self.llm
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Non-empty, trimmed value of an environment variable.
fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T, E: ToString>(
    key: &'static str,
    parse: impl Fn(&str) -> Result<T, E>,
) -> Result<Option<T>, ConfigError> {
    var(key)
        .map(|value| {
            parse(&value).map_err(|e| ConfigError::InvalidValue {
                field: key,
                reason: e.to_string(),
            })
        })
        .transpose()
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("expected a boolean, got '{other}'")),
    }
}
