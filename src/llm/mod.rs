//! Generative capabilities backed by an OpenAI-compatible chat API.

pub mod backoff;
pub mod client;
pub mod errors;
pub mod prompts;
pub mod types;

pub use client::{LlmClient, LlmSettings};
pub use errors::LlmError;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::CapabilityError;
use crate::pattern::{PatternGenerator, WirePattern};
use crate::validation::{Judge, Repairer, SanitizationOutcome, ValidationVerdict};

#[async_trait]
impl PatternGenerator for LlmClient {
    async fn generate_pattern(
        &self,
        document_sample: &str,
        schema_description: &str,
    ) -> Result<WirePattern, CapabilityError> {
        let user_prompt = prompts::pattern_user_prompt(document_sample, schema_description);
        Ok(self
            .complete_json::<WirePattern>(&self.settings().pattern_model, prompts::PATTERN_SYSTEM_PROMPT, &user_prompt)
            .await?)
    }
}

#[async_trait]
impl Judge for LlmClient {
    async fn judge(&self, data: &Value, schema_description: &str) -> Result<ValidationVerdict, CapabilityError> {
        let user_prompt = prompts::judge_user_prompt(data, schema_description);
        Ok(self
            .complete_json::<ValidationVerdict>(&self.settings().validation_model, prompts::JUDGE_SYSTEM_PROMPT, &user_prompt)
            .await?)
    }
}

#[async_trait]
impl Repairer for LlmClient {
    async fn repair(
        &self,
        data: &Value,
        schema_description: &str,
        issues: &[String],
    ) -> Result<SanitizationOutcome, CapabilityError> {
        let user_prompt = prompts::repair_user_prompt(data, schema_description, issues);
        Ok(self
            .complete_json::<SanitizationOutcome>(&self.settings().validation_model, prompts::REPAIR_SYSTEM_PROMPT, &user_prompt)
            .await?)
    }
}
