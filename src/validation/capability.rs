use async_trait::async_trait;
use serde_json::Value;

use crate::errors::CapabilityError;
use crate::validation::types::{SanitizationOutcome, ValidationVerdict};

/// Decides whether extracted data matches the schema it was extracted for.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Judge: Send + Sync {
    async fn judge(&self, data: &Value, schema_description: &str) -> Result<ValidationVerdict, CapabilityError>;
}

/// Proposes a full replacement for data the judge rejected.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Repairer: Send + Sync {
    async fn repair(
        &self,
        data: &Value,
        schema_description: &str,
        issues: &[String],
    ) -> Result<SanitizationOutcome, CapabilityError>;
}
