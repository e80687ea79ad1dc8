use async_trait::async_trait;

use crate::errors::CapabilityError;
use crate::pattern::wire::WirePattern;

/// Proposes an instruction tree for a schema, given a sample of the page.
///
/// The returned value is unvalidated; callers convert it into a
/// [`crate::pattern::Pattern`] and reject it if the tree is malformed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PatternGenerator: Send + Sync {
    async fn generate_pattern(
        &self,
        document_sample: &str,
        schema_description: &str,
    ) -> Result<WirePattern, CapabilityError>;
}
