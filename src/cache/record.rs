use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::fingerprint::Fingerprint;
use crate::pattern::{Pattern, PatternError};

/// A pattern as stored by the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedPatternRecord {
    pub fingerprint: Fingerprint,
    pub serialized_instructions: String,
    pub originating_schema: String,
    pub last_updated: DateTime<Utc>,
}

impl CachedPatternRecord {
    pub fn new(pattern: &Pattern, schema_description: &str) -> Result<Self, PatternError> {
        Ok(Self {
            fingerprint: Fingerprint::of(schema_description),
            serialized_instructions: pattern.to_json()?,
            originating_schema: schema_description.to_string(),
            last_updated: Utc::now(),
        })
    }

    /// Decode and re-validate the stored pattern.
    pub fn pattern(&self) -> Result<Pattern, PatternError> {
        Pattern::from_json(&self.serialized_instructions)
    }
}
