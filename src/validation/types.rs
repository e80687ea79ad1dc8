use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationVerdict {
    pub is_valid: bool,
    #[serde(default)]
    pub issues: Vec<String>,
}

impl ValidationVerdict {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            issues: Vec::new(),
        }
    }

    pub fn invalid(issues: Vec<String>) -> Self {
        Self {
            is_valid: false,
            issues,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizationOutcome {
    #[serde(default)]
    pub sanitized_data: Value,
    #[serde(default, alias = "changes")]
    pub changes_applied: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationSettings {
    /// When false a negative verdict is final.
    pub sanitize: bool,
    /// Upper bound on repair rounds.
    pub max_attempts: u32,
}

impl ValidationSettings {
    pub fn new(sanitize: bool, max_attempts: u32) -> Self {
        Self { sanitize, max_attempts }
    }
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self::new(true, DEFAULT_MAX_ATTEMPTS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoopTerminal {
    Accepted,
    RejectedFinal,
}

/// Terminal state of one validation run along with the data it settled on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub terminal: LoopTerminal,
    pub verdict: ValidationVerdict,
    #[serde(skip_serializing)]
    pub data: Value,
    pub repair_rounds: u32,
    pub changes: Vec<String>,
}

impl ValidationReport {
    pub fn is_accepted(&self) -> bool {
        self.terminal == LoopTerminal::Accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_verdict_wire_shape() {
        let verdict: ValidationVerdict =
            serde_json::from_value(json!({ "isValid": false, "issues": ["rating should be 1-5"] })).unwrap();
        assert_eq!(verdict, ValidationVerdict::invalid(vec!["rating should be 1-5".to_string()]));

        let verdict: ValidationVerdict = serde_json::from_value(json!({ "isValid": true })).unwrap();
        assert_eq!(verdict, ValidationVerdict::valid());
    }

    #[test]
    fn test_sanitization_outcome_accepts_changes_alias() {
        let outcome: SanitizationOutcome = serde_json::from_value(json!({
            "sanitizedData": { "rating": 4 },
            "changes": ["clamped rating"]
        }))
        .unwrap();
        assert_eq!(outcome.sanitized_data, json!({ "rating": 4 }));
        assert_eq!(outcome.changes_applied, vec!["clamped rating".to_string()]);
    }
}
