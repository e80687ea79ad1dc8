use serde::Serialize;
use std::fmt::{Display, Formatter};

use crate::pattern::ValueType;

/// A field-level problem that did not stop extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldFault {
    /// Output path of the field, e.g. `reviews[2].rating`. Faults found before
    /// any element is visited use `[]` for list positions.
    pub path: String,
    #[serde(flatten)]
    pub kind: FaultKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FaultKind {
    /// The selector could not be evaluated; the field is `null`.
    #[serde(rename_all = "camelCase")]
    Selector { selector: String, reason: String },

    /// The value did not read as its declared type and was degraded.
    #[serde(rename_all = "camelCase")]
    Coercion { value_type: ValueType, raw: String },
}

impl FieldFault {
    pub fn is_selector_fault(&self) -> bool {
        matches!(self.kind, FaultKind::Selector { .. })
    }
}

impl Display for FieldFault {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            FaultKind::Selector { selector, reason } => {
                write!(f, "{}: invalid selector '{}': {}", self.path, selector, reason)
            }
            FaultKind::Coercion { value_type, raw } => {
                write!(f, "{}: '{}' is not a valid {}", self.path, raw, value_type.as_str())
            }
        }
    }
}
