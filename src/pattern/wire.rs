//! JSON shape exchanged with pattern generators and stored in the cache.
//!
//! Every field a generator may omit is optional here. Structural validation
//! happens when converting into [`crate::pattern::Pattern`].

use serde::{Deserialize, Serialize};

use crate::pattern::model::ValueType;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePattern {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instructions: Vec<WireInstruction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<WirePagination>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireInstruction {
    #[serde(default)]
    pub field_name: String,
    #[serde(default)]
    pub selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_list: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_instructions: Option<Vec<WireInstruction>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePagination {
    #[serde(default)]
    pub selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}
