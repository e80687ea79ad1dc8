use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::pattern::{
    errors::PatternError,
    wire::{WireInstruction, WirePagination, WirePattern},
};

const DEFAULT_PAGINATION_ATTRIBUTE: &str = "href";

/// Scalar type a leaf coerces its raw text into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    String,
    Number,
    Date,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Date => "date",
        }
    }
}

/// One field-extraction rule.
///
/// Leaves and composites are distinct variants of [`NodeKind`], so a leaf can
/// never carry children and a composite can never carry a value type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireInstruction", into = "WireInstruction")]
pub struct InstructionNode {
    field_name: String,
    selector: String,
    is_list: bool,
    kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Leaf {
        attribute: Option<String>,
        value_type: ValueType,
    },
    Composite {
        children: Vec<InstructionNode>,
    },
}

impl InstructionNode {
    /// Leaf reading the text content of the first match.
    pub fn leaf(
        field_name: impl Into<String>,
        selector: impl Into<String>,
        value_type: ValueType,
    ) -> Result<Self, PatternError> {
        let node = Self {
            field_name: field_name.into(),
            selector: selector.into(),
            is_list: false,
            kind: NodeKind::Leaf {
                attribute: None,
                value_type,
            },
        };
        node.check_own_fields(&node.field_name)?;
        Ok(node)
    }

    /// Composite node whose value is an object built from `children`.
    pub fn composite(
        field_name: impl Into<String>,
        selector: impl Into<String>,
        children: Vec<InstructionNode>,
    ) -> Result<Self, PatternError> {
        let node = Self {
            field_name: field_name.into(),
            selector: selector.into(),
            is_list: false,
            kind: NodeKind::Composite { children },
        };
        node.validate(&node.field_name)?;
        Ok(node)
    }

    /// Read `attribute` instead of text content. No-op on composites.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        if let NodeKind::Leaf {
            attribute: slot, ..
        } = &mut self.kind
        {
            let attribute = attribute.into();
            *slot = (!attribute.is_empty()).then_some(attribute);
        }
        self
    }

    /// Collect every match instead of the first one.
    pub fn list(mut self) -> Self {
        self.is_list = true;
        self
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn is_list(&self) -> bool {
        self.is_list
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    pub fn children(&self) -> &[InstructionNode] {
        match &self.kind {
            NodeKind::Leaf { .. } => &[],
            NodeKind::Composite { children } => children,
        }
    }

    fn check_own_fields(&self, path: &str) -> Result<(), PatternError> {
        if self.field_name.trim().is_empty() {
            return Err(PatternError::EmptyFieldName {
                path: path.to_string(),
            });
        }
        if self.selector.trim().is_empty() {
            return Err(PatternError::EmptySelector {
                path: path.to_string(),
            });
        }
        Ok(())
    }

    fn validate(&self, path: &str) -> Result<(), PatternError> {
        self.check_own_fields(path)?;
        if let NodeKind::Composite { children } = &self.kind {
            if children.is_empty() {
                return Err(PatternError::NoChildren {
                    path: path.to_string(),
                });
            }
            check_siblings(children, |i| format!("{path}.childInstructions[{i}]"))?;
        }
        Ok(())
    }

    fn from_wire(wire: WireInstruction, path: &str) -> Result<Self, PatternError> {
        let children = wire.child_instructions.unwrap_or_default();
        let kind = if children.is_empty() {
            NodeKind::Leaf {
                attribute: wire.attribute.filter(|a| !a.trim().is_empty()),
                value_type: wire.value_type.unwrap_or_default(),
            }
        } else {
            let children = children
                .into_iter()
                .enumerate()
                .map(|(i, child)| Self::from_wire(child, &format!("{path}.childInstructions[{i}]")))
                .collect::<Result<Vec<_>, _>>()?;
            NodeKind::Composite { children }
        };

        let node = Self {
            field_name: wire.field_name,
            selector: wire.selector,
            is_list: wire.is_list.unwrap_or(false),
            kind,
        };
        node.validate(path)?;
        Ok(node)
    }
}

impl TryFrom<WireInstruction> for InstructionNode {
    type Error = PatternError;

    fn try_from(wire: WireInstruction) -> Result<Self, Self::Error> {
        Self::from_wire(wire, "instruction")
    }
}

impl From<InstructionNode> for WireInstruction {
    fn from(node: InstructionNode) -> Self {
        let (attribute, value_type, child_instructions) = match node.kind {
            NodeKind::Leaf {
                attribute,
                value_type,
            } => (attribute, Some(value_type), None),
            NodeKind::Composite { children } => (
                None,
                None,
                Some(children.into_iter().map(WireInstruction::from).collect()),
            ),
        };
        WireInstruction {
            field_name: node.field_name,
            selector: node.selector,
            attribute,
            value_type,
            is_list: Some(node.is_list),
            child_instructions,
        }
    }
}

/// Where the "next page" link of a listing lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationRule {
    selector: String,
    attribute: String,
}

impl PaginationRule {
    pub fn new(selector: impl Into<String>) -> Result<Self, PatternError> {
        let selector = selector.into();
        if selector.trim().is_empty() {
            return Err(PatternError::EmptyPaginationSelector);
        }
        Ok(Self {
            selector,
            attribute: DEFAULT_PAGINATION_ATTRIBUTE.to_string(),
        })
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        let attribute = attribute.into();
        if !attribute.trim().is_empty() {
            self.attribute = attribute;
        }
        self
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }
}

/// A named instruction tree describing how to pull one schema out of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WirePattern", into = "WirePattern")]
pub struct Pattern {
    name: String,
    description: String,
    instructions: Vec<InstructionNode>,
    pagination: Option<PaginationRule>,
}

impl Pattern {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        instructions: Vec<InstructionNode>,
    ) -> Result<Self, PatternError> {
        if instructions.is_empty() {
            return Err(PatternError::NoInstructions);
        }
        check_siblings(&instructions, |i| format!("instructions[{i}]"))?;
        Ok(Self {
            name: name.into(),
            description: description.into(),
            instructions,
            pagination: None,
        })
    }

    pub fn with_pagination(mut self, rule: PaginationRule) -> Self {
        self.pagination = Some(rule);
        self
    }

    /// Parse and validate a pattern from its JSON wire form.
    pub fn from_json(json: &str) -> Result<Self, PatternError> {
        let wire: WirePattern =
            serde_json::from_str(json).map_err(|e| PatternError::Malformed(e.to_string()))?;
        Self::try_from(wire)
    }

    pub fn to_json(&self) -> Result<String, PatternError> {
        serde_json::to_string(&WirePattern::from(self.clone()))
            .map_err(|e| PatternError::Malformed(e.to_string()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn instructions(&self) -> &[InstructionNode] {
        &self.instructions
    }

    pub fn pagination(&self) -> Option<&PaginationRule> {
        self.pagination.as_ref()
    }
}

impl TryFrom<WirePattern> for Pattern {
    type Error = PatternError;

    fn try_from(wire: WirePattern) -> Result<Self, Self::Error> {
        let instructions = wire
            .instructions
            .into_iter()
            .enumerate()
            .map(|(i, instruction)| {
                InstructionNode::from_wire(instruction, &format!("instructions[{i}]"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut pattern = Self::new(wire.name, wire.description, instructions)?;
        if let Some(pagination) = wire.pagination {
            let mut rule = PaginationRule::new(pagination.selector)?;
            if let Some(attribute) = pagination.attribute {
                rule = rule.with_attribute(attribute);
            }
            pattern = pattern.with_pagination(rule);
        }
        Ok(pattern)
    }
}

impl From<Pattern> for WirePattern {
    fn from(pattern: Pattern) -> Self {
        WirePattern {
            name: pattern.name,
            description: pattern.description,
            instructions: pattern
                .instructions
                .into_iter()
                .map(WireInstruction::from)
                .collect(),
            pagination: pattern.pagination.map(|rule| WirePagination {
                selector: rule.selector,
                attribute: Some(rule.attribute),
            }),
        }
    }
}

fn check_siblings(
    siblings: &[InstructionNode],
    child_path: impl Fn(usize) -> String,
) -> Result<(), PatternError> {
    let mut seen = HashSet::new();
    for (i, sibling) in siblings.iter().enumerate() {
        if !seen.insert(sibling.field_name()) {
            return Err(PatternError::DuplicateFieldName {
                path: child_path(i),
                field_name: sibling.field_name().to_string(),
            });
        }
    }
    Ok(())
}
