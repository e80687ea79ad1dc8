//! Depth-first evaluation of an instruction tree against a parsed document.
//!
//! Selectors are compiled once per extraction. A selector that fails to
//! compile is reported once and its field resolves to `null` everywhere,
//! without affecting sibling fields.

use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::coerce::coerce_checked;
use crate::engine::errors::{FaultKind, FieldFault};
use crate::pattern::{InstructionNode, NodeKind, Pattern};

/// Where a selector is evaluated: the whole document for top-level
/// instructions, the matched element for children.
#[derive(Clone, Copy)]
pub enum Scope<'a> {
    Document(&'a Html),
    Element(ElementRef<'a>),
}

impl<'a> Scope<'a> {
    pub fn first(self, selector: &Selector) -> Option<ElementRef<'a>> {
        match self {
            Self::Document(document) => document.select(selector).next(),
            Self::Element(element) => element.select(selector).next(),
        }
    }

    /// All matches in document order.
    pub fn all(self, selector: &Selector) -> Vec<ElementRef<'a>> {
        match self {
            Self::Document(document) => document.select(selector).collect(),
            Self::Element(element) => element.select(selector).collect(),
        }
    }
}

struct CompiledNode<'p> {
    node: &'p InstructionNode,
    selector: Option<Selector>,
    children: Vec<CompiledNode<'p>>,
}

impl<'p> CompiledNode<'p> {
    fn compile(node: &'p InstructionNode, path: &str, faults: &mut Vec<FieldFault>) -> Self {
        let selector = match Selector::parse(node.selector()) {
            Ok(selector) => Some(selector),
            Err(e) => {
                warn!(path, selector = node.selector(), error = %e, "Skipping field with invalid selector");
                faults.push(FieldFault {
                    path: path.to_string(),
                    kind: FaultKind::Selector {
                        selector: node.selector().to_string(),
                        reason: e.to_string(),
                    },
                });
                None
            }
        };

        let prefix = if node.is_list() {
            format!("{path}[]")
        } else {
            path.to_string()
        };
        let children = node
            .children()
            .iter()
            .map(|child| Self::compile(child, &format!("{prefix}.{}", child.field_name()), faults))
            .collect();

        Self {
            node,
            selector,
            children,
        }
    }
}

pub fn resolve_pattern(
    document: &Html,
    pattern: &Pattern,
    faults: &mut Vec<FieldFault>,
) -> Map<String, Value> {
    let mut data = Map::new();
    for instruction in pattern.instructions() {
        let compiled = CompiledNode::compile(instruction, instruction.field_name(), faults);
        let value = resolve(Scope::Document(document), &compiled, instruction.field_name(), faults);
        data.insert(instruction.field_name().to_string(), value);
    }
    data
}

fn resolve(scope: Scope<'_>, compiled: &CompiledNode<'_>, path: &str, faults: &mut Vec<FieldFault>) -> Value {
    let Some(selector) = &compiled.selector else {
        return Value::Null;
    };

    if compiled.node.is_list() {
        let elements = scope.all(selector);
        debug!(path, matches = elements.len(), "Resolved list field");
        let values = elements
            .into_iter()
            .enumerate()
            .map(|(i, element)| resolve_element(element, compiled, &format!("{path}[{i}]"), faults))
            .collect();
        Value::Array(values)
    } else {
        match scope.first(selector) {
            Some(element) => resolve_element(element, compiled, path, faults),
            None => Value::Null,
        }
    }
}

fn resolve_element(
    element: ElementRef<'_>,
    compiled: &CompiledNode<'_>,
    path: &str,
    faults: &mut Vec<FieldFault>,
) -> Value {
    match compiled.node.kind() {
        NodeKind::Composite { .. } => {
            let mut object = Map::new();
            for child in &compiled.children {
                let name = child.node.field_name();
                let value = resolve(Scope::Element(element), child, &format!("{path}.{name}"), faults);
                object.insert(name.to_string(), value);
            }
            Value::Object(object)
        }
        NodeKind::Leaf {
            attribute,
            value_type,
        } => {
            let raw = raw_value(element, attribute.as_deref());
            let (value, ambiguity) = coerce_checked(&raw, *value_type);
            if let Some(ambiguity) = ambiguity {
                debug!(path, raw = %ambiguity.cleaned, "Value did not match its declared type");
                faults.push(FieldFault {
                    path: path.to_string(),
                    kind: FaultKind::Coercion {
                        value_type: ambiguity.value_type,
                        raw: ambiguity.cleaned,
                    },
                });
            }
            value.to_json()
        }
    }
}

fn raw_value(element: ElementRef<'_>, attribute: Option<&str>) -> String {
    match attribute {
        Some(name) => element.value().attr(name).unwrap_or_default().to_string(),
        None => element.text().collect(),
    }
}
