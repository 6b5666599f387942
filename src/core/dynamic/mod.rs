//! Purpose: Schema-less JSON → self-describing typed value mapping.
//! Exports: `Node`, `NodeKind`, `Number`, `TypeDescriptor`, `DecodeError`, `DecodeErrorKind`,
//! `classify`, `classify_scalar`, `from_value`, and the `diff` submodule.
//! `Node` serializes to a tagged state encoding (see `state`).
//! Role: Core of the crate; everything else fetches documents or presents nodes.
//! Invariants: Conversions are pure functions of their input; nothing is cached or shared.
//! Invariants: A node's variant is its type; descriptors are derived, never stored beside it.
//! Invariants: Object fields keep document order; duplicate keys resolve last-wins at the
//! position of their first occurrence.
mod build;
mod descriptor;
pub mod diff;
mod error;
mod number;
mod state;

use std::str::FromStr;

pub use build::{classify, classify_scalar, from_value};
pub use descriptor::TypeDescriptor;
pub use error::{DecodeError, DecodeErrorKind};
pub use number::Number;

pub use crate::json::parse::ParseFailureCategory;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// Fields in encounter order; keys are unique.
    Object(Vec<(String, Node)>),
    Tuple(Vec<Node>),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NodeKind {
    Null,
    Bool,
    Number,
    String,
    Object,
    Tuple,
}

impl NodeKind {
    pub fn label(self) -> &'static str {
        match self {
            NodeKind::Null => "null",
            NodeKind::Bool => "bool",
            NodeKind::Number => "number",
            NodeKind::String => "string",
            NodeKind::Object => "object",
            NodeKind::Tuple => "tuple",
        }
    }
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Null => NodeKind::Null,
            Node::Bool(_) => NodeKind::Bool,
            Node::Number(_) => NodeKind::Number,
            Node::String(_) => NodeKind::String,
            Node::Object(_) => NodeKind::Object,
            Node::Tuple(_) => NodeKind::Tuple,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Node::Number(number) => Some(number),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn fields(&self) -> Option<&[(String, Node)]> {
        match self {
            Node::Object(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn elements(&self) -> Option<&[Node]> {
        match self {
            Node::Tuple(elements) => Some(elements),
            _ => None,
        }
    }

    /// Field lookup on objects; `None` for other shapes.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.fields()?
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value)
    }

    pub fn get_index(&self, index: usize) -> Option<&Node> {
        self.elements()?.get(index)
    }

    /// Number of fields or elements; zero for scalars.
    pub fn len(&self) -> usize {
        match self {
            Node::Object(fields) => fields.len(),
            Node::Tuple(elements) => elements.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn type_descriptor(&self) -> TypeDescriptor {
        match self {
            Node::Null => TypeDescriptor::Dynamic,
            Node::Bool(_) => TypeDescriptor::Bool,
            Node::Number(_) => TypeDescriptor::Number,
            Node::String(_) => TypeDescriptor::String,
            Node::Object(fields) => TypeDescriptor::Object(
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), value.type_descriptor()))
                    .collect(),
            ),
            Node::Tuple(elements) => {
                TypeDescriptor::Tuple(elements.iter().map(Node::type_descriptor).collect())
            }
        }
    }
}

impl FromStr for Node {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        classify(s.as_bytes())
    }
}

pub(crate) fn is_plain_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub(crate) fn quote_key(key: &str) -> String {
    serde_json::to_string(key).unwrap_or_else(|_| format!("{key:?}"))
}
