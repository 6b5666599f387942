//! Purpose: Tagged state encoding of node trees.
//! Exports: `Serialize` for `Node`.
//! Role: Lets records holding nodes be emitted through serde without losing type or order.
//! Invariants: Every node carries an explicit `type`; numbers are emitted as their literal string
//! (mantissa verbatim, exponent as `e` plus sign); object fields are ordered `{key, value}` pairs.
use serde::ser::{Serialize, SerializeStruct, Serializer};

use super::Node;

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let kind = self.kind().label();
        match self {
            Node::Null => {
                let mut state = serializer.serialize_struct("Node", 1)?;
                state.serialize_field("type", kind)?;
                state.end()
            }
            Node::Bool(flag) => {
                let mut state = serializer.serialize_struct("Node", 2)?;
                state.serialize_field("type", kind)?;
                state.serialize_field("value", flag)?;
                state.end()
            }
            Node::Number(number) => {
                let mut state = serializer.serialize_struct("Node", 2)?;
                state.serialize_field("type", kind)?;
                state.serialize_field("value", number.as_str())?;
                state.end()
            }
            Node::String(text) => {
                let mut state = serializer.serialize_struct("Node", 2)?;
                state.serialize_field("type", kind)?;
                state.serialize_field("value", text)?;
                state.end()
            }
            Node::Object(fields) => {
                let mut state = serializer.serialize_struct("Node", 2)?;
                state.serialize_field("type", kind)?;
                state.serialize_field("fields", &Fields(fields))?;
                state.end()
            }
            Node::Tuple(elements) => {
                let mut state = serializer.serialize_struct("Node", 2)?;
                state.serialize_field("type", kind)?;
                state.serialize_field("elements", elements)?;
                state.end()
            }
        }
    }
}

struct Fields<'a>(&'a [(String, Node)]);

#[derive(serde::Serialize)]
struct Field<'a> {
    key: &'a str,
    value: &'a Node,
}

impl Serialize for Fields<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.0.iter().map(|(key, value)| Field { key, value }))
    }
}
