//! Purpose: Classify decoded JSON and assemble node trees.
//! Exports: `classify`, `classify_scalar`, `from_value`.
//! Role: Node classifier plus the container and scalar builders.
//! Invariants: The input is decoded exactly once; shape comes from the decoded token stream.
//! Invariants: The first failure aborts the whole conversion (fail-fast, no partial trees).
//! Invariants: No depth limit here; the parse boundary's nesting ceiling bounds untrusted input.
//! Invariants: Recursion grows the stack on demand, so ceiling-deep trees build on small threads.
use serde_json::{Map, Value};

use super::{DecodeError, Node, Number};
use crate::json::parse;

const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROWTH: usize = 1024 * 1024;

/// Converts one JSON document into a node tree.
pub fn classify(fragment: &[u8]) -> Result<Node, DecodeError> {
    if trim_json_whitespace(fragment) == b"null" {
        return Ok(Node::Null);
    }
    let value: Value =
        parse::from_slice(fragment).map_err(|err| DecodeError::malformed(fragment, err))?;
    build_node(&value)
}

/// Converts a fragment that must hold a single scalar (bool, number, string, null).
pub fn classify_scalar(fragment: &[u8]) -> Result<Node, DecodeError> {
    let value: Value =
        parse::from_slice(fragment).map_err(|err| DecodeError::malformed(fragment, err))?;
    match &value {
        Value::Array(_) => Err(DecodeError::unsupported_scalar(fragment, "array")),
        Value::Object(_) => Err(DecodeError::unsupported_scalar(fragment, "object")),
        scalar => build_scalar(scalar),
    }
}

/// Converts an already decoded value, e.g. a field pulled out of a response envelope.
pub fn from_value(value: &Value) -> Result<Node, DecodeError> {
    build_node(value)
}

/// Strips the four whitespace bytes JSON allows between tokens, nothing else.
fn trim_json_whitespace(fragment: &[u8]) -> &[u8] {
    let is_space = |byte: &u8| matches!(byte, b' ' | b'\t' | b'\n' | b'\r');
    let start = fragment
        .iter()
        .position(|byte| !is_space(byte))
        .unwrap_or(fragment.len());
    let end = fragment
        .iter()
        .rposition(|byte| !is_space(byte))
        .map_or(start, |last| last + 1);
    &fragment[start..end]
}

fn build_node(value: &Value) -> Result<Node, DecodeError> {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || match value {
        Value::Object(map) => build_object(map),
        Value::Array(items) => build_tuple(items),
        scalar => build_scalar(scalar),
    })
}

fn build_object(map: &Map<String, Value>) -> Result<Node, DecodeError> {
    let mut fields = Vec::with_capacity(map.len());
    for (key, value) in map {
        fields.push((key.clone(), build_node(value)?));
    }
    Ok(Node::Object(fields))
}

fn build_tuple(items: &[Value]) -> Result<Node, DecodeError> {
    let elements = items.iter().map(build_node).collect::<Result<Vec<_>, _>>()?;
    Ok(Node::Tuple(elements))
}

fn build_scalar(value: &Value) -> Result<Node, DecodeError> {
    match value {
        Value::Null => Ok(Node::Null),
        Value::Bool(flag) => Ok(Node::Bool(*flag)),
        Value::String(text) => Ok(Node::String(text.clone())),
        Value::Number(number) => {
            // With `arbitrary_precision` the display form is the source literal,
            // exponent respelled as `e` plus an explicit sign.
            let literal = number.to_string();
            Number::from_literal(&literal)
                .map(Node::Number)
                .ok_or_else(|| DecodeError::number_out_of_range(&literal))
        }
        Value::Array(_) => Err(DecodeError::unsupported_scalar(b"[...]", "array")),
        Value::Object(_) => Err(DecodeError::unsupported_scalar(b"{...}", "object")),
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, classify_scalar, from_value};
    use crate::core::dynamic::{DecodeErrorKind, Node, Number};
    use crate::json::parse::{MAX_NESTING_DEPTH, ParseFailureCategory};
    use serde_json::json;

    fn num(value: u64) -> Node {
        Node::Number(Number::from(value))
    }

    fn string(value: &str) -> Node {
        Node::String(value.to_string())
    }

    #[test]
    fn scalars_map_to_leaves() {
        assert_eq!(classify(b"null").expect("null"), Node::Null);
        assert_eq!(classify(b"  null \n").expect("padded null"), Node::Null);
        assert_eq!(classify(b"true").expect("true"), Node::Bool(true));
        assert_eq!(classify(b"false").expect("false"), Node::Bool(false));
        assert_eq!(classify(b"42").expect("number"), num(42));
        assert_eq!(classify(br#""hi""#).expect("string"), string("hi"));
    }

    #[test]
    fn empty_containers_keep_their_shape() {
        assert_eq!(classify(b"{}").expect("object"), Node::Object(Vec::new()));
        assert_eq!(classify(b"[]").expect("tuple"), Node::Tuple(Vec::new()));
    }

    #[test]
    fn object_fields_keep_encounter_order() {
        let node = classify(br#"{"b":"x","a":1}"#).expect("object");
        assert_eq!(
            node,
            Node::Object(vec![
                ("b".to_string(), string("x")),
                ("a".to_string(), num(1)),
            ])
        );
    }

    #[test]
    fn nested_containers_recurse() {
        let node = classify(br#"{"nested":{"flag":true},"list":[1,"two",null,[]]}"#)
            .expect("nested");
        assert_eq!(
            node,
            Node::Object(vec![
                (
                    "nested".to_string(),
                    Node::Object(vec![("flag".to_string(), Node::Bool(true))])
                ),
                (
                    "list".to_string(),
                    Node::Tuple(vec![num(1), string("two"), Node::Null, Node::Tuple(Vec::new())])
                ),
            ])
        );
    }

    #[test]
    fn duplicate_keys_take_last_value_at_first_position() {
        let node = classify(br#"{"a":1,"b":2,"a":3}"#).expect("object");
        assert_eq!(
            node,
            Node::Object(vec![("a".to_string(), num(3)), ("b".to_string(), num(2))])
        );
    }

    #[test]
    fn malformed_input_fails_without_tree() {
        let err = classify(br#"{"a":"#).expect_err("truncated");
        assert_eq!(err.kind(), DecodeErrorKind::MalformedJson);
        assert_eq!(err.category(), Some(ParseFailureCategory::Eof));
        assert_eq!(err.fragment(), r#"{"a":"#);
        assert_eq!(err.line(), Some(1));

        let err = classify(b"[1, 2,]").expect_err("trailing comma");
        assert_eq!(err.kind(), DecodeErrorKind::MalformedJson);
        assert_eq!(err.category(), Some(ParseFailureCategory::Syntax));

        let err = classify(b"").expect_err("empty");
        assert_eq!(err.kind(), DecodeErrorKind::MalformedJson);
    }

    #[test]
    fn trailing_garbage_is_malformed() {
        let err = classify(b"{} {}").expect_err("two documents");
        assert_eq!(err.kind(), DecodeErrorKind::MalformedJson);
    }

    fn nested(depth: usize) -> String {
        format!("{}0{}", "[".repeat(depth), "]".repeat(depth))
    }

    #[test]
    fn deep_valid_nesting_builds() {
        let node = classify(nested(2_000).as_bytes()).expect("deep tuple");
        let mut level = &node;
        let mut depth = 0;
        while let Some([inner]) = level.elements() {
            level = inner;
            depth += 1;
        }
        assert_eq!(depth, 2_000);
        assert_eq!(level, &num(0));
    }

    #[test]
    fn nesting_beyond_ceiling_is_depth_exceeded() {
        let err = classify(nested(MAX_NESTING_DEPTH + 1).as_bytes()).expect_err("too deep");
        assert_eq!(err.kind(), DecodeErrorKind::DepthExceeded);
        assert_eq!(err.category(), Some(ParseFailureCategory::DepthLimit));
    }

    #[test]
    fn only_json_whitespace_is_trimmed() {
        assert_eq!(classify(b"\t\r\n null \n").expect("padded null"), Node::Null);
        let err = classify(b"\x0cnull").expect_err("form feed is not JSON whitespace");
        assert_eq!(err.kind(), DecodeErrorKind::MalformedJson);
        assert!(classify(b"\x0bnull").is_err());
    }

    #[test]
    fn exponent_literals_use_canonical_spelling() {
        let node = classify(br#"[1E5, 2.50E+2, 1e-5, 12.50]"#).expect("numbers");
        let literals: Vec<&str> = node
            .elements()
            .expect("tuple")
            .iter()
            .filter_map(Node::as_number)
            .map(|number| number.as_str())
            .collect();
        assert_eq!(literals, ["1e+5", "2.50e+2", "1e-5", "12.50"]);
    }

    #[test]
    fn tiny_exponent_is_not_an_integer() {
        let node = classify(b"1e-300000000").expect("number");
        let number = node.as_number().expect("number");
        assert!(!number.is_integer());
        assert_eq!(number.as_u64(), None);
    }

    #[test]
    fn large_integers_keep_every_digit() {
        let literal = "123456789012345678901234567890";
        let node = classify(literal.as_bytes()).expect("big integer");
        let Node::Number(number) = node else {
            panic!("expected number node");
        };
        assert_eq!(number.as_str(), literal);
        assert!(number.is_integer());
        assert_eq!(number.as_u64(), None);

        let doc = r#"{"id":9007199254740993,"ratio":0.1000000000000000055511151231257827}"#;
        let node = classify(doc.as_bytes()).expect("object");
        let id = node.get("id").and_then(Node::as_number).expect("id");
        assert_eq!(id.as_u64(), Some(9_007_199_254_740_993));
        let ratio = node.get("ratio").and_then(Node::as_number).expect("ratio");
        assert_eq!(ratio.as_str(), "0.1000000000000000055511151231257827");
    }

    #[test]
    fn huge_exponent_is_out_of_range() {
        let doc = format!("[1, 1e{}]", "9".repeat(48));
        let err = classify(doc.as_bytes()).expect_err("exponent");
        assert_eq!(err.kind(), DecodeErrorKind::NumberOutOfRange);
        assert!(err.fragment().starts_with("1e+999"));
    }

    #[test]
    fn conversion_is_deterministic() {
        let doc = br#"{"z":[{"y":1.25},false],"a":"s","m":null}"#;
        assert_eq!(classify(doc).expect("first"), classify(doc).expect("second"));
    }

    #[test]
    fn scalar_classifier_rejects_containers() {
        assert_eq!(classify_scalar(b"1.5").expect("number").kind().label(), "number");
        assert_eq!(classify_scalar(b"null").expect("null"), Node::Null);

        let err = classify_scalar(b"[1]").expect_err("array");
        assert_eq!(err.kind(), DecodeErrorKind::UnsupportedScalarKind);
        assert_eq!(err.encountered(), Some("array"));

        let err = classify_scalar(br#"{"k":1}"#).expect_err("object");
        assert_eq!(err.encountered(), Some("object"));
    }

    #[test]
    fn decoded_values_convert_directly() {
        let value = json!({"github": {"org": "acme", "seats": 12}, "tags": ["a"]});
        let node = from_value(&value).expect("node");
        assert_eq!(
            node.get("github").and_then(|g| g.get("org")).and_then(Node::as_str),
            Some("acme")
        );
        assert_eq!(node.get("tags").map(Node::len), Some(1));
    }
}
