//! Purpose: JSON envelopes for node-derived CLI output (state, type descriptors, diffs).
//! Exports: `node_json`, `types_json`, `diff_json`.
//! Role: Keep stdout payload shapes consistent across `decode`, `diff`, and `manifest`.
//! Invariants: Stable key names/order; nodes always use the tagged state encoding.
//! Invariants: `changed` entries carry both sides; `reordered` entries carry neither.

use serde_json::{Map, Value, json};
use spancat::Node;
use spancat::api::{Error, ErrorKind};
use spancat::core::dynamic::diff::{Change, ChangeKind};

pub(crate) fn node_json(node: &Node) -> Result<Value, Error> {
    serde_json::to_value(node).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode node state")
            .with_source(err)
    })
}

pub(crate) fn types_json(node: &Node) -> Value {
    json!({
        "kind": node.kind().label(),
        "type": node.type_descriptor().to_string(),
    })
}

pub(crate) fn diff_json(changes: &[Change]) -> Result<Value, Error> {
    let entries = changes
        .iter()
        .map(change_json)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(json!({
        "equal": changes.is_empty(),
        "count": changes.len(),
        "changes": entries,
    }))
}

fn change_json(change: &Change) -> Result<Value, Error> {
    let mut map = Map::new();
    map.insert("path".to_string(), json!(change.path.to_string()));
    map.insert("change".to_string(), json!(change.kind.label()));
    match &change.kind {
        ChangeKind::Added(node) => {
            map.insert("new".to_string(), node_json(node)?);
        }
        ChangeKind::Removed(node) => {
            map.insert("old".to_string(), node_json(node)?);
        }
        ChangeKind::Changed { old, new } => {
            map.insert("old".to_string(), node_json(old)?);
            map.insert("new".to_string(), node_json(new)?);
        }
        ChangeKind::Reordered => {}
    }
    Ok(Value::Object(map))
}

#[cfg(test)]
mod tests {
    use super::{diff_json, types_json};
    use serde_json::json;
    use spancat::Node;
    use spancat::core::dynamic::diff::diff;

    fn node(input: &str) -> Node {
        input.parse().expect("node")
    }

    #[test]
    fn types_json_renders_descriptor() {
        let value = types_json(&node(r#"{"a":[1,"x"],"b":null}"#));
        assert_eq!(value["kind"], json!("object"));
        assert_eq!(value["type"], json!("object({a: tuple([number, string]), b: dynamic})"));
    }

    #[test]
    fn diff_json_lists_changes() {
        let changes = diff(&node(r#"{"a":1,"b":2}"#), &node(r#"{"b":2,"a":5,"c":true}"#));
        let value = diff_json(&changes).expect("json");
        assert_eq!(value["equal"], json!(false));
        assert_eq!(value["count"], json!(3));
        assert_eq!(value["changes"][0]["path"], json!("$.a"));
        assert_eq!(value["changes"][0]["change"], json!("changed"));
        assert_eq!(value["changes"][0]["new"], json!({"type": "number", "value": "5"}));
        assert_eq!(value["changes"][1]["change"], json!("added"));
        assert_eq!(value["changes"][2]["change"], json!("reordered"));
        assert!(value["changes"][2].get("old").is_none());
    }

    #[test]
    fn identical_documents_are_equal() {
        let doc = node(r#"{"x":[1]}"#);
        let value = diff_json(&diff(&doc, &doc)).expect("json");
        assert_eq!(value, json!({"equal": true, "count": 0, "changes": []}));
    }
}
