//! Purpose: Structural comparison of two node trees for change reporting.
//! Exports: `diff`, `Change`, `ChangeKind`, `NodePath`, `Segment`.
//! Role: Lets state consumers explain what moved between two manifest snapshots.
//! Invariants: Objects match fields by key; tuples match elements by index.
//! Invariants: Field order is part of a value, so a pure reordering is reported once per object.
//! Invariants: Output order is deterministic (old-side order first, then additions, then reorders).
use std::fmt;

use super::Node;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodePath(Vec<Segment>);

impl NodePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.0 {
            match segment {
                Segment::Key(key) if super::is_plain_key(key) => write!(f, ".{key}")?,
                Segment::Key(key) => write!(f, "[{}]", super::quote_key(key))?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Added(Node),
    Removed(Node),
    Changed { old: Node, new: Node },
    Reordered,
}

impl ChangeKind {
    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::Added(_) => "added",
            ChangeKind::Removed(_) => "removed",
            ChangeKind::Changed { .. } => "changed",
            ChangeKind::Reordered => "reordered",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Change {
    pub path: NodePath,
    pub kind: ChangeKind,
}

pub fn diff(old: &Node, new: &Node) -> Vec<Change> {
    let mut changes = Vec::new();
    let mut path = Vec::new();
    walk(old, new, &mut path, &mut changes);
    changes
}

fn walk(old: &Node, new: &Node, path: &mut Vec<Segment>, out: &mut Vec<Change>) {
    match (old, new) {
        (Node::Object(old_fields), Node::Object(new_fields)) => {
            walk_object(old_fields, new_fields, path, out)
        }
        (Node::Tuple(old_items), Node::Tuple(new_items)) => {
            let len = old_items.len().max(new_items.len());
            for index in 0..len {
                path.push(Segment::Index(index));
                match (old_items.get(index), new_items.get(index)) {
                    (Some(o), Some(n)) => walk(o, n, path, out),
                    (Some(o), None) => record(path, ChangeKind::Removed(o.clone()), out),
                    (None, Some(n)) => record(path, ChangeKind::Added(n.clone()), out),
                    (None, None) => {}
                }
                path.pop();
            }
        }
        (o, n) if o == n => {}
        (o, n) => record(
            path,
            ChangeKind::Changed {
                old: o.clone(),
                new: n.clone(),
            },
            out,
        ),
    }
}

fn walk_object(
    old_fields: &[(String, Node)],
    new_fields: &[(String, Node)],
    path: &mut Vec<Segment>,
    out: &mut Vec<Change>,
) {
    for (key, old_value) in old_fields {
        path.push(Segment::Key(key.clone()));
        match lookup(new_fields, key) {
            Some(new_value) => walk(old_value, new_value, path, out),
            None => record(path, ChangeKind::Removed(old_value.clone()), out),
        }
        path.pop();
    }
    for (key, new_value) in new_fields {
        if lookup(old_fields, key).is_none() {
            path.push(Segment::Key(key.clone()));
            record(path, ChangeKind::Added(new_value.clone()), out);
            path.pop();
        }
    }

    let shared_old = old_fields
        .iter()
        .map(|(key, _)| key.as_str())
        .filter(|key| lookup(new_fields, key).is_some());
    let shared_new = new_fields
        .iter()
        .map(|(key, _)| key.as_str())
        .filter(|key| lookup(old_fields, key).is_some());
    if !shared_old.eq(shared_new) {
        record(path, ChangeKind::Reordered, out);
    }
}

fn lookup<'a>(fields: &'a [(String, Node)], key: &str) -> Option<&'a Node> {
    fields
        .iter()
        .find(|(candidate, _)| candidate == key)
        .map(|(_, value)| value)
}

fn record(path: &[Segment], kind: ChangeKind, out: &mut Vec<Change>) {
    out.push(Change {
        path: NodePath(path.to_vec()),
        kind,
    });
}

#[cfg(test)]
mod tests {
    use super::{ChangeKind, NodePath, Segment, diff};
    use crate::core::dynamic::{self, Node, Number};

    fn node(input: &str) -> Node {
        dynamic::classify(input.as_bytes()).expect("valid json")
    }

    fn rendered(old: &str, new: &str) -> Vec<String> {
        diff(&node(old), &node(new))
            .into_iter()
            .map(|change| format!("{} {}", change.kind.label(), change.path))
            .collect()
    }

    #[test]
    fn identical_trees_have_no_changes() {
        let doc = r#"{"a":[1,{"b":null}],"c":"x"}"#;
        assert!(diff(&node(doc), &node(doc)).is_empty());
    }

    #[test]
    fn numbers_compare_numerically() {
        assert!(diff(&node(r#"{"n":1.0}"#), &node(r#"{"n":1.00}"#)).is_empty());
    }

    #[test]
    fn reports_changes_removals_and_additions_in_order() {
        assert_eq!(
            rendered(
                r#"{"keep":1,"edit":"a","drop":true}"#,
                r#"{"keep":1,"edit":"b","new":[]}"#
            ),
            ["changed $.edit", "removed $.drop", "added $.new"]
        );
    }

    #[test]
    fn tuple_elements_match_by_index() {
        let changes = diff(&node("[1,2,3]"), &node("[1,5]"));
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].path.segments(), [Segment::Index(1)]);
        assert_eq!(
            changes[0].kind,
            ChangeKind::Changed {
                old: Node::Number(Number::from(2u64)),
                new: Node::Number(Number::from(5u64)),
            }
        );
        assert_eq!(changes[1].kind, ChangeKind::Removed(Node::Number(Number::from(3u64))));
    }

    #[test]
    fn reordering_is_reported_at_object_path() {
        assert_eq!(
            rendered(r#"{"v":{"a":1,"b":2}}"#, r#"{"v":{"b":2,"a":1}}"#),
            ["reordered $.v"]
        );
    }

    #[test]
    fn shape_change_is_a_single_change() {
        assert_eq!(rendered(r#"{"x":[1]}"#, r#"{"x":{"0":1}}"#), ["changed $.x"]);
    }

    #[test]
    fn paths_quote_unusual_keys() {
        assert_eq!(
            rendered(r#"{"a b":[{"c":1}]}"#, r#"{"a b":[{"c":2}]}"#),
            [r#"changed $["a b"][0].c"#]
        );
        assert_eq!(NodePath::root().to_string(), "$");
    }
}
