//! Purpose: Render node trees as indented, optionally colorized text for terminals.
//! Exports: `render_tree`, `render_labeled`.
//! Role: Small, pure formatter behind `decode --pretty` and `manifest --pretty`.
//! Invariants: One line per node; children are indented one level below their parent.
//! Invariants: ANSI escapes appear only when explicitly enabled.
use spancat::Node;

const INDENT: &str = "  ";

// Conservative 8/16-color palette; no bright variants.
const COLOR_KEY: &str = "36";
const COLOR_STRING: &str = "32";
const COLOR_NUMBER: &str = "33";
const COLOR_BOOL: &str = "35";
const COLOR_TYPE: &str = "34";
const COLOR_PUNCT: &str = "39";

pub fn render_tree(node: &Node, use_color: bool) -> String {
    let mut out = String::new();
    write_head(node, use_color, &mut out);
    write_children(node, 1, use_color, &mut out);
    out
}

/// Renders `label: <tree>` with the tree's children indented under the label.
pub fn render_labeled(label: &str, node: &Node, use_color: bool) -> String {
    let mut out = String::new();
    push_colored(label, COLOR_KEY, use_color, &mut out);
    push_colored(":", COLOR_PUNCT, use_color, &mut out);
    out.push(' ');
    write_head(node, use_color, &mut out);
    write_children(node, 1, use_color, &mut out);
    out
}

fn write_head(node: &Node, use_color: bool, out: &mut String) {
    push_colored(node.kind().label(), COLOR_TYPE, use_color, out);
    match node {
        Node::Null => {}
        Node::Bool(flag) => {
            out.push(' ');
            push_colored(if *flag { "true" } else { "false" }, COLOR_BOOL, use_color, out);
        }
        Node::Number(number) => {
            out.push(' ');
            push_colored(number.as_str(), COLOR_NUMBER, use_color, out);
        }
        Node::String(text) => {
            out.push(' ');
            let encoded = serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string());
            push_colored(&encoded, COLOR_STRING, use_color, out);
        }
        Node::Object(fields) if fields.is_empty() => {
            out.push(' ');
            push_colored("{}", COLOR_PUNCT, use_color, out);
        }
        Node::Tuple(elements) if elements.is_empty() => {
            out.push(' ');
            push_colored("[]", COLOR_PUNCT, use_color, out);
        }
        Node::Object(_) | Node::Tuple(_) => {}
    }
}

fn write_children(node: &Node, indent: usize, use_color: bool, out: &mut String) {
    match node {
        Node::Object(fields) => {
            for (key, value) in fields {
                out.push('\n');
                push_indent(indent, out);
                push_colored(&display_key(key), COLOR_KEY, use_color, out);
                push_colored(":", COLOR_PUNCT, use_color, out);
                out.push(' ');
                write_head(value, use_color, out);
                write_children(value, indent + 1, use_color, out);
            }
        }
        Node::Tuple(elements) => {
            for (index, value) in elements.iter().enumerate() {
                out.push('\n');
                push_indent(indent, out);
                push_colored(&format!("[{index}]"), COLOR_PUNCT, use_color, out);
                out.push(' ');
                write_head(value, use_color, out);
                write_children(value, indent + 1, use_color, out);
            }
        }
        _ => {}
    }
}

fn display_key(key: &str) -> String {
    let plain = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');
    if plain {
        key.to_string()
    } else {
        serde_json::to_string(key).unwrap_or_else(|_| format!("{key:?}"))
    }
}

fn push_indent(level: usize, out: &mut String) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
}

fn push_colored(text: &str, color: &str, use_color: bool, out: &mut String) {
    if !use_color {
        out.push_str(text);
        return;
    }
    out.push_str("\u{1b}[");
    out.push_str(color);
    out.push('m');
    out.push_str(text);
    out.push_str("\u{1b}[0m");
}
