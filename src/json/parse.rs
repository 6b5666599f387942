//! Purpose: Provide the internal JSON decode entrypoint and failure categorization.
//! Exports: `from_slice`, `ParseFailureCategory`, `categorize_error`, `categorize_message`, `hint_for_error`.
//! Role: Parser boundary that centralizes serde_json usage details for the mapper and CLI.
//! Invariants: Decoding is a single pass; callers never re-parse the same bytes speculatively.
//! Invariants: Nesting is bounded by `MAX_NESTING_DEPTH`, checked by a bracket scan before
//! decoding; the decoder itself grows its stack instead of using serde_json's 128-level guard.
//! Invariants: The crate enables `preserve_order` + `arbitrary_precision`, so decoded objects
//! keep document order and numbers keep their literal mantissa.
//! Notes: Error mapping into domain errors is done by callsites so context stays explicit.

use serde::Deserialize;
use serde::de::{DeserializeOwned, Error as _};
use serde_json::error::Category;

/// Deepest container nesting accepted, the same ceiling common JSON decoders use.
pub(crate) const MAX_NESTING_DEPTH: usize = 10_000;

/// Coarse reason a document failed to parse.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ParseFailureCategory {
    Syntax,
    Eof,
    Data,
    Io,
    DepthLimit,
}

impl ParseFailureCategory {
    pub fn label(self) -> &'static str {
        match self {
            ParseFailureCategory::Syntax => "syntax",
            ParseFailureCategory::Eof => "eof",
            ParseFailureCategory::Data => "data",
            ParseFailureCategory::Io => "io",
            ParseFailureCategory::DepthLimit => "depth-limit",
        }
    }
}

pub(crate) fn from_slice<T: DeserializeOwned>(input: &[u8]) -> Result<T, serde_json::Error> {
    if exceeds_depth(input, MAX_NESTING_DEPTH) {
        return Err(serde_json::Error::custom(format!(
            "recursion limit exceeded: nesting deeper than {MAX_NESTING_DEPTH} levels"
        )));
    }
    let mut json = serde_json::Deserializer::from_slice(input);
    json.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut json))?;
    json.end()?;
    Ok(value)
}

/// Bracket depth scan that skips string contents; stops at the first level past `limit`.
fn exceeds_depth(input: &[u8], limit: usize) -> bool {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for &byte in input {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'[' | b'{' => {
                depth += 1;
                if depth > limit {
                    return true;
                }
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    false
}

pub(crate) fn categorize_error(err: &serde_json::Error) -> ParseFailureCategory {
    let message = err.to_string();
    if categorize_message(&message) == ParseFailureCategory::DepthLimit {
        return ParseFailureCategory::DepthLimit;
    }
    match err.classify() {
        Category::Io => ParseFailureCategory::Io,
        Category::Eof => ParseFailureCategory::Eof,
        Category::Data => ParseFailureCategory::Data,
        Category::Syntax => ParseFailureCategory::Syntax,
    }
}

pub(crate) fn categorize_message(message: &str) -> ParseFailureCategory {
    let lowered = message.to_ascii_lowercase();
    if lowered.contains("recursion limit") {
        ParseFailureCategory::DepthLimit
    } else if lowered.contains("eof while parsing") {
        ParseFailureCategory::Eof
    } else if lowered.contains("invalid type") || lowered.contains("missing field") {
        ParseFailureCategory::Data
    } else {
        ParseFailureCategory::Syntax
    }
}

pub(crate) fn hint_for_error(err: &serde_json::Error, context: &str) -> String {
    format!(
        "parse category: {}; context: {context}; at line {} column {}",
        categorize_error(err).label(),
        err.line(),
        err.column()
    )
}

#[cfg(test)]
mod tests {
    use super::{
        MAX_NESTING_DEPTH, ParseFailureCategory, categorize_error, exceeds_depth, from_slice,
    };
    use serde_json::Value;

    fn nested(depth: usize) -> String {
        format!("{}0{}", "[".repeat(depth), "]".repeat(depth))
    }

    #[test]
    fn truncated_object_is_eof() {
        let err = from_slice::<Value>(br#"{"a":"#).expect_err("truncated");
        assert_eq!(categorize_error(&err), ParseFailureCategory::Eof);
    }

    #[test]
    fn stray_token_is_syntax() {
        let err = from_slice::<Value>(br#"{"a":}"#).expect_err("stray brace");
        assert_eq!(categorize_error(&err), ParseFailureCategory::Syntax);
    }

    #[test]
    fn decoded_objects_keep_document_order() {
        let value: Value = from_slice(br#"{"z":1,"a":2,"m":3}"#).expect("valid");
        let keys: Vec<_> = value
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn nesting_past_serde_default_guard_decodes() {
        let value: Value = from_slice(nested(1_000).as_bytes()).expect("deep but allowed");
        assert!(value.is_array());
    }

    #[test]
    fn nesting_past_ceiling_is_depth_limit() {
        let err = from_slice::<Value>(nested(MAX_NESTING_DEPTH + 1).as_bytes())
            .expect_err("too deep");
        assert_eq!(categorize_error(&err), ParseFailureCategory::DepthLimit);
    }

    #[test]
    fn depth_scan_ignores_brackets_inside_strings() {
        assert!(!exceeds_depth(br#"["[[[", "\"[[["]"#, 1));
        assert!(exceeds_depth(b"[[1]]", 1));
        assert!(!exceeds_depth(b"[1][2][3]", 1));
    }
}
