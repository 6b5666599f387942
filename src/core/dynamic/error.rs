//! Purpose: Failure type for the JSON → node mapper.
//! Exports: `DecodeError`, `DecodeErrorKind`.
//! Role: Carries the first failure out of a recursive conversion, annotated with its fragment.
//! Invariants: A `DecodeError` is never returned alongside a partial tree.
//! Invariants: Fragments are truncated to `MAX_FRAGMENT_BYTES` on a char boundary.
use std::error::Error as StdError;
use std::fmt;

use bstr::ByteSlice;

use crate::json::parse::{self, ParseFailureCategory};

const MAX_FRAGMENT_BYTES: usize = 64;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DecodeErrorKind {
    /// The fragment is not syntactically valid JSON.
    MalformedJson,
    /// A scalar decode produced a container.
    UnsupportedScalarKind,
    /// A number literal whose exponent the decimal representation cannot hold.
    NumberOutOfRange,
    /// Valid JSON nested deeper than `MAX_NESTING_DEPTH` containers.
    DepthExceeded,
}

#[derive(Debug)]
pub struct DecodeError {
    kind: DecodeErrorKind,
    fragment: String,
    encountered: Option<&'static str>,
    position: Option<(usize, usize)>,
    category: Option<ParseFailureCategory>,
    source: Option<serde_json::Error>,
}

impl DecodeError {
    /// Wraps a parse failure; the depth ceiling gets its own kind since the input may be valid.
    pub(crate) fn malformed(fragment: &[u8], err: serde_json::Error) -> Self {
        let position = (err.line() > 0).then(|| (err.line(), err.column()));
        let category = parse::categorize_error(&err);
        let kind = match category {
            ParseFailureCategory::DepthLimit => DecodeErrorKind::DepthExceeded,
            _ => DecodeErrorKind::MalformedJson,
        };
        Self {
            kind,
            fragment: snippet(fragment),
            encountered: None,
            position,
            category: Some(category),
            source: Some(err),
        }
    }

    pub(crate) fn unsupported_scalar(fragment: &[u8], encountered: &'static str) -> Self {
        Self {
            kind: DecodeErrorKind::UnsupportedScalarKind,
            fragment: snippet(fragment),
            encountered: Some(encountered),
            position: None,
            category: None,
            source: None,
        }
    }

    pub(crate) fn number_out_of_range(literal: &str) -> Self {
        Self {
            kind: DecodeErrorKind::NumberOutOfRange,
            fragment: snippet(literal.as_bytes()),
            encountered: Some("number"),
            position: None,
            category: None,
            source: None,
        }
    }

    pub fn kind(&self) -> DecodeErrorKind {
        self.kind
    }

    /// The (possibly truncated) text that triggered the failure.
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Kind name of the decoded value that was rejected, if any.
    pub fn encountered(&self) -> Option<&'static str> {
        self.encountered
    }

    pub fn line(&self) -> Option<usize> {
        self.position.map(|(line, _)| line)
    }

    pub fn column(&self) -> Option<usize> {
        self.position.map(|(_, column)| column)
    }

    pub fn category(&self) -> Option<ParseFailureCategory> {
        self.category
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DecodeErrorKind::MalformedJson => {
                f.write_str("malformed JSON")?;
                if let Some(category) = self.category {
                    write!(f, " ({})", category.label())?;
                }
                if let Some((line, column)) = self.position {
                    write!(f, " at line {line} column {column}")?;
                }
            }
            DecodeErrorKind::UnsupportedScalarKind => {
                write!(
                    f,
                    "unsupported scalar kind `{}`",
                    self.encountered.unwrap_or("unknown")
                )?;
            }
            DecodeErrorKind::NumberOutOfRange => f.write_str("number literal out of range")?,
            DecodeErrorKind::DepthExceeded => write!(
                f,
                "nesting deeper than {} levels",
                parse::MAX_NESTING_DEPTH
            )?,
        }
        write!(f, ": [{}]", self.fragment)
    }
}

impl StdError for DecodeError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source as &(dyn StdError + 'static))
    }
}

fn snippet(fragment: &[u8]) -> String {
    let text = fragment.trim().to_str_lossy();
    if text.len() <= MAX_FRAGMENT_BYTES {
        return text.into_owned();
    }
    let suffix = "...";
    let mut end = MAX_FRAGMENT_BYTES - suffix.len();
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = String::with_capacity(MAX_FRAGMENT_BYTES);
    out.push_str(&text[..end]);
    out.push_str(suffix);
    out
}
