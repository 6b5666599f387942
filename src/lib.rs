//! Purpose: Library crate behind the `spancat` CLI: JSON → typed node mapping plus catalog access.
//! Exports: `core` (node mapper, diff, errors), `api` (catalog client), `catalog` (lookups).
//! Role: Embeddable by state/plan tooling; the binary is a thin layer over these modules.
//! Invariants: Mapping is pure and thread-safe; network access only happens through `api`.
//! Invariants: JSON decoding goes through one internal parse boundary (`json::parse`).
pub mod api;
pub mod catalog;
pub mod core;
mod json;

pub use crate::core::dynamic::{
    DecodeError, DecodeErrorKind, Node, NodeKind, Number, TypeDescriptor, classify,
    classify_scalar,
};
