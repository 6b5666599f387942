//! Purpose: Internal JSON parsing boundary shared by the mapper and the CLI.
//! Exports: `parse` module with decode helpers and failure categorization.
//! Role: Single seam for parser configuration so callsites avoid ad hoc decode logic.
//! Invariants: Runtime JSON decoding of untrusted documents goes through this module.
//! Invariants: Helper APIs stay small and deterministic (no hidden global state).

pub(crate) mod parse;
