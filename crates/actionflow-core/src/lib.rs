//! Actionflow Core — model, linter and graph layout for CI workflow files.
//!
//! This crate turns GitHub-Actions-style workflow YAML into a typed
//! `Workflow`, checks it, and lays its job graph out for display. It does no
//! file, network or terminal I/O, which makes it suitable for use in:
//!
//! - the `actionflow` CLI (via `actionflow-cli`)
//! - editor extensions and desktop front ends
//! - wasm or other embedding hosts

pub mod error;
pub mod workflow;

// Convenience re-exports
pub use error::{ParseError, SerializeError};
pub use workflow::{
    layout, lint_workflow, parse_triggers, parse_workflow, serialize_workflow, triggers_to_on,
    FlowGraph, LintError, ParseResult, Workflow,
};
