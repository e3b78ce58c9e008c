//! Workflow model — CI workflow YAML in, lint diagnostics and a flow graph out.
//!
//! # Architecture
//!
//! ```text
//! workflow.yml ──► parser ──► Workflow ──► serializer ──► workflow.yml
//!                               │  ▲
//!                               │  └── edit (pure add/remove/update helpers)
//!                               │
//!                 ┌─────────────┼──────────────┐
//!                 ▼             ▼              ▼
//!              triggers      linter         layout
//!          [ParsedTrigger] [LintError]  FlowGraph {nodes, edges}
//! ```
//!
//! Every function here is pure and synchronous: no I/O, no shared state.

pub mod edit;
pub mod layout;
pub mod linter;
pub mod matrix;
pub mod parser;
pub mod schema;
pub mod serializer;
pub mod triggers;

pub use edit::{add_job, new_workflow, remove_job, sample_workflow};
pub use layout::{layout, layout_with, FlowEdge, FlowGraph, FlowNode, LayoutOptions, NodeData};
pub use linter::{lint_workflow, LintError, LintOptions, Linter, Severity};
pub use parser::{parse_workflow, ParseResult};
pub use schema::{Job, Needs, On, OnEntry, RunsOn, Step, Strategy, Workflow};
pub use serializer::{serialize_workflow, suggested_file_name, validate_workflow};
pub use triggers::{parse_triggers, triggers_to_on, ParsedTrigger, TriggerConfig};
