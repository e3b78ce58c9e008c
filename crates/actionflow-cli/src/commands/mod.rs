//! CLI command implementations.
//!
//! Each submodule corresponds to a top-level CLI command. Commands return
//! `Err` with a user-facing message when the process should exit non-zero;
//! the printable output is built by plain functions so tests can check it
//! without capturing stdout.

pub mod check;
pub mod fmt;
pub mod layout;
pub mod lint;
pub mod new;
pub mod triggers;

use actionflow_core::workflow::{parse_workflow, ParseResult};

/// Read and parse a workflow file.
///
/// Only I/O failures are returned as `Err`; parse errors stay in the result
/// so each command decides how to report them.
pub fn load_workflow(path: &str) -> Result<ParseResult, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read workflow file '{}': {}", path, e))?;
    let result = parse_workflow(&content);
    tracing::debug!(
        "Loaded {} ({} job(s), {} parse error(s))",
        path,
        result.workflow.jobs.len(),
        result.errors.len()
    );
    Ok(result)
}

/// Print parse errors to stderr and fail if there are any.
fn require_parsed(path: &str, result: &ParseResult) -> Result<(), String> {
    if result.is_ok() {
        return Ok(());
    }
    for message in result.messages() {
        eprintln!("   {}", message);
    }
    Err(format!(
        "'{}' has {} parse error(s)",
        path,
        result.errors.len()
    ))
}
