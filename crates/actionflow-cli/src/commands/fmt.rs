//! `actionflow fmt` — Rewrite a workflow in canonical form.

use actionflow_core::workflow::serialize_workflow;

use super::{load_workflow, require_parsed};

/// Print the canonical YAML, or write it back with `write`.
///
/// Files with parse errors are left alone: the parsed model would be
/// missing whatever failed to parse.
pub fn run(path: &str, write: bool) -> Result<(), String> {
    let yaml = format_file(path)?;
    if write {
        std::fs::write(path, &yaml)
            .map_err(|e| format!("Failed to write '{}': {}", path, e))?;
        tracing::info!("Formatted {}", path);
    } else {
        print!("{}", yaml);
    }
    Ok(())
}

pub fn format_file(path: &str) -> Result<String, String> {
    let result = load_workflow(path)?;
    require_parsed(path, &result)?;
    serialize_workflow(&result.workflow).map_err(|e| e.to_string())
}
