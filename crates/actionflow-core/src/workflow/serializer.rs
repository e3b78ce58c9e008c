//! `Workflow` to YAML text.
//!
//! Field order and omission rules live on the model's `Serialize` derives
//! (see `schema`); this module renders them as block-style YAML and provides
//! the helpers a host needs around saving.

use crate::error::SerializeError;

use super::parser::parse_workflow;
use super::schema::Workflow;

/// Render a workflow as canonical YAML.
///
/// For any workflow produced by `parse_workflow`, parsing the output again
/// yields an equal workflow with no errors.
pub fn serialize_workflow(workflow: &Workflow) -> Result<String, SerializeError> {
    let yaml = serde_yaml::to_string(workflow)?;
    tracing::trace!("[Serializer] Rendered {} byte(s)", yaml.len());
    Ok(yaml)
}

/// Check that a workflow survives a serialize/parse round trip and return
/// the resulting error messages (empty when it does).
pub fn validate_workflow(workflow: &Workflow) -> Vec<String> {
    match serialize_workflow(workflow) {
        Ok(yaml) => parse_workflow(&yaml).messages(),
        Err(e) => vec![e.to_string()],
    }
}

/// File name to save a workflow under: the lowercased name with whitespace
/// runs replaced by `-`, or `workflow` when unnamed.
pub fn suggested_file_name(workflow: &Workflow) -> String {
    let stem = workflow
        .name
        .as_deref()
        .map(|name| {
            name.split_whitespace()
                .collect::<Vec<_>>()
                .join("-")
                .to_lowercase()
        })
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "workflow".to_string());
    format!("{}.yml", stem)
}
