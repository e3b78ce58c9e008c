//! `actionflow layout` — Print the job graph as JSON.

use actionflow_core::workflow::layout_with;

use crate::settings::Settings;

use super::{load_workflow, require_parsed};

pub fn run(path: &str, settings: &Settings) -> Result<(), String> {
    println!("{}", render(path, settings)?);
    Ok(())
}

pub fn render(path: &str, settings: &Settings) -> Result<String, String> {
    let result = load_workflow(path)?;
    require_parsed(path, &result)?;
    let graph = layout_with(&result.workflow, &settings.layout);
    serde_json::to_string_pretty(&graph).map_err(|e| format!("Failed to encode layout: {}", e))
}
