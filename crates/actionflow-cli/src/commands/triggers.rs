//! `actionflow triggers` — List normalized triggers.

use actionflow_core::workflow::triggers::{format_trigger, parse_triggers};
use actionflow_core::workflow::Workflow;

use super::{load_workflow, require_parsed};

pub fn run(path: &str) -> Result<(), String> {
    let result = load_workflow(path)?;
    require_parsed(path, &result)?;
    print!("{}", render(&result.workflow));
    Ok(())
}

pub fn render(workflow: &Workflow) -> String {
    let triggers = parse_triggers(&workflow.on);
    if triggers.is_empty() {
        return "No triggers configured\n".to_string();
    }
    triggers
        .iter()
        .enumerate()
        .map(|(i, trigger)| format!("{}. {}\n", i + 1, format_trigger(trigger)))
        .collect()
}
