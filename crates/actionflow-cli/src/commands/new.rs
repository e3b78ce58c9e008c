//! `actionflow new` — Print a new workflow.

use actionflow_core::workflow::edit::{new_workflow, sample_workflow};
use actionflow_core::workflow::{serialize_workflow, suggested_file_name};

pub fn run(sample: bool) -> Result<(), String> {
    print!("{}", render(sample)?);
    Ok(())
}

pub fn render(sample: bool) -> Result<String, String> {
    let workflow = if sample {
        sample_workflow()
    } else {
        new_workflow()
    };
    tracing::info!("Suggested file name: {}", suggested_file_name(&workflow));
    serialize_workflow(&workflow).map_err(|e| e.to_string())
}
