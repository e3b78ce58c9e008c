//! `actionflow check` — Parse and lint a workflow file.

use actionflow_core::workflow::triggers::parse_triggers;
use actionflow_core::workflow::{LintError, Linter, ParseResult};

use crate::settings::Settings;

use super::{load_workflow, require_parsed};

pub fn run(path: &str, settings: &Settings) -> Result<(), String> {
    let result = load_workflow(path)?;
    require_parsed(path, &result)?;

    let diagnostics = Linter::new(settings.lint.clone()).lint(&result.workflow);
    print!("{}", render(path, &result, &diagnostics));

    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    if errors > 0 {
        return Err(format!("'{}' has {} lint error(s)", path, errors));
    }
    Ok(())
}

/// Summary printed by `check`.
pub fn render(path: &str, result: &ParseResult, diagnostics: &[LintError]) -> String {
    let workflow = &result.workflow;
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    let warnings = diagnostics.len() - errors;

    let mut out = String::new();
    let name = workflow.name.as_deref().unwrap_or(path);
    if errors == 0 {
        out.push_str(&format!("✅ Workflow '{}' is valid\n", name));
    } else {
        out.push_str(&format!("❌ Workflow '{}' has problems\n", name));
    }
    out.push_str(&format!(
        "   Jobs: {}, triggers: {}\n",
        workflow.jobs.len(),
        parse_triggers(&workflow.on).len()
    ));
    out.push_str(&format!("   Errors: {}, warnings: {}\n", errors, warnings));
    for diagnostic in diagnostics {
        out.push_str(&format!("   {}\n", diagnostic));
    }
    out
}
