//! `actionflow lint` — Print lint diagnostics.

use actionflow_core::workflow::{LintError, Linter};

use crate::settings::Settings;

use super::{load_workflow, require_parsed};

pub fn run(path: &str, json: bool, settings: &Settings) -> Result<(), String> {
    let result = load_workflow(path)?;
    require_parsed(path, &result)?;

    let diagnostics = Linter::new(settings.lint.clone()).lint(&result.workflow);
    if json {
        println!("{}", render_json(&diagnostics)?);
    } else {
        print!("{}", render_text(&diagnostics));
    }

    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    if errors > 0 {
        return Err(format!("{} lint error(s)", errors));
    }
    Ok(())
}

/// One diagnostic per line, `severity: path: message`.
pub fn render_text(diagnostics: &[LintError]) -> String {
    if diagnostics.is_empty() {
        return "No problems found\n".to_string();
    }
    diagnostics
        .iter()
        .map(|diagnostic| format!("{}\n", diagnostic))
        .collect()
}

pub fn render_json(diagnostics: &[LintError]) -> Result<String, String> {
    serde_json::to_string_pretty(diagnostics)
        .map_err(|e| format!("Failed to encode diagnostics: {}", e))
}
