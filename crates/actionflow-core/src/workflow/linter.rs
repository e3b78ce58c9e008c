//! Semantic checks over a parsed `Workflow`.
//!
//! Diagnostics come out in a fixed order so the output is stable:
//!
//! 1. triggers, in `on` order
//! 2. the job-count check
//! 3. dependency cycles
//! 4. each job in map order (runner, needs, matrix, then its steps)
//!
//! Every check runs independently; one failure never hides another.

use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use super::schema::{Job, Workflow};
use super::triggers::{
    activity_types, is_known_event, parse_triggers, ActivityTypes, ParsedTrigger, KNOWN_EVENTS,
};

/// Runner labels recognized without a warning.
pub const KNOWN_RUNNERS: &[&str] = &[
    "ubuntu-latest",
    "ubuntu-24.04",
    "ubuntu-22.04",
    "ubuntu-20.04",
    "ubuntu-24.04-arm",
    "ubuntu-22.04-arm",
    "windows-latest",
    "windows-2025",
    "windows-2022",
    "windows-2019",
    "macos-latest",
    "macos-15",
    "macos-14",
    "macos-13",
    "macos-12",
    "self-hosted",
];

/// How many allowed values to quote in a message before eliding the rest.
const MAX_LISTED: usize = 10;

/// Severity of a lint diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The workflow cannot run as written
    Error,
    /// Likely a mistake, or a value this linter does not recognize
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// One lint diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintError {
    pub message: String,
    /// Location such as `jobs.build.steps[0]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub severity: Severity,
}

impl LintError {
    fn error(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Some(path.into()),
            severity: Severity::Error,
        }
    }

    fn warning(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Some(path.into()),
            severity: Severity::Warning,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for LintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}: {}", self.severity, path, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

/// Linter settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LintOptions {
    /// Runner labels to accept in addition to `KNOWN_RUNNERS`
    pub extra_runner_labels: Vec<String>,
}

/// Runs every check against a workflow.
#[derive(Debug, Clone, Default)]
pub struct Linter {
    options: LintOptions,
}

impl Linter {
    pub fn new(options: LintOptions) -> Self {
        Self { options }
    }

    pub fn lint(&self, workflow: &Workflow) -> Vec<LintError> {
        let mut errors = Vec::new();

        let triggers = parse_triggers(&workflow.on);
        if triggers.is_empty() {
            errors.push(LintError::error(
                "Workflow must have at least one trigger in \"on\" field",
                "on",
            ));
        } else {
            for (index, trigger) in triggers.iter().enumerate() {
                validate_trigger(trigger, index, &mut errors);
            }
        }

        if workflow.jobs.is_empty() {
            errors.push(LintError::error("Workflow must have at least one job", "jobs"));
        } else {
            check_cycles(&workflow.jobs, &mut errors);
            for (job_id, job) in &workflow.jobs {
                self.validate_job(job_id, job, &workflow.jobs, &mut errors);
            }
        }

        tracing::debug!(
            "[Linter] {} diagnostic(s), {} error(s)",
            errors.len(),
            errors.iter().filter(|e| e.is_error()).count()
        );
        errors
    }

    fn is_known_runner(&self, label: &str) -> bool {
        KNOWN_RUNNERS.contains(&label)
            || self
                .options
                .extra_runner_labels
                .iter()
                .any(|l| l == label)
    }

    fn validate_job(
        &self,
        job_id: &str,
        job: &Job,
        jobs: &IndexMap<String, Job>,
        errors: &mut Vec<LintError>,
    ) {
        let path = format!("jobs.{}", job_id);

        if job.runs_on.is_empty() {
            errors.push(LintError::error(
                format!("Job \"{}\" is missing required field \"runs-on\"", job_id),
                format!("{}.runs-on", path),
            ));
        } else {
            for label in job.runs_on.labels() {
                let tolerated = label.starts_with("self-hosted")
                    || self.is_known_runner(label)
                    || label.contains('[')
                    || label.contains("${{");
                if !tolerated {
                    errors.push(LintError::warning(
                        format!(
                            "Unknown runner label: \"{}\". Common runners: {}",
                            label,
                            KNOWN_RUNNERS.join(", ")
                        ),
                        format!("{}.runs-on", path),
                    ));
                }
            }
        }

        for need in job.needs_list() {
            if !jobs.contains_key(need) {
                errors.push(LintError::error(
                    format!("Job \"{}\" depends on job \"{}\" which does not exist", job_id, need),
                    format!("{}.needs", path),
                ));
            }
        }

        if let Some(strategy) = &job.strategy {
            if let Some(matrix) = &strategy.matrix {
                if matrix.is_empty() {
                    errors.push(LintError::warning(
                        format!(
                            "Job \"{}\" has an empty matrix. Remove strategy or add matrix variables.",
                            job_id
                        ),
                        format!("{}.strategy.matrix", path),
                    ));
                }
                for (key, values) in matrix {
                    let non_empty_list = values.as_sequence().is_some_and(|v| !v.is_empty());
                    if !non_empty_list {
                        errors.push(LintError::error(
                            format!(
                                "Matrix variable \"{}\" in job \"{}\" must be a non-empty list",
                                key, job_id
                            ),
                            format!("{}.strategy.matrix.{}", path, key),
                        ));
                    }
                }
            }
            if strategy.max_parallel.is_some_and(|n| n < 1) {
                errors.push(LintError::error(
                    format!("max-parallel in job \"{}\" must be at least 1", job_id),
                    format!("{}.strategy.max-parallel", path),
                ));
            }
        }

        if job.steps.is_empty() {
            errors.push(LintError::warning(
                format!("Job \"{}\" has no steps", job_id),
                format!("{}.steps", path),
            ));
            return;
        }

        for (index, step) in job.steps.iter().enumerate() {
            let step_path = format!("{}.steps[{}]", path, index);
            let has_run = step.run.as_deref().is_some_and(|r| !r.is_empty());
            let has_uses = step.uses.as_deref().is_some_and(|u| !u.is_empty());

            if !has_run && !has_uses {
                errors.push(LintError::error(
                    format!(
                        "Step {} in job \"{}\" must have either \"run\" or \"uses\"",
                        index + 1,
                        job_id
                    ),
                    step_path.clone(),
                ));
            }
            if has_run && has_uses {
                errors.push(LintError::error(
                    format!(
                        "Step {} in job \"{}\" cannot have both \"run\" and \"uses\"",
                        index + 1,
                        job_id
                    ),
                    step_path.clone(),
                ));
            }
            if let Some(uses) = step.uses.as_deref().filter(|u| !u.is_empty()) {
                if !is_action_reference(uses) {
                    errors.push(LintError::warning(
                        format!(
                            "Invalid action reference format: \"{}\". Expected format: \"owner/repo@ref\"",
                            uses
                        ),
                        format!("{}.uses", step_path),
                    ));
                }
            }
        }
    }
}

/// Lint a workflow with default options.
pub fn lint_workflow(workflow: &Workflow) -> Vec<LintError> {
    Linter::default().lint(workflow)
}

fn validate_trigger(trigger: &ParsedTrigger, index: usize, errors: &mut Vec<LintError>) {
    let event = trigger.event.as_str();
    let path = format!("on[{}].{}", index, event);
    let config = &trigger.config;

    if !is_known_event(event) {
        errors.push(LintError::error(
            format!(
                "Invalid trigger event: \"{}\". Valid events: {}, ...",
                event,
                KNOWN_EVENTS[..MAX_LISTED].join(", ")
            ),
            path.clone(),
        ));
    }

    if event == "push" || event == "pull_request" {
        for (key, label) in [
            ("branches", "Branches"),
            ("tags", "Tags"),
            ("paths", "Paths"),
            ("paths-ignore", "Paths"),
        ] {
            let Some(value) = config.get(key).filter(|v| !v.is_null()) else {
                continue;
            };
            if !as_list(value).iter().all(|v| v.is_string()) {
                errors.push(LintError::error(
                    format!(
                        "Invalid {} format in {} trigger. {} must be strings.",
                        key, event, label
                    ),
                    format!("{}.{}", path, key),
                ));
            }
        }
    }

    if let Some(types) = config.get("types").filter(|v| !v.is_null()) {
        let types = as_list(types);
        match activity_types(event) {
            Some(ActivityTypes::Open) => {
                if !types.iter().all(|t| t.is_string()) {
                    errors.push(LintError::error(
                        format!("{} types must be strings", event),
                        format!("{}.types", path),
                    ));
                }
            }
            Some(ActivityTypes::Closed(allowed)) => {
                let listed = allowed
                    .iter()
                    .take(MAX_LISTED)
                    .copied()
                    .collect::<Vec<_>>()
                    .join(", ");
                let more = if allowed.len() > MAX_LISTED { ", ..." } else { "" };
                for activity in types.iter().filter_map(|t| t.as_str()) {
                    if allowed.contains(&activity) {
                        continue;
                    }
                    let message = format!(
                        "Invalid {} type: \"{}\". Valid types: {}{}",
                        event, activity, listed, more
                    );
                    let types_path = format!("{}.types", path);
                    errors.push(if event == "workflow_run" {
                        LintError::error(message, types_path)
                    } else {
                        LintError::warning(message, types_path)
                    });
                }
            }
            None => {}
        }
    }

    if event == "workflow_run" {
        let has_workflows = match config.get("workflows") {
            Some(Value::String(name)) => !name.is_empty(),
            Some(Value::Sequence(names)) => !names.is_empty() && names.iter().all(Value::is_string),
            _ => false,
        };
        if !has_workflows {
            errors.push(LintError::error(
                "workflow_run trigger requires a \"workflows\" field (string or list of strings)",
                path.clone(),
            ));
        }
    }

    if event == "schedule" {
        match config.cron() {
            None => errors.push(LintError::error(
                "schedule trigger requires a \"cron\" field (string)",
                path.clone(),
            )),
            Some(cron) if !is_valid_cron(cron) => errors.push(LintError::error(
                format!(
                    "Invalid cron expression: \"{}\". Format: \"minute hour day month weekday\" (e.g., \"0 0 * * *\")",
                    cron
                ),
                format!("{}.cron", path),
            )),
            Some(_) => {}
        }
    }
}

/// Report every job from which a depth-first walk over `needs` finds a cycle.
///
/// Jobs already visited by an earlier walk are not reported again, so one
/// cycle usually yields one diagnostic.
fn check_cycles(jobs: &IndexMap<String, Job>, errors: &mut Vec<LintError>) {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: HashSet<&str> = HashSet::new();

    for job_id in jobs.keys() {
        if visited.contains(job_id.as_str()) {
            continue;
        }
        if has_cycle(job_id, jobs, &mut visited, &mut stack) {
            errors.push(LintError::error(
                format!("Circular dependency detected involving job \"{}\"", job_id),
                format!("jobs.{}.needs", job_id),
            ));
        }
    }
}

fn has_cycle<'a>(
    job_id: &'a str,
    jobs: &'a IndexMap<String, Job>,
    visited: &mut HashSet<&'a str>,
    stack: &mut HashSet<&'a str>,
) -> bool {
    if stack.contains(job_id) {
        return true;
    }
    if !visited.insert(job_id) {
        return false;
    }
    stack.insert(job_id);
    let found = jobs
        .get(job_id)
        .map(|job| {
            job.needs_list()
                .into_iter()
                .any(|need| has_cycle(need, jobs, visited, stack))
        })
        .unwrap_or(false);
    stack.remove(job_id);
    found
}

fn as_list(value: &Value) -> Vec<&Value> {
    match value {
        Value::Sequence(items) => items.iter().collect(),
        other => vec![other],
    }
}

/// Five whitespace-separated fields of digits, `*`, `,`, `/` or `-`.
fn is_valid_cron(cron: &str) -> bool {
    static FIELD: OnceLock<Regex> = OnceLock::new();
    let field = FIELD.get_or_init(|| Regex::new(r"^[0-9*,/\-]+$").expect("valid cron regex"));
    let parts: Vec<&str> = cron.split_whitespace().collect();
    parts.len() == 5 && parts.iter().all(|part| field.is_match(part))
}

/// `owner/repo[/path][@ref]`, a local `./path`, or a `docker://` image.
fn is_action_reference(uses: &str) -> bool {
    static ACTION: OnceLock<Regex> = OnceLock::new();
    if uses.starts_with("./") || uses.starts_with("docker://") {
        return true;
    }
    let action = ACTION.get_or_init(|| {
        Regex::new(r"^[\w.\-]+/[\w.\-]+(@[\w.\-]+)?(/[\w.\-/]+)?(@[\w.\-]+)?$")
            .expect("valid action regex")
    });
    action.is_match(uses)
}
