//! YAML text to `Workflow`.
//!
//! The parser is deliberately permissive. Only three things are reported as
//! parse errors: invalid YAML, a root that is not a mapping, and a missing or
//! malformed `jobs` mapping (plus individual jobs that are not mappings).
//! Everything else is coerced field by field, and semantic problems are
//! left for the linter.

use serde_yaml::{Mapping, Value};

use crate::error::ParseError;

use super::schema::{
    scalar_string, string_keyed, Job, Needs, On, RunsOn, Step, Strategy, ValueMap, Workflow,
};

const WORKFLOW_KEYS: &[&str] = &["name", "run-name", "on", "env", "jobs"];
const JOB_KEYS: &[&str] = &[
    "name",
    "runs-on",
    "needs",
    "permissions",
    "env",
    "strategy",
    "steps",
];
const STEP_KEYS: &[&str] = &["id", "name", "uses", "run", "with", "env", "shell"];

/// Result of parsing workflow text: always a usable model, plus any errors.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult {
    pub workflow: Workflow,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Error messages as displayed to the user.
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    fn fatal(error: ParseError) -> Self {
        Self {
            workflow: Workflow::empty(),
            errors: vec![error],
        }
    }
}

/// Parse workflow YAML. Never fails; problems are returned in `errors`.
pub fn parse_workflow(text: &str) -> ParseResult {
    let root: Value = match serde_yaml::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!("[Parser] YAML syntax error: {}", e);
            return ParseResult::fatal(ParseError::from_yaml(&e));
        }
    };

    let Value::Mapping(root) = root else {
        return ParseResult::fatal(ParseError::InvalidRoot);
    };

    let mut errors = Vec::new();
    let mut workflow = Workflow {
        name: field(&root, "name").and_then(scalar_string),
        run_name: field(&root, "run-name").and_then(scalar_string),
        on: field(&root, "on").and_then(On::from_value).unwrap_or_default(),
        env: field(&root, "env").and_then(non_empty_map),
        extra: passthrough(&root, WORKFLOW_KEYS),
        ..Workflow::default()
    };

    match field(&root, "jobs") {
        Some(Value::Mapping(jobs)) => {
            for (key, value) in jobs {
                let Some(job_id) = scalar_string(key) else {
                    continue;
                };
                match value {
                    Value::Mapping(job) => {
                        workflow.jobs.insert(job_id.clone(), parse_job(job));
                    }
                    _ => {
                        tracing::debug!("[Parser] Skipping job '{}': not a mapping", job_id);
                        errors.push(ParseError::InvalidJob { job_id });
                    }
                }
            }
        }
        _ => errors.push(ParseError::MissingJobs),
    }

    tracing::debug!(
        "[Parser] Parsed workflow with {} job(s), {} error(s)",
        workflow.jobs.len(),
        errors.len()
    );

    ParseResult { workflow, errors }
}

fn parse_job(job: &Mapping) -> Job {
    let steps = match field(job, "steps") {
        Some(Value::Sequence(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| parse_step(item, index))
            .collect(),
        _ => Vec::new(),
    };

    Job {
        name: field(job, "name").and_then(scalar_string),
        runs_on: field(job, "runs-on")
            .and_then(parse_runs_on)
            .unwrap_or_default(),
        needs: field(job, "needs").and_then(parse_needs),
        permissions: field(job, "permissions").and_then(value_map),
        env: field(job, "env").and_then(value_map),
        strategy: field(job, "strategy").and_then(parse_strategy),
        extra: passthrough(job, JOB_KEYS),
        steps,
    }
}

fn parse_runs_on(value: &Value) -> Option<RunsOn> {
    match value {
        Value::Sequence(items) => Some(RunsOn::Labels(
            items.iter().filter_map(scalar_string).collect(),
        )),
        other => scalar_string(other).map(RunsOn::Label),
    }
}

fn parse_needs(value: &Value) -> Option<Needs> {
    match value {
        Value::Sequence(items) => Some(Needs::Many(
            items.iter().filter_map(scalar_string).collect(),
        )),
        other => scalar_string(other).map(Needs::One),
    }
}

/// Keep only the well-typed strategy fields; `None` if none survive.
fn parse_strategy(value: &Value) -> Option<Strategy> {
    let Value::Mapping(map) = value else {
        return None;
    };
    let strategy = Strategy {
        matrix: field(map, "matrix").and_then(value_map),
        fail_fast: field(map, "fail-fast").and_then(Value::as_bool),
        max_parallel: field(map, "max-parallel").and_then(Value::as_i64),
    };
    (!strategy.is_unset()).then_some(strategy)
}

fn parse_step(value: &Value, index: usize) -> Step {
    let Value::Mapping(step) = value else {
        return Step::placeholder(index + 1);
    };
    Step {
        id: field(step, "id").and_then(scalar_string),
        name: field(step, "name").and_then(scalar_string),
        uses: field(step, "uses").and_then(scalar_string),
        run: field(step, "run").and_then(scalar_string),
        with: field(step, "with").and_then(non_empty_map),
        env: field(step, "env").and_then(non_empty_map),
        shell: field(step, "shell").and_then(scalar_string),
        extra: passthrough(step, STEP_KEYS),
    }
}

fn field<'a>(map: &'a Mapping, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}

fn value_map(value: &Value) -> Option<ValueMap> {
    match value {
        Value::Mapping(map) => Some(string_keyed(map)),
        _ => None,
    }
}

/// Empty mappings read as absent because the serializer omits them.
fn non_empty_map(value: &Value) -> Option<ValueMap> {
    value_map(value).filter(|m| !m.is_empty())
}

/// Entries whose key is not one of the modelled fields, in document order.
fn passthrough(map: &Mapping, known: &[&str]) -> Mapping {
    map.iter()
        .filter(|(k, _)| !k.as_str().is_some_and(|key| known.contains(&key)))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
