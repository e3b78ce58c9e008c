//! Model types for CI workflow definitions.
//!
//! A workflow document looks like:
//!
//! ```yaml
//! name: CI
//! on:
//!   push:
//!     branches: [main]
//! env:
//!   CARGO_TERM_COLOR: always
//! jobs:
//!   build:
//!     runs-on: ubuntu-latest
//!     strategy:
//!       matrix:
//!         rust: [stable, beta]
//!     steps:
//!       - uses: actions/checkout@v4
//!       - run: cargo build
//!   test:
//!     needs: build
//!     runs-on: ubuntu-latest
//!     steps:
//!       - run: cargo test
//! ```
//!
//! Fields that accept several shapes in YAML (`on`, `runs-on`, `needs`) are
//! kept in the shape the author wrote. Keys this model does not know about
//! are carried in an `extra` mapping on `Workflow`, `Job` and `Step` and
//! written back unchanged.
//!
//! The derived `Serialize` impls define the canonical YAML layout: field
//! order, omitted optional fields, and where passthrough keys land.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// String-keyed mapping of raw YAML values, in document order.
pub type ValueMap = IndexMap<String, Value>;

/// Runner label used when a job has no usable `runs-on`.
pub const DEFAULT_RUNNER: &str = "ubuntu-latest";

/// Root of a workflow document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Workflow {
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Run title, may contain `${{ }}` expressions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_name: Option<String>,

    /// Trigger specification, always written (an empty mapping when unset)
    #[serde(default)]
    pub on: On,

    /// Workflow-level environment variables
    #[serde(default, skip_serializing_if = "is_empty_map")]
    pub env: Option<ValueMap>,

    /// Unrecognized top-level keys (`permissions`, `concurrency`, ...)
    #[serde(flatten)]
    pub extra: Mapping,

    /// Jobs keyed by job id, in document order
    #[serde(default)]
    pub jobs: IndexMap<String, Job>,
}

impl Default for Workflow {
    fn default() -> Self {
        Self {
            name: None,
            run_name: None,
            on: On::default(),
            env: None,
            extra: Mapping::new(),
            jobs: IndexMap::new(),
        }
    }
}

impl Workflow {
    /// The fallback model returned when the input cannot be used at all.
    pub fn empty() -> Self {
        Self {
            name: Some(String::new()),
            ..Self::default()
        }
    }

    /// Get a job by id.
    pub fn job(&self, job_id: &str) -> Option<&Job> {
        self.jobs.get(job_id)
    }
}

/// The `on` field in one of its three authoring shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum On {
    /// `on: push`
    Event(String),
    /// `on: [push, {pull_request: {branches: [main]}}]`
    List(Vec<OnEntry>),
    /// `on: {push: {branches: [main]}, schedule: [{cron: "0 0 * * *"}]}`
    Map(ValueMap),
}

impl Default for On {
    fn default() -> Self {
        On::Map(ValueMap::new())
    }
}

impl On {
    /// Interpret a raw YAML value as an `on` field.
    ///
    /// Returns `None` for shapes that cannot describe triggers (numbers,
    /// booleans, null). List elements that are neither strings nor mappings
    /// are skipped.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(event) => Some(On::Event(event.clone())),
            Value::Sequence(items) => Some(On::List(
                items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(event) => Some(OnEntry::Event(event.clone())),
                        Value::Mapping(map) => Some(OnEntry::Configured(string_keyed(map))),
                        _ => None,
                    })
                    .collect(),
            )),
            Value::Mapping(map) => Some(On::Map(string_keyed(map))),
            _ => None,
        }
    }
}

/// One element of the list shape of `on`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OnEntry {
    Event(String),
    Configured(ValueMap),
}

/// A unit of work with a runner target, dependencies and ordered steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Job {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub runs_on: RunsOn,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub needs: Option<Needs>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<ValueMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<ValueMap>,

    #[serde(default, skip_serializing_if = "strategy_is_unset")]
    pub strategy: Option<Strategy>,

    /// Unrecognized job keys (`if`, `container`, `services`, `outputs`, ...)
    #[serde(flatten)]
    pub extra: Mapping,

    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Default for Job {
    fn default() -> Self {
        Self {
            name: None,
            runs_on: RunsOn::default(),
            needs: None,
            permissions: None,
            env: None,
            strategy: None,
            extra: Mapping::new(),
            steps: Vec::new(),
        }
    }
}

impl Job {
    /// Prerequisite job ids, with the scalar form read as a one-element list.
    pub fn needs_list(&self) -> Vec<&str> {
        self.needs.as_ref().map(Needs::as_list).unwrap_or_default()
    }
}

/// `runs-on`: a single runner label or a list of labels a runner must match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunsOn {
    Label(String),
    Labels(Vec<String>),
}

impl Default for RunsOn {
    fn default() -> Self {
        RunsOn::Label(DEFAULT_RUNNER.to_string())
    }
}

impl RunsOn {
    pub fn labels(&self) -> Vec<&str> {
        match self {
            RunsOn::Label(label) => vec![label.as_str()],
            RunsOn::Labels(labels) => labels.iter().map(String::as_str).collect(),
        }
    }

    /// True when no label is given at all (`""` or `[]`).
    pub fn is_empty(&self) -> bool {
        match self {
            RunsOn::Label(label) => label.is_empty(),
            RunsOn::Labels(labels) => labels.is_empty(),
        }
    }

    /// Labels joined for display, e.g. `self-hosted, linux`.
    pub fn display(&self) -> String {
        self.labels().join(", ")
    }
}

/// `needs`: one job id or a list of job ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Needs {
    One(String),
    Many(Vec<String>),
}

impl Needs {
    pub fn as_list(&self) -> Vec<&str> {
        match self {
            Needs::One(id) => vec![id.as_str()],
            Needs::Many(ids) => ids.iter().map(String::as_str).collect(),
        }
    }

    /// The most compact form for a list of ids: absent, scalar, or list.
    pub fn compact(ids: Vec<String>) -> Option<Self> {
        match ids.len() {
            0 => None,
            1 => ids.into_iter().next().map(Needs::One),
            _ => Some(Needs::Many(ids)),
        }
    }
}

/// Matrix fan-out settings for a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Strategy {
    /// Variable name to list of values; values stay raw so the linter can
    /// report non-list entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<ValueMap>,

    /// Absent means true
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_fast: Option<bool>,

    /// Absent means unbounded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_parallel: Option<i64>,
}

impl Strategy {
    pub fn is_unset(&self) -> bool {
        self.matrix.is_none() && self.fail_fast.is_none() && self.max_parallel.is_none()
    }
}

/// One action (`uses`) or shell command (`run`) within a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,

    #[serde(default, skip_serializing_if = "is_empty_map")]
    pub with: Option<ValueMap>,

    #[serde(default, skip_serializing_if = "is_empty_map")]
    pub env: Option<ValueMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,

    /// Unrecognized step keys (`if`, `working-directory`, ...)
    #[serde(flatten)]
    pub extra: Mapping,
}

impl Step {
    /// A shell step with only a `run` command.
    pub fn run(command: impl Into<String>) -> Self {
        Self {
            run: Some(command.into()),
            ..Self::default()
        }
    }

    /// An action step with only a `uses` reference.
    pub fn uses(action: impl Into<String>) -> Self {
        Self {
            uses: Some(action.into()),
            ..Self::default()
        }
    }

    /// Stand-in for a step entry that was not a mapping.
    pub fn placeholder(position: usize) -> Self {
        Self {
            name: Some(format!("Step {}", position)),
            run: Some(String::new()),
            ..Self::default()
        }
    }
}

/// Convert a scalar YAML value to its string form.
pub(crate) fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Re-key a YAML mapping by string, dropping entries whose key is not a scalar.
pub(crate) fn string_keyed(map: &Mapping) -> ValueMap {
    map.iter()
        .filter_map(|(k, v)| scalar_string(k).map(|key| (key, v.clone())))
        .collect()
}

fn is_empty_map(map: &Option<ValueMap>) -> bool {
    map.as_ref().is_none_or(|m| m.is_empty())
}

fn strategy_is_unset(strategy: &Option<Strategy>) -> bool {
    strategy.as_ref().is_none_or(Strategy::is_unset)
}
