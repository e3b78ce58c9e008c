//! Trigger normalization.
//!
//! The `on` field can be written three equivalent ways. Editing and display
//! code wants one shape, so `parse_triggers` flattens any of them into a list
//! of `ParsedTrigger` records and `triggers_to_on` folds such a list back into
//! the most compact `on` value.
//!
//! ```text
//! on: push                          ─┐
//! on: [push, {pull_request: {...}}]  ├─► parse_triggers ─► [ParsedTrigger]
//! on: {push: ..., schedule: [...]}  ─┘                          │
//!                                        On ◄─ triggers_to_on ◄──┘
//! ```
//!
//! `schedule` is special: its value is a list of `{cron: ...}` records and
//! each record becomes its own trigger.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use super::schema::{string_keyed, On, OnEntry, ValueMap};

/// Event name for cron-driven triggers.
pub const SCHEDULE_EVENT: &str = "schedule";

/// Cron used when a schedule trigger is folded back without one.
pub const DEFAULT_CRON: &str = "0 0 * * *";

/// Event names accepted in `on`.
pub const KNOWN_EVENTS: &[&str] = &[
    "push",
    "pull_request",
    "pull_request_target",
    "workflow_dispatch",
    "workflow_call",
    "workflow_run",
    "repository_dispatch",
    "schedule",
    "create",
    "delete",
    "deployment",
    "deployment_status",
    "fork",
    "gollum",
    "issue_comment",
    "issues",
    "label",
    "milestone",
    "page_build",
    "project",
    "project_card",
    "project_column",
    "public",
    "pull_request_review",
    "pull_request_review_comment",
    "registry_package",
    "release",
    "status",
    "watch",
    "branch_protection_rule",
    "check_run",
    "check_suite",
    "discussion",
    "discussion_comment",
    "merge_group",
];

const PULL_REQUEST_TYPES: &[&str] = &[
    "assigned",
    "auto_merge_disabled",
    "auto_merge_enabled",
    "closed",
    "converted_to_draft",
    "edited",
    "labeled",
    "locked",
    "opened",
    "ready_for_review",
    "reopened",
    "review_requested",
    "review_request_removed",
    "synchronize",
    "unassigned",
    "unlabeled",
    "unlocked",
];

const WORKFLOW_RUN_TYPES: &[&str] = &["completed", "requested", "in_progress"];

const RELEASE_TYPES: &[&str] = &[
    "published",
    "unpublished",
    "created",
    "edited",
    "deleted",
    "prereleased",
    "released",
];

const CREATED_EDITED_DELETED: &[&str] = &["created", "edited", "deleted"];

const CHECK_RUN_TYPES: &[&str] = &["created", "rerequested", "completed", "requested_action"];

const CHECK_SUITE_TYPES: &[&str] = &["completed"];

const DISCUSSION_TYPES: &[&str] = &[
    "created",
    "edited",
    "deleted",
    "transferred",
    "pinned",
    "unpinned",
    "labeled",
    "unlabeled",
    "locked",
    "unlocked",
    "category_changed",
    "answered",
    "unanswered",
];

const ISSUES_TYPES: &[&str] = &[
    "opened",
    "edited",
    "deleted",
    "transferred",
    "pinned",
    "unpinned",
    "closed",
    "reopened",
    "assigned",
    "unassigned",
    "labeled",
    "unlabeled",
    "locked",
    "unlocked",
    "milestoned",
    "demilestoned",
    "typed",
    "untyped",
];

const MERGE_GROUP_TYPES: &[&str] = &["checks_requested"];

const MILESTONE_TYPES: &[&str] = &["created", "closed", "opened", "edited", "deleted"];

const PULL_REQUEST_REVIEW_TYPES: &[&str] = &["submitted", "edited", "dismissed"];

const REGISTRY_PACKAGE_TYPES: &[&str] = &["published", "updated"];

const WATCH_TYPES: &[&str] = &["started"];

/// Activity types an event accepts in its `types` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityTypes {
    /// Only the listed values are meaningful.
    Closed(&'static [&'static str]),
    /// Any string is allowed (`repository_dispatch` custom types).
    Open,
}

/// Look up the `types` allow-list for an event.
///
/// Returns `None` for events that take no `types` filter. This table is the
/// single source for both `trigger_supports_types` and the linter.
pub fn activity_types(event: &str) -> Option<ActivityTypes> {
    let types = match event {
        "branch_protection_rule" => CREATED_EDITED_DELETED,
        "check_run" => CHECK_RUN_TYPES,
        "check_suite" => CHECK_SUITE_TYPES,
        "discussion" => DISCUSSION_TYPES,
        "discussion_comment" => CREATED_EDITED_DELETED,
        "issue_comment" => CREATED_EDITED_DELETED,
        "issues" => ISSUES_TYPES,
        "label" => CREATED_EDITED_DELETED,
        "merge_group" => MERGE_GROUP_TYPES,
        "milestone" => MILESTONE_TYPES,
        "pull_request" | "pull_request_target" => PULL_REQUEST_TYPES,
        "pull_request_review" => PULL_REQUEST_REVIEW_TYPES,
        "pull_request_review_comment" => CREATED_EDITED_DELETED,
        "registry_package" => REGISTRY_PACKAGE_TYPES,
        "release" => RELEASE_TYPES,
        "watch" => WATCH_TYPES,
        "workflow_run" => WORKFLOW_RUN_TYPES,
        "repository_dispatch" => return Some(ActivityTypes::Open),
        _ => return None,
    };
    Some(ActivityTypes::Closed(types))
}

/// Whether an event accepts a `types` filter.
pub fn trigger_supports_types(event: &str) -> bool {
    activity_types(event).is_some()
}

/// Whether an event name is recognized in `on`.
pub fn is_known_event(event: &str) -> bool {
    KNOWN_EVENTS.contains(&event)
}

/// Per-event configuration of a trigger, kept as the raw mapping the author
/// wrote so unmodelled filters survive editing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggerConfig(ValueMap);

impl TriggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an event's configuration value. Anything but a mapping (usually
    /// `null`, as in `on: {push:}`) gives an empty configuration.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Mapping(map) => Self(string_keyed(map)),
            _ => Self::default(),
        }
    }

    /// A schedule configuration holding only a cron expression.
    pub fn with_cron(cron: impl Into<String>) -> Self {
        let mut config = Self::new();
        config.insert("cron", Value::String(cron.into()));
        config
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// String entries of a filter; a scalar is read as a one-element list
    /// and non-string entries are skipped.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        match self.0.get(key) {
            Some(Value::Sequence(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            Some(Value::String(s)) => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    pub fn branches(&self) -> Vec<String> {
        self.string_list("branches")
    }

    pub fn tags(&self) -> Vec<String> {
        self.string_list("tags")
    }

    pub fn paths(&self) -> Vec<String> {
        self.string_list("paths")
    }

    pub fn paths_ignore(&self) -> Vec<String> {
        self.string_list("paths-ignore")
    }

    pub fn types(&self) -> Vec<String> {
        self.string_list("types")
    }

    pub fn cron(&self) -> Option<&str> {
        self.0.get("cron").and_then(Value::as_str)
    }

    /// `workflow_dispatch` / `workflow_call` input definitions.
    pub fn inputs(&self) -> Option<&Value> {
        self.0.get("inputs")
    }

    pub fn to_value(&self) -> Value {
        Value::Mapping(
            self.0
                .iter()
                .map(|(k, v)| (Value::String(k.clone()), v.clone()))
                .collect(),
        )
    }
}

/// One normalized entry of `on`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTrigger {
    pub event: String,
    pub config: TriggerConfig,
}

impl ParsedTrigger {
    /// A trigger with no configuration.
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            config: TriggerConfig::new(),
        }
    }

    pub fn with_config(event: impl Into<String>, config: TriggerConfig) -> Self {
        Self {
            event: event.into(),
            config,
        }
    }

    pub fn is_schedule(&self) -> bool {
        self.event == SCHEDULE_EVENT
    }
}

/// Flatten an `on` value into one record per trigger.
pub fn parse_triggers(on: &On) -> Vec<ParsedTrigger> {
    let mut triggers = Vec::new();
    match on {
        On::Event(event) => {
            if !event.is_empty() {
                triggers.push(ParsedTrigger::new(event.clone()));
            }
        }
        On::List(entries) => {
            for entry in entries {
                match entry {
                    OnEntry::Event(event) => triggers.push(ParsedTrigger::new(event.clone())),
                    OnEntry::Configured(map) => {
                        for (event, config) in map {
                            expand_event(event, config, &mut triggers);
                        }
                    }
                }
            }
        }
        On::Map(map) => {
            for (event, config) in map {
                expand_event(event, config, &mut triggers);
            }
        }
    }
    triggers
}

fn expand_event(event: &str, config: &Value, out: &mut Vec<ParsedTrigger>) {
    match config {
        Value::Sequence(records) if event == SCHEDULE_EVENT => {
            for record in records {
                out.push(ParsedTrigger::with_config(
                    event,
                    TriggerConfig::from_value(record),
                ));
            }
        }
        _ => out.push(ParsedTrigger::with_config(
            event,
            TriggerConfig::from_value(config),
        )),
    }
}

/// Fold a trigger list back into the most compact `on` value.
///
/// - no triggers: an empty mapping
/// - one unconfigured trigger: `on: push`
/// - one configured trigger: `on: {push: {...}}`
/// - several non-schedule triggers: a list, with all schedules merged into a
///   trailing `{schedule: [...]}` element
/// - only schedules: `on: {schedule: [...]}`
/// - one non-schedule trigger plus schedules: a mapping with the event first
pub fn triggers_to_on(triggers: &[ParsedTrigger]) -> On {
    let (schedules, others): (Vec<&ParsedTrigger>, Vec<&ParsedTrigger>) =
        triggers.iter().partition(|t| t.is_schedule());

    let merged_schedule = || {
        Value::Sequence(
            schedules
                .iter()
                .map(|trigger| {
                    let mut config = trigger.config.clone();
                    if config.cron().is_none() {
                        config.insert("cron", Value::String(DEFAULT_CRON.to_string()));
                    }
                    config.to_value()
                })
                .collect(),
        )
    };

    match others.as_slice() {
        [] if schedules.is_empty() => On::default(),
        [] => {
            let mut map = ValueMap::new();
            map.insert(SCHEDULE_EVENT.to_string(), merged_schedule());
            On::Map(map)
        }
        [single] if schedules.is_empty() => {
            if single.config.is_empty() {
                On::Event(single.event.clone())
            } else {
                let mut map = ValueMap::new();
                map.insert(single.event.clone(), single.config.to_value());
                On::Map(map)
            }
        }
        [single] => {
            let mut map = ValueMap::new();
            map.insert(single.event.clone(), single.config.to_value());
            map.insert(SCHEDULE_EVENT.to_string(), merged_schedule());
            On::Map(map)
        }
        many => {
            let mut entries: Vec<OnEntry> = many
                .iter()
                .map(|trigger| {
                    if trigger.config.is_empty() {
                        OnEntry::Event(trigger.event.clone())
                    } else {
                        let mut map = ValueMap::new();
                        map.insert(trigger.event.clone(), trigger.config.to_value());
                        OnEntry::Configured(map)
                    }
                })
                .collect();
            if !schedules.is_empty() {
                let mut map = ValueMap::new();
                map.insert(SCHEDULE_EVENT.to_string(), merged_schedule());
                entries.push(OnEntry::Configured(map));
            }
            On::List(entries)
        }
    }
}

/// Describe a trigger with its filters, e.g. `push • branches: main, dev`.
pub fn format_trigger(trigger: &ParsedTrigger) -> String {
    let config = &trigger.config;
    let mut parts = vec![trigger.event.clone()];
    for (label, values) in [
        ("branches", config.branches()),
        ("tags", config.tags()),
        ("paths", config.paths()),
        ("types", config.types()),
    ] {
        if !values.is_empty() {
            parts.push(format!("{}: {}", label, values.join(", ")));
        }
    }
    if let Some(cron) = config.cron() {
        parts.push(format!("cron: {}", cron));
    }
    parts.join(" • ")
}

/// Short label for a trigger: `push (main, dev)`, falling back to tags and
/// then to the bare event name.
pub fn trigger_label(trigger: &ParsedTrigger) -> String {
    let branches = trigger.config.branches();
    if !branches.is_empty() {
        return format!("{} ({})", trigger.event, branches.join(", "));
    }
    let tags = trigger.config.tags();
    if !tags.is_empty() {
        return format!("{} ({})", trigger.event, tags.join(", "));
    }
    trigger.event.clone()
}

/// Read a raw YAML value as an `on` field and normalize it.
pub fn parse_triggers_value(value: &Value) -> Vec<ParsedTrigger> {
    On::from_value(value)
        .map(|on| parse_triggers(&on))
        .unwrap_or_default()
}

/// Render an `on` value as raw YAML.
pub fn on_to_value(on: &On) -> Value {
    match on {
        On::Event(event) => Value::String(event.clone()),
        On::List(entries) => Value::Sequence(
            entries
                .iter()
                .map(|entry| match entry {
                    OnEntry::Event(event) => Value::String(event.clone()),
                    OnEntry::Configured(map) => Value::Mapping(to_mapping(map)),
                })
                .collect(),
        ),
        On::Map(map) => Value::Mapping(to_mapping(map)),
    }
}

fn to_mapping(map: &ValueMap) -> Mapping {
    map.iter()
        .map(|(k, v)| (Value::String(k.clone()), v.clone()))
        .collect()
}
