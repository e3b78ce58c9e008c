//! Dependency-graph layout for rendering a workflow as a left-to-right flow.
//!
//! ```text
//!  trigger band     column 0        column 1        append
//! ┌──────────┐    ┌─────────┐     ┌─────────┐
//! │ push     │───►│ build   │────►│ test    │───►  [+]
//! └──────────┘    └─────────┘  ┌─►└─────────┘
//!                 ┌─────────┐  │
//!                 │ lint    │──┘
//!                 └─────────┘
//! ```
//!
//! Jobs are leveled greedily: each column takes every remaining job whose
//! `needs` are all placed already. When nothing qualifies (a cycle or a
//! dangling reference) the first remaining job is placed alone so the layout
//! always completes. This is a leveling heuristic only; there is no crossing
//! minimization.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::schema::Workflow;
use super::triggers::{parse_triggers, trigger_label, ParsedTrigger};

/// Node id prefix for trigger nodes; the full id is `trigger:{index}`.
///
/// Job ids are limited to letters, digits, `_` and `-`, so ids containing
/// `:` never name a job. A job key that breaks that rule and still collides
/// pushes the synthetic id to a `:`-suffixed variant (see `synthetic_id`).
pub const TRIGGER_NODE_PREFIX: &str = "trigger:";

/// Node id of the synthetic "add job" node.
pub const ADD_JOB_NODE_ID: &str = "add-job:";

/// Label of the placeholder trigger node shown when `on` is empty.
pub const NO_TRIGGER_LABEL: &str = "No triggers configured";

/// Geometry used by `layout_with`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LayoutOptions {
    pub node_width: f64,
    pub node_height: f64,
    pub horizontal_gap: f64,
    pub vertical_gap: f64,
    /// Horizontal space reserved left of the first job column for triggers
    pub trigger_band: f64,
    /// Width and height of the append node
    pub add_node_size: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            node_width: 200.0,
            node_height: 80.0,
            horizontal_gap: 80.0,
            vertical_gap: 60.0,
            trigger_band: 280.0,
            add_node_size: 40.0,
        }
    }
}

impl LayoutOptions {
    fn column_x(&self, column: usize) -> f64 {
        self.trigger_band + column as f64 * (self.node_width + self.horizontal_gap)
    }

    fn row_y(&self, row: usize) -> f64 {
        row as f64 * (self.node_height + self.vertical_gap)
    }

    /// Vertical center of a column holding `rows` stacked nodes.
    fn center_y(&self, rows: usize) -> f64 {
        let rows = rows.max(1);
        (self.row_y(rows - 1) + self.node_height) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobNodeData {
    pub job_id: String,
    /// Display name, or the job id when unnamed
    pub label: String,
    pub runs_on: String,
    pub step_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerNodeData {
    /// `None` for the placeholder node of a workflow without triggers
    pub trigger: Option<ParsedTrigger>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddJobNodeData {
    /// Job ids a job added from this node should depend on
    pub needs: Vec<String>,
}

/// Node payload, tagged with the node type the renderer dispatches on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum NodeData {
    Job(JobNodeData),
    Trigger(TriggerNodeData),
    AddJob(AddJobNodeData),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: String,
    pub position: Position,
    #[serde(flatten)]
    pub data: NodeData,
}

impl FlowNode {
    pub fn is_job(&self) -> bool {
        matches!(self.data, NodeData::Job(_))
    }

    pub fn is_trigger(&self) -> bool {
        matches!(self.data, NodeData::Trigger(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl FlowEdge {
    fn new(source: &str, target: &str) -> Self {
        Self {
            id: format!("{}->{}", source, target),
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

/// Positioned nodes and edges for a graph widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

impl FlowGraph {
    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn job_nodes(&self) -> impl Iterator<Item = &FlowNode> {
        self.nodes.iter().filter(|n| n.is_job())
    }

    pub fn trigger_nodes(&self) -> impl Iterator<Item = &FlowNode> {
        self.nodes.iter().filter(|n| n.is_trigger())
    }

    /// The synthetic "add job" node; every layout has exactly one.
    pub fn add_job_node(&self) -> Option<&FlowNode> {
        self.nodes
            .iter()
            .find(|n| matches!(n.data, NodeData::AddJob(_)))
    }
}

/// Lay out a workflow with the default geometry.
pub fn layout(workflow: &Workflow) -> FlowGraph {
    layout_with(workflow, &LayoutOptions::default())
}

pub fn layout_with(workflow: &Workflow, options: &LayoutOptions) -> FlowGraph {
    let columns = level_jobs(workflow);
    let mut graph = FlowGraph::default();

    // Dependency edges, deduplicated, only between existing jobs
    let mut seen = HashSet::new();
    for (job_id, job) in &workflow.jobs {
        for need in job.needs_list() {
            if workflow.jobs.contains_key(need) && seen.insert((need, job_id.as_str())) {
                graph.edges.push(FlowEdge::new(need, job_id));
            }
        }
    }

    // Triggers, stacked and centered against the first job column
    let triggers = parse_triggers(&workflow.on);
    let first_rows = columns.first().map_or(0, Vec::len);
    let trigger_count = triggers.len().max(1);
    let trigger_top = options.center_y(first_rows) - options.center_y(trigger_count);
    let trigger_data: Vec<TriggerNodeData> = if triggers.is_empty() {
        vec![TriggerNodeData {
            trigger: None,
            label: NO_TRIGGER_LABEL.to_string(),
        }]
    } else {
        triggers
            .into_iter()
            .map(|trigger| TriggerNodeData {
                label: trigger_label(&trigger),
                trigger: Some(trigger),
            })
            .collect()
    };
    for (index, data) in trigger_data.into_iter().enumerate() {
        let id = synthetic_id(format!("{}{}", TRIGGER_NODE_PREFIX, index), workflow);
        if let Some(entry_jobs) = columns.first() {
            for job_id in entry_jobs {
                graph.edges.push(FlowEdge::new(&id, job_id));
            }
        }
        graph.nodes.push(FlowNode {
            id,
            position: Position {
                x: 0.0,
                y: trigger_top + options.row_y(index),
            },
            data: NodeData::Trigger(data),
        });
    }

    // Jobs
    for (column_index, column) in columns.iter().enumerate() {
        let x = options.column_x(column_index);
        for (row_index, job_id) in column.iter().enumerate() {
            let Some(job) = workflow.jobs.get(*job_id) else {
                continue;
            };
            graph.nodes.push(FlowNode {
                id: job_id.to_string(),
                position: Position {
                    x,
                    y: options.row_y(row_index),
                },
                data: NodeData::Job(JobNodeData {
                    job_id: job_id.to_string(),
                    label: job
                        .name
                        .clone()
                        .filter(|name| !name.is_empty())
                        .unwrap_or_else(|| job_id.to_string()),
                    runs_on: job.runs_on.display(),
                    step_count: job.steps.len(),
                }),
            });
        }
    }

    // Append node one column past the last
    let last = columns.last().cloned().unwrap_or_default();
    let add_id = synthetic_id(ADD_JOB_NODE_ID.to_string(), workflow);
    for job_id in &last {
        graph.edges.push(FlowEdge::new(job_id, &add_id));
    }
    graph.nodes.push(FlowNode {
        id: add_id,
        position: Position {
            x: options.column_x(columns.len()),
            y: options.center_y(last.len()) - options.add_node_size / 2.0,
        },
        data: NodeData::AddJob(AddJobNodeData {
            needs: last.iter().map(|id| id.to_string()).collect(),
        }),
    });

    tracing::debug!(
        "[Layout] {} job(s) in {} column(s), {} node(s), {} edge(s)",
        workflow.jobs.len(),
        columns.len(),
        graph.nodes.len(),
        graph.edges.len()
    );
    graph
}

/// A node id for a non-job node that no job id in `workflow` equals.
fn synthetic_id(mut id: String, workflow: &Workflow) -> String {
    while workflow.jobs.contains_key(&id) {
        id.push(':');
    }
    id
}

/// Partition job ids into columns, in job-map order within each column.
pub fn level_jobs(workflow: &Workflow) -> Vec<Vec<&str>> {
    let mut columns: Vec<Vec<&str>> = Vec::new();
    let mut placed: HashSet<&str> = HashSet::new();
    let mut remaining: Vec<&str> = workflow.jobs.keys().map(String::as_str).collect();

    while !remaining.is_empty() {
        let mut column: Vec<&str> = remaining
            .iter()
            .copied()
            .filter(|id| {
                workflow.jobs[*id]
                    .needs_list()
                    .iter()
                    .all(|need| placed.contains(need))
            })
            .collect();
        if column.is_empty() {
            tracing::trace!("[Layout] Force-placing job \"{}\"", remaining[0]);
            column.push(remaining[0]);
        }
        placed.extend(column.iter().copied());
        remaining.retain(|id| !placed.contains(id));
        columns.push(column);
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::parser::parse_workflow;

    fn graph(yaml: &str) -> FlowGraph {
        let result = parse_workflow(yaml);
        assert!(result.is_ok(), "{:?}", result.errors);
        layout(&result.workflow)
    }

    fn position(graph: &FlowGraph, id: &str) -> Position {
        graph.node(id).map(|n| n.position).unwrap()
    }

    fn edge_ids(graph: &FlowGraph) -> Vec<&str> {
        graph.edges.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_columns_by_dependency_level() {
        let g = graph(
            "on: push\njobs:\n  a: {steps: []}\n  b: {needs: a, steps: []}\n  c: {needs: a, steps: []}\n",
        );
        let a = position(&g, "a");
        let b = position(&g, "b");
        let c = position(&g, "c");
        assert_eq!(a.x, 280.0);
        assert_eq!(b.x, 560.0);
        assert_eq!(c.x, b.x);
        assert_eq!(c.y - b.y, 140.0);
        assert_eq!(
            edge_ids(&g),
            vec![
                "a->b",
                "a->c",
                "trigger:0->a",
                "b->add-job:",
                "c->add-job:"
            ]
        );
    }

    #[test]
    fn test_add_node_centered_on_last_column() {
        let g = graph(
            "on: push\njobs:\n  a: {steps: []}\n  b: {needs: a, steps: []}\n  c: {needs: a, steps: []}\n",
        );
        let add = g.node(ADD_JOB_NODE_ID).unwrap();
        assert_eq!(add.position.x, 840.0);
        // two rows: (140 + 80) / 2 - 20
        assert_eq!(add.position.y, 90.0);
        match &add.data {
            NodeData::AddJob(data) => assert_eq!(data.needs, vec!["b", "c"]),
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_one_trigger_node_per_trigger() {
        let g = graph(
            "on:\n  push: {branches: [main]}\n  workflow_dispatch:\njobs:\n  a: {steps: []}\n  b: {steps: []}\n",
        );
        let triggers: Vec<&FlowNode> = g.trigger_nodes().collect();
        assert_eq!(triggers.len(), 2);
        assert_eq!(triggers[0].id, "trigger:0");
        assert_eq!(triggers[0].position.x, 0.0);
        assert_eq!(triggers[0].position.y, 0.0);
        assert_eq!(triggers[1].position.y, 140.0);
        match &triggers[0].data {
            NodeData::Trigger(data) => assert_eq!(data.label, "push (main)"),
            other => panic!("unexpected payload {:?}", other),
        }
        assert_eq!(
            g.edges
                .iter()
                .filter(|e| e.source.starts_with(TRIGGER_NODE_PREFIX))
                .count(),
            4
        );
    }

    #[test]
    fn test_single_trigger_centered_on_column() {
        let g = graph("on: push\njobs:\n  a: {steps: []}\n  b: {steps: []}\n  c: {steps: []}\n");
        // three rows span 0..360, one trigger node is 80 high
        assert_eq!(position(&g, "trigger:0").y, 140.0);
    }

    #[test]
    fn test_empty_workflow() {
        let g = layout(&Workflow::default());
        assert_eq!(g.job_nodes().count(), 0);
        assert!(g.edges.is_empty());
        assert_eq!(g.nodes.len(), 2);
        match &g.nodes[0].data {
            NodeData::Trigger(data) => {
                assert!(data.trigger.is_none());
                assert_eq!(data.label, NO_TRIGGER_LABEL);
            }
            other => panic!("unexpected payload {:?}", other),
        }
        let add = g.node(ADD_JOB_NODE_ID).unwrap();
        assert_eq!(add.position, Position { x: 280.0, y: 20.0 });
    }

    #[test]
    fn test_cycle_is_force_placed() {
        let g = graph("on: push\njobs:\n  a: {needs: b, steps: []}\n  b: {needs: a, steps: []}\n");
        assert_eq!(g.job_nodes().count(), 2);
        assert_eq!(position(&g, "a").x, 280.0);
        assert_eq!(position(&g, "b").x, 560.0);
    }

    #[test]
    fn test_dangling_needs_blocks_then_places() {
        let workflow = parse_workflow(
            "on: push\njobs:\n  a: {steps: []}\n  b: {needs: [ghost, a, a], steps: []}\n",
        )
        .workflow;
        assert_eq!(level_jobs(&workflow), vec![vec!["a"], vec!["b"]]);
        let g = layout(&workflow);
        assert_eq!(g.edges.iter().filter(|e| e.target == "b").count(), 1);
    }

    #[test]
    fn test_node_ids_unique_with_reserved_looking_job_ids() {
        let g = graph(
            r#"
on: [push, pull_request]
jobs:
  __add_job__: {steps: []}
  __trigger__0: {steps: []}
  add-job: {needs: __add_job__, steps: []}
  "trigger:0": {steps: []}
  "add-job:": {needs: add-job, steps: []}
"#,
        );
        let ids: Vec<&str> = g.nodes.iter().map(|n| n.id.as_str()).collect();
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len(), "{:?}", ids);

        assert_eq!(g.trigger_nodes().next().unwrap().id, "trigger:0:");
        let add = g.add_job_node().unwrap();
        assert_eq!(add.id, "add-job::");
        assert!(g.node("add-job:").unwrap().is_job());
        assert!(g.edges.iter().any(|e| e.id == "add-job:->add-job::"));
        assert!(g.edges.iter().any(|e| e.id == "trigger:0:->__add_job__"));
    }

    #[test]
    fn test_placeholder_trigger_connects_to_entry_jobs() {
        let g = graph("on: {}\njobs:\n  a: {steps: []}\n");
        let placeholder = g.trigger_nodes().next().unwrap();
        match &placeholder.data {
            NodeData::Trigger(data) => assert!(data.trigger.is_none()),
            other => panic!("unexpected payload {:?}", other),
        }
        assert_eq!(edge_ids(&g), vec!["trigger:0->a", "a->add-job:"]);
    }

    #[test]
    fn test_job_payload() {
        let g = graph(
            "on: push\njobs:\n  build:\n    name: Build it\n    runs-on: [self-hosted, linux]\n    steps: [{run: a}, {run: b}]\n",
        );
        match &g.node("build").unwrap().data {
            NodeData::Job(data) => {
                assert_eq!(data.label, "Build it");
                assert_eq!(data.runs_on, "self-hosted, linux");
                assert_eq!(data.step_count, 2);
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_custom_geometry() {
        let workflow =
            parse_workflow("on: push\njobs:\n  a: {steps: []}\n  b: {needs: a, steps: []}\n").workflow;
        let options = LayoutOptions {
            node_width: 100.0,
            horizontal_gap: 20.0,
            trigger_band: 150.0,
            ..LayoutOptions::default()
        };
        let g = layout_with(&workflow, &options);
        assert_eq!(position(&g, "a").x, 150.0);
        assert_eq!(position(&g, "b").x, 270.0);
    }

    #[test]
    fn test_node_json_shape() {
        let g = graph("on: push\njobs:\n  a: {steps: []}\n");
        let json = serde_json::to_value(g.node("a").unwrap()).unwrap();
        assert_eq!(json["type"], "job");
        assert_eq!(json["data"]["jobId"], "a");
        assert_eq!(json["data"]["runsOn"], "ubuntu-latest");
        assert_eq!(json["position"]["x"], 280.0);

        let add = serde_json::to_value(g.node(ADD_JOB_NODE_ID).unwrap()).unwrap();
        assert_eq!(add["type"], "addJob");
    }
}
