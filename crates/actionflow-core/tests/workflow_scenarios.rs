//! End-to-end scenarios for the workflow core.
//!
//! These tests drive the public API the way a host does: parse text, lint,
//! lay out, edit and save again.

use actionflow_core::workflow::edit::{add_job, remove_job, sample_workflow};
use actionflow_core::workflow::layout::{NodeData, ADD_JOB_NODE_ID};
use actionflow_core::workflow::{Needs, On, Severity};
use actionflow_core::{
    layout, lint_workflow, parse_triggers, parse_workflow, serialize_workflow, triggers_to_on,
};

const SAMPLE: &str = r#"name: Sample
on: {push: {branches: [main]}}
jobs: {build: {runs-on: ubuntu-latest, steps: [{run: "echo build"}]}, test: {needs: build, runs-on: ubuntu-latest, steps: [{run: "echo test"}]}}
"#;

const FULL: &str = r#"
name: CI
run-name: CI for ${{ github.ref }}
on:
  push:
    branches: [main, 'release/**']
    paths-ignore: ['docs/**']
  pull_request:
    types: [opened, synchronize]
  schedule:
    - cron: '0 3 * * 1'
  workflow_dispatch:
    inputs:
      debug:
        type: boolean
permissions:
  contents: read
concurrency:
  group: ci-${{ github.ref }}
  cancel-in-progress: true
env:
  CARGO_TERM_COLOR: always
jobs:
  lint:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
      - run: cargo clippy -- -D warnings
  test:
    name: Test (${{ matrix.os }})
    runs-on: ${{ matrix.os }}
    needs: lint
    timeout-minutes: 30
    strategy:
      fail-fast: false
      max-parallel: 2
      matrix:
        os: [ubuntu-latest, macos-latest, windows-latest]
        rust: [stable, beta]
    env:
      RUST_BACKTRACE: 1
    steps:
      - uses: actions/checkout@v4
      - uses: dtolnay/rust-toolchain@stable
        with:
          toolchain: ${{ matrix.rust }}
      - name: Test
        id: test
        run: cargo test --all
        shell: bash
        working-directory: crates
  publish:
    if: github.event_name == 'push'
    needs: [lint, test]
    runs-on: [self-hosted, linux]
    permissions:
      packages: write
    steps:
      - uses: ./.github/actions/publish
"#;

#[test]
fn test_sample_end_to_end() {
    let result = parse_workflow(SAMPLE);
    assert!(result.is_ok(), "{:?}", result.errors);
    assert!(lint_workflow(&result.workflow).is_empty());

    let graph = layout(&result.workflow);
    let job_x: Vec<(String, f64)> = graph
        .job_nodes()
        .map(|n| (n.id.clone(), n.position.x))
        .collect();
    assert_eq!(job_x.len(), 2);
    assert!(job_x[0].0 == "build" && job_x[1].0 == "test");
    assert!(job_x[0].1 < job_x[1].1);
    assert_eq!(graph.trigger_nodes().count(), 1);
    assert!(graph.node(ADD_JOB_NODE_ID).is_some());

    let job_edges: Vec<&str> = graph
        .edges
        .iter()
        .filter(|e| graph.node(&e.source).is_some_and(|n| n.is_job()))
        .filter(|e| graph.node(&e.target).is_some_and(|n| n.is_job()))
        .map(|e| e.id.as_str())
        .collect();
    assert_eq!(job_edges, vec!["build->test"]);
}

#[test]
fn test_sample_workflow_matches_sample_text() {
    assert_eq!(parse_workflow(SAMPLE).workflow, sample_workflow());
}

#[test]
fn test_full_workflow_round_trip() {
    let first = parse_workflow(FULL);
    assert!(first.is_ok(), "{:?}", first.errors);

    let yaml = serialize_workflow(&first.workflow).unwrap();
    let second = parse_workflow(&yaml);
    assert!(second.is_ok(), "{:?}\n{}", second.errors, yaml);
    assert_eq!(first.workflow, second.workflow);

    // Serializing is stable after the first pass
    assert_eq!(serialize_workflow(&second.workflow).unwrap(), yaml);
}

#[test]
fn test_full_workflow_passthrough_fields() {
    let workflow = parse_workflow(FULL).workflow;
    assert!(workflow.extra.contains_key("concurrency"));
    assert!(workflow.extra.contains_key("permissions"));
    let test = workflow.job("test").unwrap();
    assert!(test.extra.contains_key("timeout-minutes"));
    assert!(test.steps[2].extra.contains_key("working-directory"));
    let publish = workflow.job("publish").unwrap();
    assert!(publish.extra.contains_key("if"));
    assert!(publish.permissions.is_some());
}

#[test]
fn test_full_workflow_lints_and_lays_out() {
    let workflow = parse_workflow(FULL).workflow;
    let diagnostics = lint_workflow(&workflow);
    // `linux` is not a known runner label; everything else is valid
    assert_eq!(diagnostics.len(), 1, "{:?}", diagnostics);
    assert_eq!(diagnostics[0].severity, Severity::Warning);
    assert_eq!(diagnostics[0].path.as_deref(), Some("jobs.publish.runs-on"));

    let graph = layout(&workflow);
    assert_eq!(graph.trigger_nodes().count(), 4);
    let x = |id: &str| graph.node(id).unwrap().position.x;
    assert!(x("lint") < x("test"));
    assert!(x("test") < x("publish"));
}

#[test]
fn test_layout_is_deterministic() {
    let workflow = parse_workflow(FULL).workflow;
    let first = serde_json::to_string(&layout(&workflow)).unwrap();
    let second = serde_json::to_string(&layout(&workflow)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_layout_column_placement() {
    let workflow =
        parse_workflow("on: push\njobs:\n  a: {}\n  b: {needs: a}\n  c: {needs: a}\n").workflow;
    let graph = layout(&workflow);
    let pos = |id: &str| graph.node(id).unwrap().position;
    assert!(pos("a").x < pos("b").x);
    assert_eq!(pos("b").x, pos("c").x);
    assert_eq!((pos("c").y - pos("b").y).abs(), 80.0 + 60.0);
}

#[test]
fn test_cycle_is_linted_and_still_laid_out() {
    let workflow = parse_workflow("on: push\njobs:\n  a: {needs: b, steps: [{run: x}]}\n  b: {needs: a, steps: [{run: x}]}\n").workflow;
    let diagnostics = lint_workflow(&workflow);
    assert!(diagnostics.iter().any(|d| d.is_error()
        && matches!(d.path.as_deref(), Some("jobs.a.needs") | Some("jobs.b.needs"))));
    assert_eq!(layout(&workflow).job_nodes().count(), 2);
}

#[test]
fn test_parser_permissiveness() {
    let result = parse_workflow("not: valid: yaml: [");
    assert!(result.workflow.jobs.is_empty());
    assert!(result
        .messages()
        .iter()
        .any(|m| m.to_lowercase().contains("parse")));

    let result = parse_workflow("name: No jobs\non: push\n");
    assert!(result.workflow.jobs.is_empty());
    assert!(result.messages().iter().any(|m| m.contains("jobs")));
    assert_eq!(result.workflow.name.as_deref(), Some("No jobs"));
}

#[test]
fn test_needs_scalar_preserved() {
    let workflow = parse_workflow(SAMPLE).workflow;
    assert_eq!(
        workflow.job("test").unwrap().needs,
        Some(Needs::One("build".to_string()))
    );
}

#[test]
fn test_trigger_compaction() {
    assert_eq!(
        triggers_to_on(&parse_triggers(&On::Event("push".to_string()))),
        On::Event("push".to_string())
    );

    let on = parse_workflow(
        "on:\n  push: {}\n  schedule:\n    - cron: '0 0 * * *'\n    - cron: '0 12 * * *'\njobs: {}\n",
    )
    .workflow
    .on;
    let triggers = parse_triggers(&on);
    assert_eq!(triggers.len(), 3);
    let On::Map(folded) = triggers_to_on(&triggers) else {
        panic!("expected a mapping");
    };
    assert_eq!(folded["schedule"].as_sequence().map(Vec::len), Some(2));
}

#[test]
fn test_edit_then_save() {
    let (workflow, id) = add_job(&sample_workflow(), &["test".to_string()]);
    let workflow = remove_job(&workflow, "test");
    assert_eq!(workflow.job(&id).unwrap().needs, None);

    let yaml = serialize_workflow(&workflow).unwrap();
    let reparsed = parse_workflow(&yaml);
    assert!(reparsed.is_ok());
    assert_eq!(reparsed.workflow, workflow);

    let graph = layout(&workflow);
    match &graph.node(ADD_JOB_NODE_ID).unwrap().data {
        NodeData::AddJob(data) => assert_eq!(data.needs, vec!["build".to_string(), id]),
        other => panic!("unexpected payload {:?}", other),
    }
}
