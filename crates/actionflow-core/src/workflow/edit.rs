//! Editing helpers for hosts that change a workflow one field at a time.
//!
//! Every function takes the current workflow by reference and returns the
//! edited copy; the input is never modified. Operations naming a job or step
//! that does not exist return an unchanged copy.

use serde_yaml::Value;

use super::schema::{Job, Needs, On, RunsOn, Step, ValueMap, Workflow, DEFAULT_RUNNER};
use super::triggers::{parse_triggers, triggers_to_on, ParsedTrigger};

/// Display name given to a freshly created workflow.
pub const UNTITLED_WORKFLOW: &str = "Untitled Workflow";

/// Command of the single step in a freshly added job.
pub const DEFAULT_STEP_COMMAND: &str = "echo \"Hello, World!\"";

/// A blank workflow triggered by pushes to `main`, with no jobs.
pub fn new_workflow() -> Workflow {
    Workflow {
        name: Some(UNTITLED_WORKFLOW.to_string()),
        on: push_to_main(),
        ..Workflow::default()
    }
}

/// A two-job build/test workflow for first-time users.
pub fn sample_workflow() -> Workflow {
    let mut workflow = Workflow {
        name: Some("Sample".to_string()),
        on: push_to_main(),
        ..Workflow::default()
    };
    workflow
        .jobs
        .insert("build".to_string(), job_with(Step::run("echo build")));
    let mut test = job_with(Step::run("echo test"));
    test.needs = Some(Needs::One("build".to_string()));
    workflow.jobs.insert("test".to_string(), test);
    workflow
}

fn push_to_main() -> On {
    let mut push = serde_yaml::Mapping::new();
    push.insert(
        Value::from("branches"),
        Value::Sequence(vec![Value::from("main")]),
    );
    let mut map = ValueMap::new();
    map.insert("push".to_string(), Value::Mapping(push));
    On::Map(map)
}

fn job_with(step: Step) -> Job {
    Job {
        runs_on: RunsOn::Label(DEFAULT_RUNNER.to_string()),
        steps: vec![step],
        ..Job::default()
    }
}

/// First id of the form `job-N` (N from 1) not already taken.
pub fn generate_job_id<'a>(existing: impl IntoIterator<Item = &'a str>) -> String {
    let existing: Vec<&str> = existing.into_iter().collect();
    (1..)
        .map(|n| format!("job-{}", n))
        .find(|id| !existing.contains(&id.as_str()))
        .unwrap_or_default()
}

/// Append a default job depending on `needs` and return the edited
/// workflow together with the new job's id.
pub fn add_job(workflow: &Workflow, needs: &[String]) -> (Workflow, String) {
    let job_id = generate_job_id(workflow.jobs.keys().map(String::as_str));
    let mut job = job_with(Step::run(DEFAULT_STEP_COMMAND));
    job.needs = Needs::compact(needs.to_vec());

    let mut next = workflow.clone();
    next.jobs.insert(job_id.clone(), job);
    tracing::debug!("[Edit] Added job \"{}\"", job_id);
    (next, job_id)
}

/// Delete a job and drop it from every other job's `needs`.
///
/// A `needs` left with one id collapses to the scalar form, and one left
/// empty is removed. Jobs that did not reference the deleted id keep their
/// `needs` exactly as written.
pub fn remove_job(workflow: &Workflow, job_id: &str) -> Workflow {
    let mut next = workflow.clone();
    if next.jobs.shift_remove(job_id).is_none() {
        return next;
    }
    for job in next.jobs.values_mut() {
        let needs = job.needs_list();
        if !needs.contains(&job_id) {
            continue;
        }
        let kept: Vec<String> = needs
            .into_iter()
            .filter(|need| *need != job_id)
            .map(str::to_string)
            .collect();
        job.needs = Needs::compact(kept);
    }
    next
}

/// Replace a job's `needs`, stored in the most compact form.
pub fn set_job_needs(workflow: &Workflow, job_id: &str, needs: Vec<String>) -> Workflow {
    update_job(workflow, job_id, |job| job.needs = Needs::compact(needs))
}

/// Apply an arbitrary change to one job.
pub fn update_job(workflow: &Workflow, job_id: &str, change: impl FnOnce(&mut Job)) -> Workflow {
    let mut next = workflow.clone();
    if let Some(job) = next.jobs.get_mut(job_id) {
        change(job);
    }
    next
}

/// Append a trigger with no configuration.
pub fn add_trigger(workflow: &Workflow, event: &str) -> Workflow {
    let mut triggers = parse_triggers(&workflow.on);
    triggers.push(ParsedTrigger::new(event));
    set_triggers(workflow, &triggers)
}

/// Replace `on` with the compact form of a trigger list.
pub fn set_triggers(workflow: &Workflow, triggers: &[ParsedTrigger]) -> Workflow {
    Workflow {
        on: triggers_to_on(triggers),
        ..workflow.clone()
    }
}

/// Append a step to a job.
pub fn add_step(workflow: &Workflow, job_id: &str, step: Step) -> Workflow {
    update_job(workflow, job_id, |job| job.steps.push(step))
}

/// Replace the step at `index` with the result of `change`.
pub fn update_step(
    workflow: &Workflow,
    job_id: &str,
    index: usize,
    change: impl FnOnce(Step) -> Step,
) -> Workflow {
    update_job(workflow, job_id, |job| {
        if let Some(slot) = job.steps.get_mut(index) {
            *slot = change(std::mem::take(slot));
        }
    })
}

pub fn remove_step(workflow: &Workflow, job_id: &str, index: usize) -> Workflow {
    update_job(workflow, job_id, |job| {
        if index < job.steps.len() {
            job.steps.remove(index);
        }
    })
}
