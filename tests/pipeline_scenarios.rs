//! End-to-end pipeline scenarios against the real shell
//!
//! These run actual bash commands, so they verify the whole path from
//! YAML definition to recorded step results.

use gantry::core::config::PipelineConfig;
use gantry::{
    ConcurrencyController, PipelineOrchestrator, PipelineStatus, RunStatus, ShellLauncher,
    TriggerEvent, TriggerGate,
};
use std::sync::Arc;

fn orchestrator(yaml: &str) -> PipelineOrchestrator<ShellLauncher> {
    let config = PipelineConfig::from_yaml(yaml).expect("Should parse YAML");
    let gate = TriggerGate::from_config(&config);
    let controller = Arc::new(ConcurrencyController::new(config.concurrency.clone()));
    PipelineOrchestrator::new(config.to_pipeline(), gate, controller, ShellLauncher)
}

fn push_event() -> TriggerEvent {
    TriggerEvent::new("acme/widget", "push", Some("refs/heads/main"))
}

#[tokio::test]
async fn all_steps_succeed_and_every_result_is_recorded() {
    let orch = orchestrator(
        r#"
name: "ci"
jobs:
  - name: build
    steps:
      - name: configure
        run: "echo configuring"
      - name: compile
        run: "echo compiling"
      - name: test
        run: "echo testing"
"#,
    );

    let result = orch.handle(push_event()).await;

    assert_eq!(result.status, PipelineStatus::Succeeded);
    let job = &result.jobs[0];
    assert_eq!(job.status, RunStatus::Succeeded);
    assert_eq!(job.results.len(), 3, "every step should leave a result");
    assert!(job.results.iter().all(|r| r.passed()));
    assert!(job.results[1].output.contains("compiling"));
}

#[tokio::test]
async fn failing_step_halts_the_job_and_later_steps_never_run() {
    let orch = orchestrator(
        r#"
name: "ci"
jobs:
  - name: build
    steps:
      - name: ok
        run: "echo fine"
      - name: boom
        run: "exit 7"
      - name: unreachable
        run: "echo should-not-run"
"#,
    );

    let result = orch.handle(push_event()).await;

    assert_eq!(result.status, PipelineStatus::Failed);
    let job = &result.jobs[0];
    assert_eq!(job.status, RunStatus::Failed);
    // the log is a strict prefix of the declared steps
    assert_eq!(job.results.len(), 2);
    assert_eq!(job.results[1].step_name, "boom");
    assert_eq!(job.results[1].exit_code, 7);
}

#[tokio::test]
async fn tolerated_failure_lets_remaining_steps_run() {
    let orch = orchestrator(
        r#"
name: "ci"
jobs:
  - name: build
    steps:
      - name: flaky
        run: "exit 1"
        continue_on_error: true
      - name: after
        run: "echo still-here"
"#,
    );

    let result = orch.handle(push_event()).await;

    assert_eq!(result.status, PipelineStatus::Succeeded);
    let job = &result.jobs[0];
    assert_eq!(job.results.len(), 2);
    assert_eq!(job.results[0].exit_code, 1);
    assert!(job.results[1].output.contains("still-here"));
}

#[tokio::test]
async fn env_precedence_step_over_job_over_pipeline() {
    let orch = orchestrator(
        r#"
name: "ci"
env:
  WHO: pipeline
  SHARED: pipeline
jobs:
  - name: build
    env:
      WHO: job
    steps:
      - name: job-wins
        run: "echo who=$WHO shared=$SHARED"
      - name: step-wins
        run: "echo who=$WHO"
        env:
          WHO: step
"#,
    );

    let result = orch.handle(push_event()).await;

    assert_eq!(result.status, PipelineStatus::Succeeded);
    let results = &result.jobs[0].results;
    assert!(results[0].output.contains("who=job"));
    assert!(results[0].output.contains("shared=pipeline"));
    assert!(results[1].output.contains("who=step"));
}

#[tokio::test]
async fn strict_shell_stops_at_first_failing_command() {
    let orch = orchestrator(
        r#"
name: "ci"
jobs:
  - name: build
    steps:
      - name: multi
        run: |
          false
          echo survived
"#,
    );

    let result = orch.handle(push_event()).await;

    assert_eq!(result.status, PipelineStatus::Failed);
    let step = &result.jobs[0].results[0];
    assert_ne!(step.exit_code, 0);
    assert!(
        !step.output.contains("survived"),
        "strict mode should abort before the echo"
    );
}

#[tokio::test]
async fn non_strict_step_runs_the_whole_script() {
    let orch = orchestrator(
        r#"
name: "ci"
jobs:
  - name: build
    steps:
      - name: multi
        run: |
          false
          echo survived
        strict: false
"#,
    );

    let result = orch.handle(push_event()).await;

    // exit status is the last command's, which succeeded
    assert_eq!(result.status, PipelineStatus::Succeeded);
    assert!(result.jobs[0].results[0].output.contains("survived"));
}

#[tokio::test]
async fn timed_out_step_fails_with_exit_124() {
    let orch = orchestrator(
        r#"
name: "ci"
jobs:
  - name: build
    steps:
      - name: hang
        run: "sleep 30"
        timeout_secs: 1
"#,
    );

    let result = orch.handle(push_event()).await;

    assert_eq!(result.status, PipelineStatus::Failed);
    let step = &result.jobs[0].results[0];
    assert_eq!(step.exit_code, 124);
    assert!(step.output.contains("timed out"));
}

#[tokio::test]
async fn working_dir_applies_to_every_step_in_the_job() {
    let dir = tempfile::tempdir().expect("Should create temp dir");
    let yaml = format!(
        r#"
name: "ci"
jobs:
  - name: build
    working_dir: "{}"
    steps:
      - name: where
        run: "pwd"
"#,
        dir.path().display()
    );

    let orch = orchestrator(&yaml);
    let result = orch.handle(push_event()).await;

    assert_eq!(result.status, PipelineStatus::Succeeded);
    let output = &result.jobs[0].results[0].output;
    assert!(
        output.contains(dir.path().file_name().unwrap().to_str().unwrap()),
        "pwd should report the configured working dir, got: {}",
        output
    );
}

#[tokio::test]
async fn mismatched_ref_is_denied_without_side_effects() {
    let orch = orchestrator(
        r#"
name: "ci"
ref_pattern: "refs/heads/main"
jobs:
  - name: build
    steps:
      - name: ok
        run: "true"
"#,
    );

    let event = TriggerEvent::new("acme/widget", "push", Some("refs/heads/feature"));
    let result = orch.handle(event).await;

    assert_eq!(result.status, PipelineStatus::Denied);
    assert!(result.run_id.is_none());
    assert!(result.jobs.is_empty());
}
