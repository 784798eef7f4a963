//! Job runner - drives one job's steps in order with fail-fast semantics

use crate::core::{compose_env, Job, JobReport, RunStatus};
use crate::execution::cancel::CancelToken;
use crate::execution::events::{EventSink, ExecutionEvent};
use crate::execution::executor::{CommandLauncher, StepExecutor, StepOutcome};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Runs the steps of one job strictly in declared order
pub struct JobRunner<L> {
    executor: Arc<StepExecutor<L>>,
    events: EventSink,
}

impl<L: CommandLauncher> JobRunner<L> {
    pub fn new(executor: Arc<StepExecutor<L>>, events: EventSink) -> Self {
        Self { executor, events }
    }

    /// Execute a job to a terminal status
    ///
    /// Fail-fast contract: the first failing step that is not marked
    /// continue-on-error halts the job with no further steps executed.
    /// Cancellation is polled between steps; once observed, no further
    /// StepResults are recorded and it overrides any failure determination.
    pub async fn run(&self, job: &Job, cancel: &CancelToken) -> JobReport {
        info!("Running job: {} ({} steps)", job.name, job.steps.len());

        let ambient: HashMap<String, String> = std::env::vars().collect();
        let mut results = Vec::new();

        for step in &job.steps {
            if cancel.is_cancelled() {
                info!("Job {} cancelled before step {}", job.name, step.name);
                return self.finish(job, RunStatus::Cancelled, results).await;
            }

            self.events
                .emit(ExecutionEvent::StepStarted {
                    job_name: job.name.clone(),
                    step_name: step.name.clone(),
                })
                .await;

            let env = compose_env(&ambient, &job.env, &step.env);
            let outcome = self
                .executor
                .execute(step, &env, &job.working_dir, cancel)
                .await;

            let result = match outcome {
                StepOutcome::Interrupted => {
                    return self.finish(job, RunStatus::Cancelled, results).await;
                }
                StepOutcome::Completed(result) => result,
            };

            let passed = result.passed();
            let exit_code = result.exit_code;
            self.events
                .emit(ExecutionEvent::StepFinished {
                    job_name: job.name.clone(),
                    step_name: step.name.clone(),
                    exit_code,
                    tolerated: !passed && step.continue_on_error,
                })
                .await;
            results.push(result);

            if !passed {
                if step.continue_on_error {
                    warn!(
                        "Step {} failed with exit code {} (tolerated)",
                        step.name, exit_code
                    );
                    continue;
                }

                // a cancellation that arrived during the step overrides the
                // failure determination
                let status = if cancel.is_cancelled() {
                    RunStatus::Cancelled
                } else {
                    error!("Step {} failed with exit code {}", step.name, exit_code);
                    RunStatus::Failed
                };
                return self.finish(job, status, results).await;
            }
        }

        let status = if cancel.is_cancelled() {
            RunStatus::Cancelled
        } else {
            RunStatus::Succeeded
        };
        self.finish(job, status, results).await
    }

    async fn finish(
        &self,
        job: &Job,
        status: RunStatus,
        results: Vec<crate::core::StepResult>,
    ) -> JobReport {
        info!("Job {} finished: {:?}", job.name, status);
        self.events
            .emit(ExecutionEvent::JobFinished {
                job_name: job.name.clone(),
                status,
            })
            .await;
        JobReport {
            job_name: job.name.clone(),
            status,
            results,
        }
    }
}
