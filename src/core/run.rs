//! Run state machine and result models

use crate::core::event::TriggerEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// Status of a run (or of one job within it)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Run has been created but not started
    Pending,
    /// Run is currently executing
    Running,
    /// Run was superseded or externally cancelled
    Cancelled,
    /// Every step completed without an unrecoverable failure
    Succeeded,
    /// A non-tolerated step failed
    Failed,
}

impl RunStatus {
    /// Check if this status is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Cancelled | RunStatus::Succeeded | RunStatus::Failed
        )
    }
}

/// Outcome of one executed step, immutable once recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    /// Name of the step this result belongs to
    pub step_name: String,

    /// Exit status of the underlying command (0 = success)
    pub exit_code: i32,

    /// Combined captured stdout and stderr
    pub output: String,

    /// When execution started
    pub started_at: DateTime<Utc>,

    /// When execution finished
    pub finished_at: DateTime<Utc>,
}

impl StepResult {
    /// Whether the step exited cleanly
    pub fn passed(&self) -> bool {
        self.exit_code == 0
    }
}

/// Result of running one job to completion (or cancellation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    /// Job name
    pub job_name: String,

    /// Terminal status of the job
    pub status: RunStatus,

    /// Step results in execution order; always a prefix of the job's
    /// declared step list
    pub results: Vec<StepResult>,
}

/// One execution instance of a pipeline, created per trigger event
#[derive(Debug, Clone)]
pub struct Run {
    /// Unique run identifier (taken from the trigger event)
    pub id: Uuid,

    /// The event that created this run
    pub event: TriggerEvent,

    /// Concurrency group this run was registered under
    pub group_key: String,

    status: RunStatus,
    jobs: Vec<JobReport>,
}

impl Run {
    pub fn new(event: TriggerEvent, group_key: String) -> Self {
        Self {
            id: event.run_id,
            event,
            group_key,
            status: RunStatus::Pending,
            jobs: Vec::new(),
        }
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn jobs(&self) -> &[JobReport] {
        &self.jobs
    }

    /// Append a completed job report
    pub fn record_job(&mut self, report: JobReport) {
        self.jobs.push(report);
    }

    /// Advance the run status; transitions are forward-only and a terminal
    /// state is never re-entered. Returns whether the transition was taken.
    pub fn transition(&mut self, to: RunStatus) -> bool {
        let allowed = match (self.status, to) {
            (RunStatus::Pending, RunStatus::Running) => true,
            (RunStatus::Pending, RunStatus::Cancelled) => true,
            (RunStatus::Running, s) if s.is_terminal() => true,
            _ => false,
        };

        if allowed {
            self.status = to;
        } else {
            warn!(
                run_id = %self.id,
                from = ?self.status,
                to = ?to,
                "Refusing invalid run status transition"
            );
        }
        allowed
    }
}

/// Final status of a pipeline invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStatus {
    /// The trigger gate rejected the event; a no-op outcome, not an error
    Denied,
    Succeeded,
    Failed,
    Cancelled,
}

impl PipelineStatus {
    /// Process exit code mapping for CLI embeddings
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineStatus::Denied | PipelineStatus::Succeeded => 0,
            PipelineStatus::Failed => 1,
            PipelineStatus::Cancelled => 2,
        }
    }
}

/// Aggregated outcome of one pipeline invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Run id, absent when the event never passed admission
    pub run_id: Option<Uuid>,

    /// Overall status
    pub status: PipelineStatus,

    /// Per-job step logs
    pub jobs: Vec<JobReport>,
}

impl PipelineResult {
    /// Result for an event the gate rejected
    pub fn denied() -> Self {
        Self {
            run_id: None,
            status: PipelineStatus::Denied,
            jobs: Vec::new(),
        }
    }

    /// Snapshot a finished run into a result
    pub fn from_run(run: &Run) -> Self {
        let status = match run.status() {
            RunStatus::Succeeded => PipelineStatus::Succeeded,
            RunStatus::Failed => PipelineStatus::Failed,
            RunStatus::Cancelled => PipelineStatus::Cancelled,
            // A run that never reached a terminal state counts as failed
            RunStatus::Pending | RunStatus::Running => PipelineStatus::Failed,
        };
        Self {
            run_id: Some(run.id),
            status,
            jobs: run.jobs().to_vec(),
        }
    }
}

/// Fold per-job statuses into one run status.
///
/// Cancelled dominates Failed dominates Succeeded when mixed.
pub fn aggregate_status(jobs: &[JobReport]) -> RunStatus {
    if jobs.iter().any(|j| j.status == RunStatus::Cancelled) {
        RunStatus::Cancelled
    } else if jobs.iter().any(|j| j.status == RunStatus::Failed) {
        RunStatus::Failed
    } else {
        RunStatus::Succeeded
    }
}
