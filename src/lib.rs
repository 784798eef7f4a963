//! gantry - a minimal CI pipeline orchestration core

pub mod cli;
pub mod core;
pub mod execution;

// Re-export commonly used types
pub use crate::core::config::PipelineConfig;
pub use crate::core::{
    Job, JobReport, Pipeline, PipelineResult, PipelineStatus, Run, RunStatus, Step, StepResult,
    TriggerEvent,
};
pub use crate::execution::{
    CancelToken, CommandLauncher, ConcurrencyController, EventSink, ExecutionEvent, JobRunner,
    PipelineOrchestrator, ShellLauncher, StepExecutor, TriggerGate,
};
