//! Pipeline execution engine

pub mod cancel;
pub mod concurrency;
pub mod events;
pub mod executor;
pub mod gate;
pub mod orchestrator;
pub mod runner;

pub use cancel::CancelToken;
pub use concurrency::{ConcurrencyController, Registration};
pub use events::{EventSink, ExecutionEvent};
pub use executor::{CommandLauncher, ShellLauncher, StepExecutor, StepOutcome};
pub use gate::TriggerGate;
pub use orchestrator::PipelineOrchestrator;
pub use runner::JobRunner;
