//! Events emitted during pipeline execution

use crate::core::RunStatus;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Observable milestones of a pipeline run
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted {
        run_id: Uuid,
        pipeline_name: String,
    },
    RunSuperseded {
        group_key: String,
        cancelled_run: Uuid,
        replaced_by: Uuid,
    },
    StepStarted {
        job_name: String,
        step_name: String,
    },
    StepFinished {
        job_name: String,
        step_name: String,
        exit_code: i32,
        tolerated: bool,
    },
    JobFinished {
        job_name: String,
        status: RunStatus,
    },
    RunFinished {
        run_id: Uuid,
        status: RunStatus,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(ExecutionEvent) + Send + Sync>;

/// Fan-out of execution events to registered handlers
#[derive(Clone, Default)]
pub struct EventSink {
    handlers: Arc<Mutex<Vec<EventHandler>>>,
}

impl EventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for all future events
    pub async fn subscribe<F>(&self, handler: F)
    where
        F: Fn(ExecutionEvent) + Send + Sync + 'static,
    {
        self.handlers.lock().await.push(Arc::new(handler));
    }

    /// Deliver an event to every handler
    pub async fn emit(&self, event: ExecutionEvent) {
        let handlers = self.handlers.lock().await;
        for handler in handlers.iter() {
            handler(event.clone());
        }
    }
}
