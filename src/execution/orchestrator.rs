//! Pipeline orchestrator - top-level coordination of one trigger event

use crate::core::{
    aggregate_status, Pipeline, PipelineResult, Run, RunStatus, TriggerEvent,
};
use crate::execution::concurrency::ConcurrencyController;
use crate::execution::events::{EventSink, ExecutionEvent};
use crate::execution::executor::{CommandLauncher, StepExecutor};
use crate::execution::gate::TriggerGate;
use crate::execution::runner::JobRunner;
use std::sync::Arc;
use tracing::{debug, info};

/// Coordinates gate, concurrency group and job runners for one pipeline
pub struct PipelineOrchestrator<L> {
    pipeline: Pipeline,
    gate: TriggerGate,
    controller: Arc<ConcurrencyController>,
    runner: JobRunner<L>,
    events: EventSink,
}

impl<L: CommandLauncher> PipelineOrchestrator<L> {
    pub fn new(
        pipeline: Pipeline,
        gate: TriggerGate,
        controller: Arc<ConcurrencyController>,
        launcher: L,
    ) -> Self {
        let events = EventSink::new();
        let executor = Arc::new(StepExecutor::new(launcher));
        let runner = JobRunner::new(executor, events.clone());
        Self {
            pipeline,
            gate,
            controller,
            runner,
            events,
        }
    }

    /// Execution event fan-out, for live rendering or test observation
    pub fn events(&self) -> &EventSink {
        &self.events
    }

    /// Drive one trigger event to a final pipeline result
    pub async fn handle(&self, event: TriggerEvent) -> PipelineResult {
        if !self.gate.admit(&event) {
            debug!(event = %event.describe(), "Trigger denied admission");
            return PipelineResult::denied();
        }

        let group_key = self.controller.group_key(&self.pipeline.name, &event);
        info!(event = %event.describe(), group = %group_key, "Trigger admitted");

        let mut run = Run::new(event, group_key);
        let registration = self.controller.register(&run.group_key, run.id).await;

        if let Some(old) = registration.superseded {
            self.events
                .emit(ExecutionEvent::RunSuperseded {
                    group_key: run.group_key.clone(),
                    cancelled_run: old,
                    replaced_by: run.id,
                })
                .await;
        }

        // back-to-back events for the same group can cancel this run before
        // its first step ever launches
        if registration.token.is_cancelled() {
            info!(run_id = %run.id, "Run superseded before start");
            run.transition(RunStatus::Cancelled);
            self.controller.release(&run.group_key, run.id).await;
            self.events
                .emit(ExecutionEvent::RunFinished {
                    run_id: run.id,
                    status: RunStatus::Cancelled,
                })
                .await;
            return PipelineResult::from_run(&run);
        }

        run.transition(RunStatus::Running);
        self.events
            .emit(ExecutionEvent::RunStarted {
                run_id: run.id,
                pipeline_name: self.pipeline.name.clone(),
            })
            .await;

        for job in &self.pipeline.jobs {
            let report = self.runner.run(job, &registration.token).await;
            let halted = report.status != RunStatus::Succeeded;
            run.record_job(report);
            if halted {
                // short-circuit the remaining jobs
                break;
            }
        }

        let status = aggregate_status(run.jobs());
        run.transition(status);
        self.controller.release(&run.group_key, run.id).await;

        info!(
            run_id = %run.id,
            event = %run.event.describe(),
            status = ?status,
            "Pipeline run finished"
        );
        self.events
            .emit(ExecutionEvent::RunFinished {
                run_id: run.id,
                status,
            })
            .await;

        PipelineResult::from_run(&run)
    }
}
