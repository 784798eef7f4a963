//! Concurrency controller - at most one active run per group
//!
//! The group table is the only shared mutable state between runs; it is
//! guarded by a single mutex and mutated exclusively through this type.

use crate::core::config::{ConcurrencyConfig, GroupFallback};
use crate::core::TriggerEvent;
use crate::execution::cancel::CancelToken;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

/// Outcome of registering a run with its group
#[derive(Debug, Clone)]
pub struct Registration {
    /// Cancellation token for the accepted run; may already be tripped when
    /// the run was superseded back-to-back
    pub token: CancelToken,

    /// Run that lost the group to this registration, if any
    pub superseded: Option<Uuid>,
}

#[derive(Debug)]
struct ActiveRun {
    run_id: Uuid,
    token: CancelToken,
}

/// Assigns runs to named groups and cancels superseded duplicates
pub struct ConcurrencyController {
    config: ConcurrencyConfig,
    groups: Mutex<HashMap<String, ActiveRun>>,
}

impl ConcurrencyController {
    pub fn new(config: ConcurrencyConfig) -> Self {
        Self {
            config,
            groups: Mutex::new(HashMap::new()),
        }
    }

    /// Derive the group key for an event
    ///
    /// Pipeline name plus ref; events without a ref fall back per
    /// configuration (default run-unique, so they never dedupe each other).
    pub fn group_key(&self, pipeline_name: &str, event: &TriggerEvent) -> String {
        match (&event.git_ref, self.config.fallback) {
            (Some(git_ref), _) => format!("{}-{}", pipeline_name, git_ref),
            (None, GroupFallback::RunId) => format!("{}-{}", pipeline_name, event.run_id),
            (None, GroupFallback::Pipeline) => pipeline_name.to_string(),
        }
    }

    /// Atomically register a run as its group's active holder, cancelling a
    /// prior holder when configured to. Registering the same run id twice
    /// is a no-op returning the existing token.
    pub async fn register(&self, group_key: &str, run_id: Uuid) -> Registration {
        let mut groups = self.groups.lock().await;

        if let Some(active) = groups.get(group_key) {
            if active.run_id == run_id {
                debug!(group = group_key, run_id = %run_id, "Run already registered");
                return Registration {
                    token: active.token.clone(),
                    superseded: None,
                };
            }

            let old_id = active.run_id;
            if self.config.cancel_in_progress {
                info!(
                    group = group_key,
                    cancelled = %old_id,
                    replaced_by = %run_id,
                    "Cancelling superseded run"
                );
                active.token.cancel();
            }

            let token = CancelToken::new();
            groups.insert(
                group_key.to_string(),
                ActiveRun {
                    run_id,
                    token: token.clone(),
                },
            );
            return Registration {
                token,
                superseded: Some(old_id),
            };
        }

        let token = CancelToken::new();
        groups.insert(
            group_key.to_string(),
            ActiveRun {
                run_id,
                token: token.clone(),
            },
        );
        Registration {
            token,
            superseded: None,
        }
    }

    /// Drop the group entry, but only while the given run still holds it
    pub async fn release(&self, group_key: &str, run_id: Uuid) {
        let mut groups = self.groups.lock().await;
        if groups.get(group_key).map(|a| a.run_id) == Some(run_id) {
            groups.remove(group_key);
        }
    }

    /// Current active holder of a group, if any
    pub async fn active_run(&self, group_key: &str) -> Option<Uuid> {
        self.groups.lock().await.get(group_key).map(|a| a.run_id)
    }
}
