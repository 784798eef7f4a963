//! Trigger event ingress model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A code-change event delivered by an external event source
///
/// Immutable once created; everything the orchestrator decides (admission,
/// concurrency grouping) derives from these fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerEvent {
    /// Repository identifier (e.g. "acme/widget")
    pub repository: String,

    /// Event kind (e.g. "push", "pull_request")
    pub event: String,

    /// Git reference the event points at, when the event carries one
    #[serde(default)]
    pub git_ref: Option<String>,

    /// Unique identifier for this delivery
    pub run_id: Uuid,
}

impl TriggerEvent {
    pub fn new(repository: &str, event: &str, git_ref: Option<&str>) -> Self {
        Self {
            repository: repository.to_string(),
            event: event.to_string(),
            git_ref: git_ref.map(|r| r.to_string()),
            run_id: Uuid::new_v4(),
        }
    }

    /// Short human-readable description for logs
    pub fn describe(&self) -> String {
        match &self.git_ref {
            Some(r) => format!("{} {} @ {}", self.repository, self.event, r),
            None => format!("{} {}", self.repository, self.event),
        }
    }
}
