//! Pipeline domain model

use crate::core::job::Job;

/// A pipeline: a named collection of jobs driven by one trigger event
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Pipeline name; also the base of the concurrency group key
    pub name: String,

    /// Jobs, run in declared order
    pub jobs: Vec<Job>,
}

impl Pipeline {
    /// Total number of declared steps across all jobs
    pub fn step_count(&self) -> usize {
        self.jobs.iter().map(|j| j.steps.len()).sum()
    }
}
