//! Trigger gate - admission predicate over trigger events

use crate::core::config::PipelineConfig;
use crate::core::TriggerEvent;
use regex::Regex;
use tracing::warn;

/// Pattern a ref is matched against
#[derive(Debug, Clone)]
enum RefPattern {
    /// Exact string comparison
    Exact(String),
    /// Regular expression match
    Regex(Regex),
}

impl RefPattern {
    fn matches(&self, git_ref: &str) -> bool {
        match self {
            RefPattern::Exact(p) => p == git_ref,
            RefPattern::Regex(re) => re.is_match(git_ref),
        }
    }
}

/// Decides whether a trigger event may run the pipeline at all
///
/// A configured predicate over event fields; keeps privileged or
/// resource-consuming jobs from running on forks and mirrors. Pure: no side
/// effects and no failure mode beyond returning false.
#[derive(Debug, Clone)]
pub struct TriggerGate {
    repository: Option<String>,
    events: Vec<String>,
    ref_pattern: Option<RefPattern>,
}

impl TriggerGate {
    /// Build the gate from a pipeline definition
    pub fn from_config(config: &PipelineConfig) -> Self {
        let ref_pattern = config.ref_pattern.as_ref().map(|pattern| {
            if config.use_regex {
                match Regex::new(pattern) {
                    Ok(re) => RefPattern::Regex(re),
                    Err(e) => {
                        warn!(
                            "Invalid ref_pattern regex '{}' ({}), matching literally",
                            pattern, e
                        );
                        RefPattern::Exact(pattern.clone())
                    }
                }
            } else {
                RefPattern::Exact(pattern.clone())
            }
        });

        Self {
            repository: config.repository.clone(),
            events: config.events.clone(),
            ref_pattern,
        }
    }

    /// Evaluate the admission predicate
    pub fn admit(&self, event: &TriggerEvent) -> bool {
        if let Some(repository) = &self.repository {
            if repository != &event.repository {
                return false;
            }
        }

        if !self.events.is_empty() && !self.events.iter().any(|e| e == &event.event) {
            return false;
        }

        if let Some(pattern) = &self.ref_pattern {
            match &event.git_ref {
                Some(git_ref) => {
                    if !pattern.matches(git_ref) {
                        return false;
                    }
                }
                // a ref requirement cannot be satisfied by a ref-less event
                None => return false,
            }
        }

        true
    }
}
