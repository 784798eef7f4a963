//! Pipeline definition loaded from YAML

use crate::core::job::{Job, Step, StepDefaults};
use crate::core::pipeline::Pipeline;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Top-level pipeline definition loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Pipeline name; also the base of the concurrency group key
    pub name: String,

    /// Canonical repository identifier; when set, events from any other
    /// repository are denied admission
    #[serde(default)]
    pub repository: Option<String>,

    /// Event kinds that may trigger this pipeline (empty = all)
    #[serde(default, rename = "on")]
    pub events: Vec<String>,

    /// Pattern the event's ref must match, when set
    #[serde(default)]
    pub ref_pattern: Option<String>,

    /// Whether ref_pattern is a regular expression
    #[serde(default)]
    pub use_regex: bool,

    /// Run deduplication settings
    #[serde(default)]
    pub concurrency: ConcurrencyConfig,

    /// Environment shared by every job (jobs and steps override it)
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Jobs to run
    pub jobs: Vec<JobConfig>,

    /// Default timeout for steps (in seconds)
    #[serde(default)]
    pub default_timeout_secs: Option<u64>,

    /// Default strict shell mode for steps
    #[serde(default)]
    pub strict: Option<bool>,
}

/// Concurrency group settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcurrencyConfig {
    /// Cancel a still-active run when a new one arrives for the same group
    #[serde(default = "default_cancel_in_progress")]
    pub cancel_in_progress: bool,

    /// Group key fallback for events that carry no ref
    #[serde(default)]
    pub fallback: GroupFallback,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            cancel_in_progress: true,
            fallback: GroupFallback::default(),
        }
    }
}

fn default_cancel_in_progress() -> bool {
    true
}

/// How to derive the group key when the event has no ref
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupFallback {
    /// Run-unique key: ref-less events never dedupe each other
    #[default]
    RunId,
    /// Collapse all ref-less events onto the pipeline name
    Pipeline,
}

/// Job as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Unique job name
    pub name: String,

    /// Job-level environment (steps override it)
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Working directory for the job's steps
    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    /// Steps, run strictly in this order
    pub steps: Vec<StepConfig>,
}

/// Step as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepConfig {
    /// Unique step name within the job
    pub name: String,

    /// Shell script to run
    pub run: String,

    /// Step-level environment overrides
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Record a failure without halting remaining steps
    #[serde(default)]
    pub continue_on_error: bool,

    /// Strict shell mode (overrides the pipeline default)
    #[serde(default)]
    pub strict: Option<bool>,

    /// Timeout for this step (overrides the pipeline default)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl PipelineConfig {
    /// Load a pipeline definition from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a pipeline definition from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the pipeline definition
    pub fn validate(&self) -> Result<()> {
        if self.jobs.is_empty() {
            anyhow::bail!("Pipeline '{}' has no jobs", self.name);
        }

        let mut seen_jobs = HashSet::new();
        for job in &self.jobs {
            if !seen_jobs.insert(&job.name) {
                anyhow::bail!("Duplicate job name: {}", job.name);
            }

            if job.steps.is_empty() {
                anyhow::bail!("Job '{}' has no steps", job.name);
            }

            let mut seen_steps = HashSet::new();
            for step in &job.steps {
                if !seen_steps.insert(&step.name) {
                    anyhow::bail!("Duplicate step name '{}' in job '{}'", step.name, job.name);
                }
                if step.run.trim().is_empty() {
                    anyhow::bail!(
                        "Step '{}' in job '{}' has an empty script",
                        step.name,
                        job.name
                    );
                }
            }
        }

        Ok(())
    }

    /// Build the runtime pipeline model
    pub fn to_pipeline(&self) -> Pipeline {
        let defaults = StepDefaults {
            timeout_secs: self.default_timeout_secs.unwrap_or(300),
            strict: self.strict.unwrap_or(true),
        };

        let jobs = self
            .jobs
            .iter()
            .map(|job| {
                // Pipeline-level env sits below job-level in precedence,
                // so fold it in underneath
                let mut env = self.env.clone();
                env.extend(job.env.iter().map(|(k, v)| (k.clone(), v.clone())));

                Job {
                    name: job.name.clone(),
                    env,
                    working_dir: job
                        .working_dir
                        .clone()
                        .unwrap_or_else(|| PathBuf::from(".")),
                    steps: job
                        .steps
                        .iter()
                        .map(|step| Step {
                            name: step.name.clone(),
                            script: step.run.clone(),
                            env: step.env.clone(),
                            continue_on_error: step.continue_on_error,
                            strict: step.strict.unwrap_or(defaults.strict),
                            timeout_secs: step.timeout_secs.unwrap_or(defaults.timeout_secs),
                        })
                        .collect(),
                }
            })
            .collect();

        Pipeline {
            name: self.name.clone(),
            jobs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = r#"
name: "sanitizer-ci"
repository: "acme/widget"
on: [push, pull_request]
env:
  CC: clang
jobs:
  - name: build_test
    env:
      ASAN_OPTIONS: "halt_on_error=1"
    steps:
      - name: build
        run: "python -m pip install ."
        timeout_secs: 600
      - name: test
        run: "python -m pytest"
        continue_on_error: true
"#;

    #[test]
    fn test_parse_basic_config() {
        let config = PipelineConfig::from_yaml(BASIC).unwrap();
        assert_eq!(config.name, "sanitizer-ci");
        assert_eq!(config.events, vec!["push", "pull_request"]);
        assert!(config.concurrency.cancel_in_progress);
        assert_eq!(config.jobs.len(), 1);
        assert_eq!(config.jobs[0].steps.len(), 2);
    }

    #[test]
    fn test_to_pipeline_applies_defaults_and_env_folding() {
        let config = PipelineConfig::from_yaml(BASIC).unwrap();
        let pipeline = config.to_pipeline();
        let job = &pipeline.jobs[0];

        // pipeline-level env folded underneath job env
        assert_eq!(job.env.get("CC"), Some(&"clang".to_string()));
        assert_eq!(
            job.env.get("ASAN_OPTIONS"),
            Some(&"halt_on_error=1".to_string())
        );

        assert_eq!(job.steps[0].timeout_secs, 600);
        assert_eq!(job.steps[1].timeout_secs, 300);
        assert!(job.steps[0].strict);
        assert!(job.steps[1].continue_on_error);
    }

    #[test]
    fn test_duplicate_step_names_rejected() {
        let yaml = r#"
name: "bad"
jobs:
  - name: build
    steps:
      - name: step
        run: "true"
      - name: step
        run: "true"
"#;
        assert!(PipelineConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_empty_jobs_rejected() {
        let yaml = r#"
name: "bad"
jobs: []
"#;
        assert!(PipelineConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_empty_script_rejected() {
        let yaml = r#"
name: "bad"
jobs:
  - name: build
    steps:
      - name: step
        run: "  "
"#;
        assert!(PipelineConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_group_fallback_parsing() {
        let yaml = r#"
name: "p"
concurrency:
  cancel_in_progress: false
  fallback: pipeline
jobs:
  - name: j
    steps:
      - name: s
        run: "true"
"#;
        let config = PipelineConfig::from_yaml(yaml).unwrap();
        assert!(!config.concurrency.cancel_in_progress);
        assert_eq!(config.concurrency.fallback, GroupFallback::Pipeline);
    }
}
