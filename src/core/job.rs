//! Job and step domain models

use std::collections::HashMap;
use std::path::PathBuf;

/// A single step in a job
#[derive(Debug, Clone)]
pub struct Step {
    /// Step name (unique within its job)
    pub name: String,

    /// Shell script to run
    pub script: String,

    /// Environment overrides for this step only
    pub env: HashMap<String, String>,

    /// Record a failure without halting the remaining steps
    pub continue_on_error: bool,

    /// Strict shell mode: any failing command inside the script fails the
    /// step, including commands on the left side of a pipe
    pub strict: bool,

    /// Timeout in seconds; expiry is a hard failure
    pub timeout_secs: u64,
}

/// An ordered list of steps with a shared environment
#[derive(Debug, Clone)]
pub struct Job {
    /// Job name (unique within the pipeline)
    pub name: String,

    /// Environment shared by every step of this job
    pub env: HashMap<String, String>,

    /// Working directory for step execution
    pub working_dir: PathBuf,

    /// Steps, executed strictly in declared order
    pub steps: Vec<Step>,
}

/// Defaults applied to steps that don't override them
#[derive(Debug, Clone)]
pub struct StepDefaults {
    pub timeout_secs: u64,
    pub strict: bool,
}

impl Default for StepDefaults {
    fn default() -> Self {
        Self {
            timeout_secs: 300, // 5 minutes
            strict: true,
        }
    }
}

/// Merge the three environment layers with step > job > ambient precedence
pub fn compose_env(
    ambient: &HashMap<String, String>,
    job_env: &HashMap<String, String>,
    step_env: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut env = ambient.clone();
    env.extend(job_env.iter().map(|(k, v)| (k.clone(), v.clone())));
    env.extend(step_env.iter().map(|(k, v)| (k.clone(), v.clone())));
    env
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_step_env_overrides_job_env() {
        let ambient = map(&[("PATH", "/usr/bin"), ("CC", "cc")]);
        let job = map(&[("CC", "gcc"), ("CFLAGS", "-O2")]);
        let step = map(&[("CC", "clang")]);

        let env = compose_env(&ambient, &job, &step);
        assert_eq!(env.get("CC"), Some(&"clang".to_string()));
        assert_eq!(env.get("CFLAGS"), Some(&"-O2".to_string()));
        assert_eq!(env.get("PATH"), Some(&"/usr/bin".to_string()));
    }

    #[test]
    fn test_job_env_overrides_ambient() {
        let ambient = map(&[("LANG", "C")]);
        let job = map(&[("LANG", "en_US.UTF-8")]);
        let step = map(&[]);

        let env = compose_env(&ambient, &job, &step);
        assert_eq!(env.get("LANG"), Some(&"en_US.UTF-8".to_string()));
    }

    #[test]
    fn test_empty_layers_keep_ambient() {
        let ambient = map(&[("HOME", "/root")]);
        let env = compose_env(&ambient, &map(&[]), &map(&[]));
        assert_eq!(env, ambient);
    }
}
