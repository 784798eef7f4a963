//! Step executor - runs one step as an external shell command

use crate::core::{Step, StepResult};
use crate::execution::cancel::CancelToken;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, error, info};

/// Errors from launching an external command
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// The command could not be launched at all
    #[error("failed to launch command: {0}")]
    Launch(#[from] std::io::Error),

    /// The command outlived its per-step timeout
    #[error("timed out after {0} seconds")]
    Timeout(u64),
}

/// Raw outcome of one external command
#[derive(Debug, Clone)]
pub struct ExecOutput {
    /// Exit status (0 = success)
    pub exit_code: i32,

    /// Combined captured stdout and stderr
    pub output: String,
}

/// Abstraction over launching external commands
///
/// The orchestration core never inspects command semantics; this is its only
/// seam to the outside world, which also makes it mockable in tests.
#[async_trait]
pub trait CommandLauncher: Send + Sync {
    async fn launch(
        &self,
        script: &str,
        strict: bool,
        env: &HashMap<String, String>,
        working_dir: &Path,
        timeout_secs: u64,
    ) -> Result<ExecOutput, ExecutorError>;
}

/// Launches scripts through bash
///
/// Strict mode runs the script under `-e -o pipefail`, so a failure anywhere
/// inside a multi-command script (including the left side of a pipe) becomes
/// the step's own failure instead of being swallowed by the last command.
#[derive(Debug, Clone, Default)]
pub struct ShellLauncher;

#[async_trait]
impl CommandLauncher for ShellLauncher {
    async fn launch(
        &self,
        script: &str,
        strict: bool,
        env: &HashMap<String, String>,
        working_dir: &Path,
        timeout_secs: u64,
    ) -> Result<ExecOutput, ExecutorError> {
        debug!("Launching script ({} bytes, strict={})", script.len(), strict);

        let mut cmd = Command::new("bash");
        if strict {
            cmd.arg("-e").arg("-o").arg("pipefail");
        }
        cmd.arg("-c")
            .arg(script)
            .env_clear()
            .envs(env)
            .current_dir(working_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn()?;

        let output = if timeout_secs > 0 {
            timeout(Duration::from_secs(timeout_secs), child.wait_with_output())
                .await
                .map_err(|_| ExecutorError::Timeout(timeout_secs))??
        } else {
            child.wait_with_output().await?
        };

        let exit_code = output.status.code().unwrap_or(-1);
        let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(ExecOutput {
            exit_code,
            output: combined,
        })
    }
}

/// Result of executing one step
#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// The command ran to completion (cleanly or not); faults and timeouts
    /// are folded into a failing result
    Completed(StepResult),

    /// Cancellation arrived mid-step; the child was killed and its partial
    /// result discarded
    Interrupted,
}

/// Executes a single step with a composed environment
pub struct StepExecutor<L> {
    launcher: L,
}

impl<L: CommandLauncher> StepExecutor<L> {
    pub fn new(launcher: L) -> Self {
        Self { launcher }
    }

    /// Execute a step and return its result
    ///
    /// A launch fault is reported as exit code -1 and a timeout as exit code
    /// 124, both indistinguishable from an ordinary failing step further up.
    pub async fn execute(
        &self,
        step: &Step,
        env: &HashMap<String, String>,
        working_dir: &Path,
        cancel: &CancelToken,
    ) -> StepOutcome {
        info!("Executing step: {}", step.name);
        let started_at = Utc::now();

        let launch = self.launcher.launch(
            &step.script,
            step.strict,
            env,
            working_dir,
            step.timeout_secs,
        );
        tokio::pin!(launch);

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                // dropping the launch future terminates the child
                info!("Step {} cancelled in flight, result discarded", step.name);
                return StepOutcome::Interrupted;
            }
            res = &mut launch => res,
        };

        let (exit_code, output) = match result {
            Ok(out) => (out.exit_code, out.output),
            Err(ExecutorError::Timeout(secs)) => {
                error!("Timeout for step {} after {}s", step.name, secs);
                (124, format!("timed out after {} seconds", secs))
            }
            Err(e) => {
                error!("Launch fault for step {}: {}", step.name, e);
                (-1, e.to_string())
            }
        };

        StepOutcome::Completed(StepResult {
            step_name: step.name.clone(),
            exit_code,
            output,
            started_at,
            finished_at: Utc::now(),
        })
    }
}
