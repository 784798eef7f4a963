//! CLI output formatting

use crate::core::{PipelineResult, PipelineStatus, RunStatus};
use crate::execution::ExecutionEvent;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a progress bar over the pipeline's declared steps
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Format a run (or job) status for display
pub fn format_run_status(status: RunStatus) -> String {
    match status {
        RunStatus::Pending => style("PENDING").dim().to_string(),
        RunStatus::Running => style("RUNNING").yellow().to_string(),
        RunStatus::Succeeded => style("SUCCEEDED").green().to_string(),
        RunStatus::Failed => style("FAILED").red().to_string(),
        RunStatus::Cancelled => style("CANCELLED").yellow().to_string(),
    }
}

/// Format a pipeline status for display
pub fn format_pipeline_status(status: PipelineStatus) -> String {
    match status {
        PipelineStatus::Denied => style("DENIED").dim().to_string(),
        PipelineStatus::Succeeded => style("SUCCEEDED").green().to_string(),
        PipelineStatus::Failed => style("FAILED").red().to_string(),
        PipelineStatus::Cancelled => style("CANCELLED").yellow().to_string(),
    }
}

/// Format an execution event for display
pub fn format_execution_event(event: &ExecutionEvent) -> String {
    match event {
        ExecutionEvent::RunStarted {
            run_id,
            pipeline_name,
        } => format!(
            "{} Starting pipeline {} ({})",
            ROCKET,
            style(pipeline_name).bold(),
            style(&run_id.to_string()[..8]).dim()
        ),
        ExecutionEvent::RunSuperseded {
            group_key,
            cancelled_run,
            replaced_by,
        } => format!(
            "{} Run {} superseded by {} in group {}",
            WARN,
            style(&cancelled_run.to_string()[..8]).dim(),
            style(&replaced_by.to_string()[..8]).dim(),
            style(group_key).cyan()
        ),
        ExecutionEvent::StepStarted {
            job_name,
            step_name,
        } => format!(
            "{} {}/{}",
            SPINNER,
            style(job_name).dim(),
            style(step_name).cyan()
        ),
        ExecutionEvent::StepFinished {
            job_name,
            step_name,
            exit_code,
            tolerated,
        } => {
            if *exit_code == 0 {
                format!(
                    "{} {}/{}",
                    CHECK,
                    style(job_name).dim(),
                    style(step_name).green()
                )
            } else if *tolerated {
                format!(
                    "{} {}/{} exited with {} (tolerated)",
                    WARN,
                    style(job_name).dim(),
                    style(step_name).yellow(),
                    exit_code
                )
            } else {
                format!(
                    "{} {}/{} exited with {}",
                    CROSS,
                    style(job_name).dim(),
                    style(step_name).red(),
                    exit_code
                )
            }
        }
        ExecutionEvent::JobFinished { job_name, status } => format!(
            "{} Job {} {}",
            INFO,
            style(job_name).bold(),
            format_run_status(*status)
        ),
        ExecutionEvent::RunFinished { run_id, status } => format!(
            "{} Run ({}) {}",
            INFO,
            style(&run_id.to_string()[..8]).dim(),
            format_run_status(*status)
        ),
    }
}

/// Print a final pipeline result summary
pub fn print_result_summary(result: &PipelineResult) {
    println!(
        "\n{} Pipeline {}",
        INFO,
        format_pipeline_status(result.status)
    );

    for job in &result.jobs {
        println!(
            "  {} {} ({} step results)",
            style(&job.job_name).bold(),
            format_run_status(job.status),
            job.results.len()
        );
        for step in &job.results {
            let icon = if step.passed() { CHECK } else { CROSS };
            println!(
                "    {} {} (exit {})",
                icon,
                style(&step.step_name).cyan(),
                step.exit_code
            );
            // surface the tail of a failing step's capture for diagnosis
            if !step.passed() && !step.output.trim().is_empty() {
                for line in format_output(&step.output, FAILURE_OUTPUT_LINES).lines() {
                    println!("      {}", style(line).dim());
                }
            }
        }
    }
}

/// How much of a failing step's capture the summary shows
const FAILURE_OUTPUT_LINES: usize = 10;

/// Truncate step output to its last `max_lines` lines
pub fn format_output(output: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = output.lines().collect();

    if lines.len() <= max_lines {
        output.to_string()
    } else {
        let skipped = lines.len() - max_lines;
        format!(
            "[{} earlier lines omitted]\n{}",
            skipped,
            lines[skipped..].join("\n")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_output_short() {
        assert_eq!(format_output("a\nb", 5), "a\nb");
    }

    #[test]
    fn test_format_output_keeps_the_tail() {
        let formatted = format_output("a\nb\nc\nd", 2);
        assert!(formatted.contains("2 earlier lines omitted"));
        assert!(formatted.contains("c\nd"));
        assert!(!formatted.contains("a\nb"));
    }
}
