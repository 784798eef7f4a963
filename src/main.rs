use anyhow::{Context, Result};
use gantry::cli::commands::{RunCommand, ValidateCommand};
use gantry::cli::output::{self, style, CHECK, CROSS, INFO};
use gantry::cli::{Cli, Command};
use gantry::{
    ConcurrencyController, ExecutionEvent, PipelineConfig, PipelineOrchestrator, ShellLauncher,
    TriggerEvent, TriggerGate,
};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match &cli.command {
        Command::Run(cmd) => run_pipeline(cmd).await?,
        Command::Validate(cmd) => validate_pipeline(cmd)?,
    }

    Ok(())
}

async fn run_pipeline(cmd: &RunCommand) -> Result<()> {
    // Load pipeline definition
    let mut config =
        PipelineConfig::from_file(&cmd.file).context("Failed to load pipeline definition")?;

    println!("{} Loaded pipeline: {}", INFO, style(&config.name).bold());

    // Apply environment overrides
    for (key, value) in &cmd.env {
        config.env.insert(key.clone(), value.clone());
        println!(
            "{} Environment override: {} = {}",
            INFO,
            style(key).cyan(),
            style(value).dim()
        );
    }

    let pipeline = config.to_pipeline();
    let step_count = pipeline.step_count();

    let gate = TriggerGate::from_config(&config);
    let controller = Arc::new(ConcurrencyController::new(config.concurrency.clone()));
    let orchestrator = PipelineOrchestrator::new(pipeline, gate, controller, ShellLauncher);

    // Live console rendering of execution events
    let progress = output::create_progress_bar(step_count);
    let progress_handle = progress.clone();
    orchestrator
        .events()
        .subscribe(move |event| {
            match &event {
                ExecutionEvent::StepStarted { step_name, .. } => {
                    progress_handle.set_message(step_name.clone());
                }
                ExecutionEvent::StepFinished { .. } => {
                    progress_handle.inc(1);
                }
                _ => {}
            }
            progress_handle.println(output::format_execution_event(&event));
        })
        .await;

    // Handle the trigger event
    let event = TriggerEvent::new(&cmd.repository, &cmd.event, cmd.git_ref.as_deref());
    println!();
    let result = orchestrator.handle(event).await;
    progress.finish_and_clear();

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        output::print_result_summary(&result);
    }

    // Succeeded -> 0, Failed -> 1, Cancelled -> 2, Denied -> 0
    let code = result.status.exit_code();
    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}

fn validate_pipeline(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating pipeline...", INFO);

    match PipelineConfig::from_file(&cmd.file) {
        Ok(config) => {
            println!("{} Pipeline definition is valid!", CHECK);
            println!("  Name: {}", style(&config.name).bold());
            println!("  Jobs: {}", style(config.jobs.len()).cyan());
            let steps: usize = config.jobs.iter().map(|j| j.steps.len()).sum();
            println!("  Steps: {}", style(steps).cyan());

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(e).red());
            std::process::exit(1);
        }
    }
}
