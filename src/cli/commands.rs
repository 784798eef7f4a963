//! CLI command definitions

use clap::Args;

/// Handle a trigger event against a pipeline definition
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: String,

    /// Repository the event originates from
    #[arg(long)]
    pub repository: String,

    /// Event kind (e.g. push, pull_request)
    #[arg(long)]
    pub event: String,

    /// Git ref the event points at
    #[arg(long = "ref")]
    pub git_ref: Option<String>,

    /// Extra pipeline-level environment (key=value)
    #[arg(long, value_parser = parse_key_value)]
    pub env: Vec<(String, String)>,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Validate a pipeline definition
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: String,

    /// Output the normalized definition as JSON
    #[arg(long)]
    pub json: bool,
}

/// Parse key=value pairs
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let parts: Vec<&str> = s.splitn(2, '=').collect();
    if parts.len() != 2 {
        return Err(format!("Invalid key=value pair: {}", s));
    }
    Ok((parts[0].to_string(), parts[1].to_string()))
}
