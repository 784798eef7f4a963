//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{RunCommand, ValidateCommand};
use std::ffi::OsString;

/// Minimal CI pipeline orchestration core
#[derive(Debug, Parser, Clone)]
#[command(name = "gantry")]
#[command(author = "Gantry Contributors")]
#[command(version = "0.1.0")]
#[command(about = "A minimal CI pipeline orchestration core", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Handle a trigger event against a pipeline definition
    Run(RunCommand),

    /// Validate a pipeline definition
    Validate(ValidateCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_command() {
        let cli = Cli::try_parse_from([
            "gantry",
            "run",
            "--file",
            "ci.yml",
            "--repository",
            "acme/widget",
            "--event",
            "push",
            "--ref",
            "refs/heads/main",
        ])
        .unwrap();

        match cli.command {
            Command::Run(cmd) => {
                assert_eq!(cmd.file, "ci.yml");
                assert_eq!(cmd.repository, "acme/widget");
                assert_eq!(cmd.event, "push");
                assert_eq!(cmd.git_ref.as_deref(), Some("refs/heads/main"));
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_parse_validate_command() {
        let cli = Cli::try_parse_from(["gantry", "validate", "--file", "ci.yml", "--json"]).unwrap();
        match cli.command {
            Command::Validate(cmd) => {
                assert_eq!(cmd.file, "ci.yml");
                assert!(cmd.json);
            }
            _ => panic!("expected validate command"),
        }
    }
}
