//! Command-line argument types

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// veraz: audio-visual authenticity scoring and evaluation
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "veraz")]
#[command(version)]
#[command(about = "Audio-visual authenticity scoring, fusion, and EER evaluation")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Validate a detector configuration file
    Validate(ValidateArgs),

    /// Compute epoch metrics from a file of step records
    Evaluate(EvaluateArgs),
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Print the resolved configuration
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for the evaluate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct EvaluateArgs {
    /// JSON file holding an array of step records
    #[arg(value_name = "RECORDS")]
    pub records: PathBuf,

    /// Phase the records were produced in (validate, test)
    #[arg(short, long, default_value = "test")]
    pub phase: crate::train::Phase,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {s}. Valid formats: text, json")),
        }
    }
}

/// Parse CLI arguments from a string slice (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::train::Phase;

    #[test]
    fn test_parse_validate() {
        let cli = parse_args(["veraz", "validate", "detector.yaml", "--detailed"]).expect("parse");
        match cli.command {
            Command::Validate(args) => {
                assert_eq!(args.config, PathBuf::from("detector.yaml"));
                assert!(args.detailed);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_evaluate_defaults() {
        let cli = parse_args(["veraz", "evaluate", "records.json"]).expect("parse");
        match cli.command {
            Command::Evaluate(args) => {
                assert_eq!(args.phase, Phase::Test);
                assert_eq!(args.format, OutputFormat::Text);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_evaluate_options_and_global_flags() {
        let cli = parse_args([
            "veraz", "-v", "evaluate", "records.json", "--phase", "validate", "--format", "JSON",
        ])
        .expect("parse");
        assert!(cli.verbose);
        match cli.command {
            Command::Evaluate(args) => {
                assert_eq!(args.phase, Phase::Validate);
                assert_eq!(args.format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_format() {
        assert!(parse_args(["veraz", "evaluate", "r.json", "--format", "yaml"]).is_err());
    }
}
