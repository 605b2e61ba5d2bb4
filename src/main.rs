//! veraz CLI
//!
//! # Usage
//!
//! ```bash
//! # Validate a detector config
//! veraz validate detector.yaml --detailed
//!
//! # Epoch metrics from recorded steps
//! veraz evaluate records.json --phase validate --format json
//! ```

use clap::Parser;
use std::process::ExitCode;
use veraz::cli::{init_logging, run_command, Cli, LogLevel};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(LogLevel::from_flags(cli.verbose, cli.quiet));

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
