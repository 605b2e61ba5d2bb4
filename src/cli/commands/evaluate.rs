//! Evaluate command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{EvaluateArgs, OutputFormat};
use crate::eval::{EpochAggregator, EpochMetrics, LocalGather};
use crate::train::{Phase, StepRecord};
use crate::Error;
use std::path::Path;

/// Read a JSON array of step records
pub fn read_records(path: &Path) -> crate::Result<Vec<StepRecord>> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok(serde_json::from_str(&content)?)
}

/// Run one epoch of records through the aggregator
pub fn evaluate_records(phase: Phase, records: Vec<StepRecord>) -> crate::Result<EpochMetrics> {
    let mut aggregator = EpochAggregator::new();
    for record in records {
        aggregator.push_record(record)?;
    }
    aggregator.finish(phase, &LocalGather)
}

pub fn format_metrics(metrics: &EpochMetrics, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Text => Ok(metrics.to_string()),
        OutputFormat::Json => serde_json::to_string_pretty(metrics)
            .map_err(|e| format!("Failed to serialize metrics: {e}")),
    }
}

pub fn run_evaluate(args: EvaluateArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Normal,
        &format!("Evaluating records: {}", args.records.display()),
    );

    let records = read_records(&args.records).map_err(|e| e.to_string())?;
    log(level, LogLevel::Verbose, &format!("  {} step records", records.len()));

    let metrics =
        evaluate_records(args.phase, records).map_err(|e| format!("Evaluation failed: {e}"))?;

    // the report itself is always printed, even with --quiet
    println!("{}", format_metrics(&metrics, args.format)?);
    Ok(())
}
