//! Validate command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_config, DetectorConfig, ValidateArgs};
use crate::fusion::{FusionMode, Thresholds};

/// Format scorer geometry as a string
pub fn format_model_info(config: &DetectorConfig) -> String {
    let model = &config.model;
    format!(
        "  Embedding dim: {}\n  Alpha: {}\n  Margins: r_real={} r_fake={}\n  Seed: {}",
        model.embed_dim, model.alpha, model.r_real, model.r_fake, model.seed
    )
}

/// Format the fusion policy as a string
pub fn format_fusion_info(config: &DetectorConfig) -> String {
    let mode = FusionMode::from_spec(&config.fusion);
    let mut lines = vec![format!("  Fusion: {mode:?}")];
    if let Ok(t) = Thresholds::from_spec(&config.fusion) {
        if mode == FusionMode::Threshold {
            lines.push(format!(
                "  Thresholds: video={} audio={} final={}",
                t.video, t.audio, t.decision
            ));
        }
    }
    lines.join("\n")
}

/// Format optimisation settings as a string
pub fn format_training_info(config: &DetectorConfig) -> String {
    let training = &config.training;
    format!(
        "  Learning rate: {}\n  Weight decay: {}\n  Batch size: {}\n  Synchrony loss: {}",
        training.learning_rate, training.weight_decay, training.batch_size, training.synchrony
    )
}

/// Print detailed configuration summary
pub fn print_detailed_summary(config: &DetectorConfig) {
    println!();
    println!("Configuration Summary:");
    println!("{}", format_model_info(config));
    println!();
    println!("{}", format_fusion_info(config));
    println!();
    println!("{}", format_training_info(config));
}

pub fn run_validate(args: ValidateArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Normal,
        &format!("Validating config: {}", args.config.display()),
    );

    let config = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;

    log(level, LogLevel::Normal, "Configuration is valid");

    if args.detailed {
        print_detailed_summary(&config);
    }

    Ok(())
}
