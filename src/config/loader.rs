//! Configuration file loading

use super::{validate_config, DetectorConfig};
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Load and validate a detector configuration from a YAML file
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<DetectorConfig> {
    let path = config_path.as_ref();
    let yaml_content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

    let config: DetectorConfig = serde_yaml::from_str(&yaml_content)
        .map_err(|e| Error::ConfigError(format!("Failed to parse YAML config: {e}")))?;

    validate_config(&config)?;

    tracing::debug!(
        path = %path.display(),
        threshold_mode = config.fusion.threshold_mode,
        synchrony = config.training.synchrony,
        "loaded detector config"
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_yaml(yaml: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(yaml.as_bytes()).expect("write yaml");
        file
    }

    #[test]
    fn test_load_valid_config() {
        let file = write_yaml(
            r"
model:
  embed_dim: 16
  alpha: 10.0
fusion:
  threshold_mode: true
  audio_threshold: 0.4
  video_threshold: 0.6
  final_threshold: 0.5
training:
  batch_size: 4
  synchrony: true
",
        );

        let config = load_config(file.path()).expect("config should load");
        assert_eq!(config.model.embed_dim, 16);
        assert_eq!(config.model.r_real, 0.9);
        assert_eq!(config.fusion.video_threshold, Some(0.6));
        assert!(config.training.synchrony);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config("/nonexistent/detector.yaml").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_load_malformed_yaml() {
        let file = write_yaml("model: [unclosed");
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_load_rejects_incomplete_threshold_mode() {
        let file = write_yaml("fusion:\n  threshold_mode: true\n  audio_threshold: 0.5\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::MissingThreshold("video_threshold"))
        ));
    }
}
