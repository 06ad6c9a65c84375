//! Run configuration: YAML model list and estimator selection.
//!
//! The config file is a small YAML document:
//!
//! ```yaml
//! models:
//!   - resnet18
//!   - vit_base_patch16_224
//! estimator: hook   # or "trace"; optional, defaults to hook
//! ```

use crate::errors::FlopscopeError;
use crate::profiling::EstimatorKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default synthetic input shape, as a CLI string: (batch, channels, height, width).
pub const DEFAULT_INPUT_SHAPE: &str = "1,3,224,224";

/// Parsed run configuration. Read-only, loaded once per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    /// Model identifiers, analyzed in this order.
    #[serde(default)]
    pub models: Vec<String>,
    /// Which compute-cost estimator to use. Defaults to hook.
    #[serde(default)]
    pub estimator: EstimatorKind,
}

/// Load a [Configuration] from a YAML file. Malformed or missing files are fatal.
pub fn load_config(path: &Path) -> Result<Configuration, FlopscopeError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| FlopscopeError::ConfigParse(format!("{}: {}", path.display(), e)))?;
    serde_yaml::from_str(&content)
        .map_err(|e| FlopscopeError::ConfigParse(format!("{}: {}", path.display(), e)))
}

/// Parse a comma-separated input shape like "1,3,224,224" into (N, C, H, W).
pub fn parse_input_shape(s: &str) -> Result<Vec<usize>, FlopscopeError> {
    let dims: Result<Vec<usize>, _> = s.split(',').map(|d| d.trim().parse::<usize>()).collect();
    let dims =
        dims.map_err(|e| FlopscopeError::InvalidInput(format!("input shape '{}': {}", s, e)))?;
    if dims.len() != 4 || dims.contains(&0) {
        return Err(FlopscopeError::InvalidInput(format!(
            "input shape '{}': expected 4 positive comma-separated integers (N,C,H,W)",
            s
        )));
    }
    Ok(dims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn load_config_parses_models_in_order() {
        let path = write_temp(
            "flopscope_config_order.yaml",
            "models:\n  - resnet18\n  - vgg16\n  - vit_tiny_patch16_224\n",
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.models, vec!["resnet18", "vgg16", "vit_tiny_patch16_224"]);
        assert_eq!(config.estimator, EstimatorKind::Hook);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_config_estimator_trace() {
        let path = write_temp(
            "flopscope_config_trace.yaml",
            "models: [resnet18]\nestimator: trace\n",
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.estimator, EstimatorKind::Trace);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_config_missing_models_is_empty() {
        let path = write_temp("flopscope_config_empty.yaml", "estimator: hook\n");
        let config = load_config(&path).unwrap();
        assert!(config.models.is_empty());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_config_malformed_fails() {
        let path = write_temp("flopscope_config_bad.yaml", "models: [unclosed\n");
        assert!(matches!(
            load_config(&path),
            Err(FlopscopeError::ConfigParse(_))
        ));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_config_missing_file_fails() {
        let r = load_config(Path::new("/nonexistent/flopscope.yaml"));
        assert!(matches!(r, Err(FlopscopeError::ConfigParse(_))));
    }

    #[test]
    fn parse_input_shape_default() {
        assert_eq!(parse_input_shape(DEFAULT_INPUT_SHAPE).unwrap(), vec![1, 3, 224, 224]);
    }

    #[test]
    fn parse_input_shape_rejects_bad_values() {
        assert!(parse_input_shape("1,3,224").is_err());
        assert!(parse_input_shape("1,3,224,abc").is_err());
        assert!(parse_input_shape("1,0,224,224").is_err());
    }
}
