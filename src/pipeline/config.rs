//! Pipeline configuration.

use crate::concurrency::WaitStrategy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Run-time knobs for a [`Pipeline`](super::Pipeline).
///
/// Every field has a default, so `{}` is a valid configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Name used in log events and as the worker thread name prefix.
    #[serde(default = "defaults::label")]
    pub label: String,
    /// How latches and the barrier wait.
    #[serde(default)]
    pub wait: WaitStrategy,
}

mod defaults {
    pub fn label() -> String {
        "pipeline".into()
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label: defaults::label(),
            wait: WaitStrategy::default(),
        }
    }
}

impl PipelineConfig {
    /// Parses a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("failed to parse pipeline config")
    }

    /// Reads and parses a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in '{}'", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        assert_eq!(PipelineConfig::from_json("{}").unwrap(), PipelineConfig::default());
    }

    #[test]
    fn test_fields_are_read() {
        let config = PipelineConfig::from_json(r#"{ "label": "cpu", "wait": "spin" }"#).unwrap();
        assert_eq!(config.label, "cpu");
        assert_eq!(config.wait, WaitStrategy::Spin);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = PipelineConfig::from_json(r#"{ "stages": 3 }"#).unwrap_err();
        assert!(format!("{err:#}").contains("stages"));
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = PipelineConfig::load("/nonexistent/lockstep.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/lockstep.json"));
    }
}
