//! Pipeline configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{EvalError, Result};

/// What to do when the scorer fails for one model.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the run and keep the previous snapshot.
    #[default]
    Abort,

    /// Drop the failing model from the run and continue.
    Skip,
}

/// Settings fixed at pipeline construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of tasks drawn into the fixed batch. Must be at least 1.
    pub task_count: usize,

    /// Behaviour on a single model's scoring failure.
    pub failure_policy: FailurePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            task_count: 1,
            failure_policy: FailurePolicy::Abort,
        }
    }
}

impl PipelineConfig {
    pub fn with_task_count(mut self, task_count: usize) -> Self {
        self.task_count = task_count;
        self
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.task_count == 0 {
            return Err(EvalError::InvalidConfig(
                "task_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.task_count, 1);
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_task_count_rejected() {
        let err = PipelineConfig::default()
            .with_task_count(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, EvalError::InvalidConfig(_)));
    }

    #[test]
    fn test_from_toml_partial() {
        let config = PipelineConfig::from_toml_str("task_count = 4\n").expect("parse");
        assert_eq!(config.task_count, 4);
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
    }

    #[test]
    fn test_from_toml_skip_policy() {
        let config =
            PipelineConfig::from_toml_str("failure_policy = \"skip\"\n").expect("parse");
        assert_eq!(config.task_count, 1);
        assert_eq!(config.failure_policy, FailurePolicy::Skip);
    }

    #[test]
    fn test_from_toml_rejects_zero_and_garbage() {
        assert!(matches!(
            PipelineConfig::from_toml_str("task_count = 0\n"),
            Err(EvalError::InvalidConfig(_))
        ));
        assert!(matches!(
            PipelineConfig::from_toml_str("task_count = \"many\"\n"),
            Err(EvalError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("finetune.toml");
        std::fs::write(&path, "task_count = 2\nfailure_policy = \"skip\"\n").expect("write");

        let config = PipelineConfig::load(&path).expect("load");
        assert_eq!(
            config,
            PipelineConfig::default()
                .with_task_count(2)
                .with_failure_policy(FailurePolicy::Skip)
        );
    }
}
