//! Configuration management for the orchestrator
//!
//! This module handles loading, validation, and management of all
//! orchestrator configuration. Configuration errors surface at startup
//! only and abort the process.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{OrchestratorError, Result};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct for the orchestrator core
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data-plane connection
    pub redis: RedisConfig,
    /// Active model queues
    pub models: ModelSetConfig,
    /// Queue dispatcher settings
    pub queue: QueueConfig,
    /// Agent coordination settings
    pub coordination: CoordinationConfig,
    /// DLQ manager settings
    pub dlq: DlqConfig,
    /// API-key rotation settings
    pub rotation: RotationConfig,
    /// Orchestrator loop settings
    pub orchestrator: LoopConfig,
}

impl Config {
    /// Load configuration from a YAML file, then apply environment
    /// overrides
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| OrchestratorError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config: Config = serde_yaml::from_str(&content)
            .map_err(|e| OrchestratorError::Config(format!("Failed to parse config: {}", e)))?;

        config.apply_env_overrides();
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Build a default configuration with environment overrides applied
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment");

        let mut config = Config::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Environment overrides: `SWARMQ_REDIS_URL` wins over the file
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("SWARMQ_REDIS_URL") {
            self.redis.url = url;
        }
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.redis
            .validate()
            .map_err(|e| OrchestratorError::Config(format!("Redis config error: {}", e)))?;
        self.queue
            .validate()
            .map_err(|e| OrchestratorError::Config(format!("Queue config error: {}", e)))?;
        self.coordination
            .validate()
            .map_err(|e| OrchestratorError::Config(format!("Coordination config error: {}", e)))?;
        self.dlq
            .validate()
            .map_err(|e| OrchestratorError::Config(format!("DLQ config error: {}", e)))?;
        self.rotation
            .validate()
            .map_err(|e| OrchestratorError::Config(format!("Rotation config error: {}", e)))?;
        self.orchestrator
            .validate()
            .map_err(|e| OrchestratorError::Config(format!("Loop config error: {}", e)))?;

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| OrchestratorError::Config(format!("Failed to serialize config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ModelId;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_config_from_file() {
        let config_content = r#"
redis:
  url: "redis://127.0.0.1:6379"

models: [gpt-4o, claude-3-opus]

dlq:
  process_interval_secs: 15
  batch_size: 20

rotation:
  strategy: round_robin
  pools:
    gpt-4o:
      keys: ["sk-test-1", "sk-test-2"]
      rpm: 60
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();

        let config = Config::from_file(temp_file.path()).await.unwrap();

        assert_eq!(config.redis.url, "redis://127.0.0.1:6379");
        assert_eq!(
            config.models.active,
            vec![ModelId::Gpt4o, ModelId::ClaudeOpus]
        );
        assert_eq!(config.dlq.process_interval_secs, 15);
        assert_eq!(config.dlq.batch_size, 20);
        // Untouched sections keep their defaults
        assert_eq!(config.dlq.max_retries, 5);
        assert_eq!(config.queue.dedup_window_secs, 60);
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let yaml = config.to_yaml().unwrap();
        assert!(!yaml.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let config_content = r#"
dlq:
  batch_size: 0
"#;
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();

        let result = Config::from_file(temp_file.path()).await;
        assert!(matches!(result, Err(OrchestratorError::Config(_))));
    }
}
