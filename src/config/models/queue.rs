//! Queue dispatcher configuration

use crate::config::validation::Validate;
use crate::core::types::ModelId;
use serde::{Deserialize, Serialize};

/// The set of model queues this deployment serves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelSetConfig {
    /// Active models, in sweep order
    pub active: Vec<ModelId>,
}

impl Default for ModelSetConfig {
    fn default() -> Self {
        Self {
            active: ModelId::ALL.to_vec(),
        }
    }
}

/// Queue dispatcher configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Ingest de-duplication window in seconds
    pub dedup_window_secs: u64,
    /// Age after which an unacknowledged in-flight entry is orphan-eligible
    pub orphan_staleness_secs: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            dedup_window_secs: 60,
            orphan_staleness_secs: 300,
        }
    }
}

impl Validate for QueueConfig {
    fn validate(&self) -> Result<(), String> {
        if self.dedup_window_secs == 0 {
            return Err("dedup_window_secs must be positive".to_string());
        }
        if self.orphan_staleness_secs == 0 {
            return Err("orphan_staleness_secs must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_set_is_full() {
        assert_eq!(ModelSetConfig::default().active.len(), 5);
    }

    #[test]
    fn test_model_set_parses_transparent_list() {
        let set: ModelSetConfig = serde_yaml::from_str("[gpt-4o, gemini-pro]").unwrap();
        assert_eq!(set.active, vec![ModelId::Gpt4o, ModelId::GeminiPro]);
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = QueueConfig {
            dedup_window_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
