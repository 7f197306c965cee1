//! API-key rotation configuration

use crate::config::validation::Validate;
use crate::core::types::ModelId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Key selection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationStrategy {
    /// Monotonic cursor modulo pool size
    RoundRobin,
    /// Fewest uses within the rate-limit window
    LeastUsed,
    /// Sampled by success-rate / latency weight
    Weighted,
    /// Healthy keys only, round-robin among them
    #[default]
    HealthBased,
}

/// One model's credential pool
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyPoolConfig {
    /// Credentials; never logged
    pub keys: Vec<String>,
    /// Requests per minute per key
    pub rpm: u32,
}

/// Key rotation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Default selection strategy
    pub strategy: RotationStrategy,
    /// Sliding rate-limit window in seconds
    pub window_secs: u64,
    /// Per-model pools, keyed by queue-key model name
    pub pools: HashMap<ModelId, KeyPoolConfig>,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            strategy: RotationStrategy::default(),
            window_secs: 60,
            pools: HashMap::new(),
        }
    }
}

impl Validate for RotationConfig {
    fn validate(&self) -> Result<(), String> {
        if self.window_secs == 0 {
            return Err("window_secs must be positive".to_string());
        }
        for (model, pool) in &self.pools {
            if pool.keys.is_empty() {
                return Err(format!("key pool for {} is empty", model));
            }
            if pool.rpm == 0 {
                return Err(format!("rpm for {} must be positive", model));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_wire_form() {
        let s: RotationStrategy = serde_yaml::from_str("least_used").unwrap();
        assert_eq!(s, RotationStrategy::LeastUsed);
        assert_eq!(RotationStrategy::default(), RotationStrategy::HealthBased);
    }

    #[test]
    fn test_empty_pool_rejected() {
        let mut config = RotationConfig::default();
        config
            .pools
            .insert(ModelId::Gpt4o, KeyPoolConfig { keys: vec![], rpm: 60 });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_populated_pool_accepted() {
        let mut config = RotationConfig::default();
        config.pools.insert(
            ModelId::Gpt4o,
            KeyPoolConfig {
                keys: vec!["sk-1".to_string()],
                rpm: 60,
            },
        );
        assert!(config.validate().is_ok());
    }
}
