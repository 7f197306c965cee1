//! Orchestrator loop configuration

use crate::config::validation::Validate;
use serde::{Deserialize, Serialize};

/// Health sweep, orphan cadence, and rebalance settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Seconds between health sweeps
    pub health_interval_secs: u64,
    /// In-flight head age that triggers orphan reaping, seconds
    pub orphan_threshold_secs: u64,
    /// Pending-depth difference that triggers a rebalance move
    pub rebalance_depth_delta: usize,
    /// Maximum tasks moved per rebalance step
    pub rebalance_batch: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            health_interval_secs: 5,
            orphan_threshold_secs: 300,
            rebalance_depth_delta: 50,
            rebalance_batch: 10,
        }
    }
}

impl Validate for LoopConfig {
    fn validate(&self) -> Result<(), String> {
        if self.health_interval_secs == 0 {
            return Err("health_interval_secs must be positive".to_string());
        }
        if self.rebalance_batch == 0 {
            return Err("rebalance_batch must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(LoopConfig::default().validate().is_ok());
    }
}
