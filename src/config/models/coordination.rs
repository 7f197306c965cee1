//! Agent coordination configuration

use crate::config::validation::Validate;
use serde::{Deserialize, Serialize};

/// Agent registry, heartbeat, lock, and messaging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinationConfig {
    /// Heartbeat age past which an agent is reported unresponsive, seconds
    pub unresponsive_threshold_secs: u64,
    /// Heartbeat age past which an agent record is removed, seconds.
    /// Also the TTL of the liveness key.
    pub gc_threshold_secs: u64,
    /// Default file-lock TTL in seconds
    pub lock_ttl_secs: u64,
    /// Poll interval for `wait_for_file`, seconds; bounded below at 1
    pub wait_poll_secs: u64,
    /// Direct-message inbox retention bound
    pub inbox_limit: usize,
}

impl Default for CoordinationConfig {
    fn default() -> Self {
        Self {
            unresponsive_threshold_secs: 120,
            gc_threshold_secs: 600,
            lock_ttl_secs: 30,
            wait_poll_secs: 1,
            inbox_limit: 100,
        }
    }
}

impl Validate for CoordinationConfig {
    fn validate(&self) -> Result<(), String> {
        if self.gc_threshold_secs <= self.unresponsive_threshold_secs {
            return Err(
                "gc_threshold_secs must exceed unresponsive_threshold_secs".to_string(),
            );
        }
        if self.wait_poll_secs == 0 {
            return Err("wait_poll_secs must be at least 1".to_string());
        }
        if self.inbox_limit == 0 {
            return Err("inbox_limit must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(CoordinationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_gc_must_exceed_unresponsive() {
        let config = CoordinationConfig {
            unresponsive_threshold_secs: 600,
            gc_threshold_secs: 600,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_hot_loop_poll_rejected() {
        let config = CoordinationConfig {
            wait_poll_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
