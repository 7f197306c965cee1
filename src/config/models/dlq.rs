//! DLQ manager configuration

use crate::config::validation::Validate;
use serde::{Deserialize, Serialize};

/// Dead-letter queue processing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DlqConfig {
    /// Seconds between DLQ processing passes
    pub process_interval_secs: u64,
    /// Entries read per DLQ per pass
    pub batch_size: usize,
    /// Global retry cap; reaching it archives the task
    pub max_retries: u32,
    /// Age past which a DLQ entry is archived as expired, seconds
    pub entry_ttl_secs: u64,
    /// Default retry delay for temporary unknown failures, milliseconds
    pub retry_delay_ms: u64,
    /// Days an archive partition is retained
    pub archive_retention_days: u32,
    /// Bound on the permanent-failures sorted set
    pub permanent_failure_limit: usize,
    /// Seconds between cleanup sweeps
    pub cleanup_interval_secs: u64,
}

impl Default for DlqConfig {
    fn default() -> Self {
        Self {
            process_interval_secs: 30,
            batch_size: 10,
            max_retries: 5,
            entry_ttl_secs: 7 * 24 * 3600,
            retry_delay_ms: 5_000,
            archive_retention_days: 30,
            permanent_failure_limit: 1_000,
            cleanup_interval_secs: 3_600,
        }
    }
}

impl Validate for DlqConfig {
    fn validate(&self) -> Result<(), String> {
        if self.process_interval_secs == 0 {
            return Err("process_interval_secs must be positive".to_string());
        }
        if self.batch_size == 0 {
            return Err("batch_size must be positive".to_string());
        }
        if self.max_retries == 0 {
            return Err("max_retries must be positive".to_string());
        }
        if self.permanent_failure_limit == 0 {
            return Err("permanent_failure_limit must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_policy() {
        let config = DlqConfig::default();
        assert_eq!(config.process_interval_secs, 30);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.entry_ttl_secs, 604_800);
        assert_eq!(config.archive_retention_days, 30);
        assert_eq!(config.permanent_failure_limit, 1_000);
    }

    #[test]
    fn test_zero_batch_rejected() {
        let config = DlqConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
