//! Data-plane connection configuration

use crate::config::validation::Validate;
use serde::{Deserialize, Serialize};

/// Redis connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Connection URL
    pub url: String,
    /// Disable to run against the no-op pool
    pub enabled: bool,
    /// Connection timeout in seconds
    pub connection_timeout_secs: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            enabled: true,
            connection_timeout_secs: 5,
        }
    }
}

impl Validate for RedisConfig {
    fn validate(&self) -> Result<(), String> {
        if self.enabled && self.url.is_empty() {
            return Err("redis url must not be empty".to_string());
        }
        if self.enabled && !self.url.starts_with("redis://") && !self.url.starts_with("rediss://") {
            return Err(format!("unsupported redis url scheme: {}", self.url));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(RedisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_bad_scheme_rejected() {
        let config = RedisConfig {
            url: "http://localhost".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_disabled_skips_url_check() {
        let config = RedisConfig {
            url: String::new(),
            enabled: false,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
