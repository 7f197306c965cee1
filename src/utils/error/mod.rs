//! Error handling for the orchestrator core
//!
//! This module defines all error types used throughout the crate.

use crate::core::types::FailureKind;
use thiserror::Error;

/// Result type alias for the orchestrator
pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// Main error type for the orchestrator core
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// Configuration errors (abort startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Redis errors
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A referenced task, agent, or key does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Atomic compare-and-set failed
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Caller exceeded a configured rate-limit window
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// No API keys configured for a model
    #[error("No keys available for model: {0}")]
    NoKeys(String),

    /// Worker-side failure observed and classified
    #[error("Classified failure ({kind}): {message}")]
    Classified {
        /// Failure class
        kind: FailureKind,
        /// Original failure message
        message: String,
    },

    /// Terminal classification chosen by the DLQ manager
    #[error("Permanent failure: {0}")]
    Permanent(String),

    /// Temporary issue, retryable
    #[error("Transient error: {0}")]
    Transient(String),

    /// Deadline exceeded
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Internal invariant violations
    #[error("Internal error: {0}")]
    Internal(String),
}

impl OrchestratorError {
    /// Whether the error is safe to retry with backoff
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            OrchestratorError::Transient(_) | OrchestratorError::Redis(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OrchestratorError::NotFound("task T1".to_string());
        assert_eq!(err.to_string(), "Not found: task T1");

        let err = OrchestratorError::Classified {
            kind: FailureKind::RateLimit,
            message: "429 rate limit exceeded".to_string(),
        };
        assert!(err.to_string().contains("rate_limit"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(OrchestratorError::Transient("blip".to_string()).is_transient());
        assert!(!OrchestratorError::Config("bad".to_string()).is_transient());
    }
}
