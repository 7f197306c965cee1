//! Tests for key rotation

#[cfg(test)]
mod tests {
    use super::super::rotator::KeyRotator;
    use crate::config::{KeyPoolConfig, RotationConfig, RotationStrategy};
    use crate::core::types::ModelId;
    use crate::storage::RedisPool;
    use crate::utils::error::OrchestratorError;

    fn rotator_with_pool(keys: &[&str], rpm: u32) -> KeyRotator {
        let mut config = RotationConfig::default();
        config.pools.insert(
            ModelId::Gpt4o,
            KeyPoolConfig {
                keys: keys.iter().map(|k| k.to_string()).collect(),
                rpm,
            },
        );
        KeyRotator::new(RedisPool::create_noop(), config)
    }

    #[tokio::test]
    async fn test_missing_pool_is_no_keys_error() {
        let rotator = rotator_with_pool(&["sk-1"], 60);
        let result = rotator
            .next(ModelId::GeminiPro, RotationStrategy::RoundRobin)
            .await;
        assert!(matches!(result, Err(OrchestratorError::NoKeys(_))));
    }

    #[tokio::test]
    async fn test_round_robin_selects_within_pool() {
        let rotator = rotator_with_pool(&["sk-1", "sk-2", "sk-3"], 60);
        // The no-op pool returns the INCR delta, so the cursor is
        // constant; what matters is that selection stays in range and
        // hands back the matching credential.
        let selected = rotator
            .next(ModelId::Gpt4o, RotationStrategy::RoundRobin)
            .await
            .unwrap();
        assert!(selected.index < 3);
        assert!(!selected.degraded);
        assert_eq!(
            selected.key,
            ["sk-1", "sk-2", "sk-3"][selected.index]
        );
    }

    #[tokio::test]
    async fn test_health_based_never_blocks() {
        // No-op pool reports no health markers, so every key is
        // presumed healthy and selection proceeds.
        let rotator = rotator_with_pool(&["sk-1", "sk-2"], 60);
        let selected = rotator
            .next(ModelId::Gpt4o, RotationStrategy::HealthBased)
            .await
            .unwrap();
        assert!(!selected.degraded);
    }

    #[tokio::test]
    async fn test_weighted_handles_unsampled_pool() {
        let rotator = rotator_with_pool(&["sk-1", "sk-2"], 60);
        let selected = rotator
            .next(ModelId::Gpt4o, RotationStrategy::Weighted)
            .await
            .unwrap();
        assert!(selected.index < 2);
    }

    #[tokio::test]
    async fn test_zero_uses_not_rate_limited() {
        let rotator = rotator_with_pool(&["sk-1"], 2);
        assert!(!rotator.is_rate_limited(ModelId::Gpt4o, 0).await.unwrap());
    }

    #[test]
    fn test_fallback_chain_delegates_to_model() {
        assert_eq!(
            KeyRotator::fallback(ModelId::DeepseekCoder),
            Some(ModelId::Gpt4o)
        );
        assert_eq!(
            KeyRotator::fallback(ModelId::GeminiPro),
            Some(ModelId::CommandRPlus)
        );
    }

    #[tokio::test]
    async fn test_pool_size() {
        let rotator = rotator_with_pool(&["sk-1", "sk-2"], 60);
        assert_eq!(rotator.pool_size(ModelId::Gpt4o), 2);
        assert_eq!(rotator.pool_size(ModelId::ClaudeOpus), 0);
    }
}
