//! Tests for DLQ processing

#[cfg(test)]
mod tests {
    use super::super::manager::DlqManager;
    use super::super::strategy::{self, Disposition};
    use crate::config::DlqConfig;
    use crate::core::types::{FailureInfo, FailureKind, ModelId, Priority, Task};
    use crate::storage::RedisPool;
    use crate::utils::time::now_ms;

    fn failed_task(id: &str, model: ModelId, message: &str, retries: u32) -> Task {
        let mut task = Task::new(id, model);
        task.original_queue = Some(format!("queue:{}", model));
        task.retries = retries;
        task.failure = Some(FailureInfo {
            kind: super::super::classify::classify(message),
            message: message.to_string(),
            failed_at: now_ms(),
            failed_by: "gpt-01".to_string(),
        });
        task
    }

    #[test]
    fn test_rate_limit_retry_delay_and_demotion() {
        // First retry of a rate-limited task waits one minute
        let task = failed_task("T2", ModelId::ClaudeOpus, "429 rate limit exceeded", 0);
        let disposition = strategy::evaluate(&task, &DlqConfig::default(), now_ms());
        assert_eq!(
            disposition,
            Disposition::Retry {
                kind: FailureKind::RateLimit,
                delay_ms: 60_000,
            }
        );

        // Backoff doubles per retry: 1, 2, 4 minutes
        let task = failed_task("T2", ModelId::ClaudeOpus, "429 rate limit exceeded", 2);
        match strategy::evaluate(&task, &DlqConfig::default(), now_ms()) {
            Disposition::Retry { delay_ms, .. } => assert_eq!(delay_ms, 240_000),
            other => panic!("expected retry, got {:?}", other),
        }

        // The mutation demotes to the low lane of the original queue
        let mut task = failed_task("T2", ModelId::ClaudeOpus, "429 rate limit exceeded", 0);
        let queue = strategy::apply_mutation(FailureKind::RateLimit, &mut task);
        assert_eq!(task.priority, Priority::Low);
        assert_eq!(queue, ModelId::ClaudeOpus);
        assert_eq!(task.target_model, ModelId::ClaudeOpus);
    }

    #[test]
    fn test_parse_failure_substitutes_model() {
        let mut task = failed_task("T3", ModelId::DeepseekCoder, "JSON parse error", 0);
        let disposition = strategy::evaluate(&task, &DlqConfig::default(), now_ms());
        assert_eq!(
            disposition,
            Disposition::Retry {
                kind: FailureKind::Parse,
                delay_ms: 10_000,
            }
        );

        let queue = strategy::apply_mutation(FailureKind::Parse, &mut task);
        assert_eq!(task.target_model, ModelId::Gpt4o);
        assert_eq!(queue, ModelId::Gpt4o);
        assert_eq!(task.fallback_used, Some(true));
        // The original queue never changes
        assert_eq!(task.original_queue.as_deref(), Some("queue:deepseek-coder"));
    }

    #[test]
    fn test_timeout_widens_deadline() {
        let mut task = failed_task("T4", ModelId::Gpt4o, "request timeout", 1);
        task.timeout = Some(30_000);
        match strategy::evaluate(&task, &DlqConfig::default(), now_ms()) {
            Disposition::Retry { kind, delay_ms } => {
                assert_eq!(kind, FailureKind::Timeout);
                assert_eq!(delay_ms, 30_000);
            }
            other => panic!("expected retry, got {:?}", other),
        }
        strategy::apply_mutation(FailureKind::Timeout, &mut task);
        assert_eq!(task.timeout, Some(45_000));
    }

    #[test]
    fn test_memory_halves_token_budget() {
        let mut task = failed_task("T5", ModelId::Gpt4o, "JS heap out of memory", 0);
        task.max_tokens = Some(8_000);
        strategy::apply_mutation(FailureKind::Memory, &mut task);
        assert_eq!(task.reduce_context, Some(true));
        assert_eq!(task.max_tokens, Some(4_000));
    }

    #[test]
    fn test_connection_delay_scales_with_retries() {
        let config = DlqConfig::default();
        let task = failed_task("T6", ModelId::Gpt4o, "connection reset", 3);
        match strategy::evaluate(&task, &config, now_ms()) {
            Disposition::Retry { kind, delay_ms } => {
                assert_eq!(kind, FailureKind::Connection);
                assert_eq!(delay_ms, 15_000);
            }
            other => panic!("expected retry, got {:?}", other),
        }
    }

    #[test]
    fn test_global_cap_archives() {
        // A task at the global cap archives regardless of kind
        let task = failed_task("T7", ModelId::Gpt4o, "connection refused", 5);
        assert_eq!(
            strategy::evaluate(&task, &DlqConfig::default(), now_ms()),
            Disposition::Archive {
                reason: "max_retries_exceeded"
            }
        );
    }

    #[test]
    fn test_per_kind_cap_archives_as_non_retryable() {
        // Parse allows two retries; the third attempt is refused
        let task = failed_task("T8", ModelId::DeepseekCoder, "json parse error", 2);
        assert_eq!(
            strategy::evaluate(&task, &DlqConfig::default(), now_ms()),
            Disposition::Archive {
                reason: "non_retryable_error"
            }
        );
    }

    #[test]
    fn test_expired_entry_archives() {
        let mut task = failed_task("T9", ModelId::Gpt4o, "timeout", 0);
        if let Some(failure) = task.failure.as_mut() {
            failure.failed_at = now_ms() - 8 * 24 * 3600 * 1000;
        }
        assert_eq!(
            strategy::evaluate(&task, &DlqConfig::default(), now_ms()),
            Disposition::Archive { reason: "expired" }
        );
    }

    #[test]
    fn test_unknown_temporary_is_retryable() {
        let config = DlqConfig::default();
        let task = failed_task("T10", ModelId::Gpt4o, "service temporarily unavailable", 1);
        assert_eq!(
            strategy::evaluate(&task, &config, now_ms()),
            Disposition::Retry {
                kind: FailureKind::Unknown,
                delay_ms: config.retry_delay_ms,
            }
        );
    }

    #[test]
    fn test_unknown_permanent_goes_to_sink() {
        // An unclassified, non-temporary message at zero retries is
        // terminal immediately
        let task = failed_task("T11", ModelId::Gpt4o, "segfault in worker", 0);
        assert_eq!(
            strategy::evaluate(&task, &DlqConfig::default(), now_ms()),
            Disposition::Permanent
        );
    }

    #[test]
    fn test_boundary_retry_count() {
        // retries = maxRetries - 1 still retries; the increment lands
        // it on the cap, and the next failure archives
        let config = DlqConfig::default();
        let task = failed_task("T12", ModelId::Gpt4o, "connection reset", 4);
        assert!(matches!(
            strategy::evaluate(&task, &config, now_ms()),
            Disposition::Retry { .. }
        ));

        let task = failed_task("T12", ModelId::Gpt4o, "connection reset", 5);
        assert_eq!(
            strategy::evaluate(&task, &config, now_ms()),
            Disposition::Archive {
                reason: "max_retries_exceeded"
            }
        );
    }

    #[test]
    fn test_entry_without_failure_is_terminal() {
        let mut task = Task::new("T13", ModelId::Gpt4o);
        task.failure = None;
        assert_eq!(
            strategy::evaluate(&task, &DlqConfig::default(), now_ms()),
            Disposition::Permanent
        );
    }

    #[tokio::test]
    async fn test_tick_on_empty_plane() {
        let manager = DlqManager::new(
            RedisPool::create_noop(),
            DlqConfig::default(),
            vec![ModelId::Gpt4o, ModelId::ClaudeOpus],
        );
        let stats = manager.tick().await.unwrap();
        assert_eq!(stats.drained, 0);
        assert_eq!(stats.retried, 0);
        assert_eq!(stats.archived, 0);
        assert_eq!(stats.permanent, 0);
    }

    #[tokio::test]
    async fn test_manual_retry_of_missing_task() {
        let manager = DlqManager::new(
            RedisPool::create_noop(),
            DlqConfig::default(),
            vec![ModelId::Gpt4o],
        );
        let result = manager.manual_retry(ModelId::Gpt4o, "T-missing").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_clear_empty_dlq() {
        let manager = DlqManager::new(
            RedisPool::create_noop(),
            DlqConfig::default(),
            vec![ModelId::Gpt4o],
        );
        assert_eq!(manager.clear(ModelId::Gpt4o).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_cleanup_on_empty_plane() {
        let manager = DlqManager::new(
            RedisPool::create_noop(),
            DlqConfig::default(),
            vec![ModelId::Gpt4o],
        );
        manager.cleanup().await.unwrap();
    }
}
