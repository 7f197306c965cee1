//! Tests for queue dispatch

#[cfg(test)]
mod tests {
    use super::super::dispatcher::Dispatcher;
    use crate::config::QueueConfig;
    use crate::core::types::{ModelId, Priority, Task};
    use crate::storage::RedisPool;
    use crate::utils::error::OrchestratorError;
    use std::time::Duration;

    fn noop_dispatcher() -> Dispatcher {
        Dispatcher::new(RedisPool::create_noop(), QueueConfig::default())
    }

    #[tokio::test]
    async fn test_enqueue_sets_original_queue() {
        let dispatcher = noop_dispatcher();
        let task = Task::new("T1", ModelId::Gpt4o);
        assert!(task.original_queue.is_none());
        // The no-op pool accepts every ingest; the observable contract
        // here is that enqueue reports acceptance.
        assert!(dispatcher.enqueue(task).await.unwrap());
    }

    #[tokio::test]
    async fn test_claim_on_empty_queue_is_none() {
        let dispatcher = noop_dispatcher();
        let claimed = dispatcher.claim(ModelId::Gpt4o, "gpt-01").await.unwrap();
        assert!(claimed.is_none());
    }

    #[tokio::test]
    async fn test_complete_missing_task_is_not_found() {
        let dispatcher = noop_dispatcher();
        let task = Task::new("T-missing", ModelId::Gpt4o);
        let result = dispatcher.complete(&task).await;
        assert!(matches!(result, Err(OrchestratorError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_fail_missing_task_is_not_found() {
        let dispatcher = noop_dispatcher();
        let task = Task::new("T-missing", ModelId::Gpt4o);
        let result = dispatcher.fail(&task, "boom", "gpt-01").await;
        assert!(matches!(result, Err(OrchestratorError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_depths_on_empty_plane() {
        let dispatcher = noop_dispatcher();
        let depths = dispatcher.depths(ModelId::ClaudeOpus).await.unwrap();
        assert_eq!(depths.pending, 0);
        assert_eq!(depths.processing, 0);
        assert_eq!(depths.dlq, 0);
    }

    #[tokio::test]
    async fn test_reap_on_empty_processing() {
        let dispatcher = noop_dispatcher();
        let reaped = dispatcher
            .reap_orphans(ModelId::Gpt4o, Duration::from_secs(300))
            .await
            .unwrap();
        assert_eq!(reaped, 0);
        assert_eq!(
            dispatcher
                .processing_head_age(ModelId::Gpt4o)
                .await
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_priority_lane_assignment() {
        let mut task = Task::new("T2", ModelId::ClaudeOpus);
        task.priority = Priority::Low;
        // Retry demotion lands tasks in the low lane of the same queue
        assert_eq!(
            crate::storage::keyspace::lane(task.target_model, task.priority),
            "queue:claude-3-opus:low"
        );
    }
}
