//! Tests for the orchestrator loop

#[cfg(test)]
mod tests {
    use super::super::runner::Orchestrator;
    use crate::config::Config;
    use crate::core::types::ModelId;
    use crate::storage::RedisPool;
    use std::sync::Arc;

    fn noop_orchestrator() -> Orchestrator {
        Orchestrator::new(RedisPool::create_noop(), Arc::new(Config::default()))
    }

    #[tokio::test]
    async fn test_health_sweep_on_empty_plane() {
        let orchestrator = noop_orchestrator();
        let health = orchestrator.health_sweep().await.unwrap();
        // An empty registry scores healthy, not zero
        assert_eq!(health.score, 1.0);
        assert_eq!(health.agents.total, 0);
        assert_eq!(health.queues.len(), ModelId::ALL.len());
        assert!(health.queues.iter().all(|q| q.pending == 0));
    }

    #[tokio::test]
    async fn test_sweep_once_runs_clean() {
        let orchestrator = noop_orchestrator();
        orchestrator.sweep_once().await.unwrap();
    }

    #[tokio::test]
    async fn test_rebalance_with_empty_queues_moves_nothing() {
        let orchestrator = noop_orchestrator();
        assert_eq!(orchestrator.rebalance(None).await.unwrap(), 0);
        assert_eq!(
            orchestrator.rebalance(Some(ModelId::Gpt4o)).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_malformed_control_command_is_ignored() {
        let orchestrator = noop_orchestrator();
        orchestrator.handle_command("not json").await;
        orchestrator.handle_command(r#"{"type":"warp-core-breach"}"#).await;
    }

    #[tokio::test]
    async fn test_pause_resume_commands() {
        let orchestrator = noop_orchestrator();
        orchestrator.handle_command(r#"{"type":"pause"}"#).await;
        orchestrator.handle_command(r#"{"type":"resume"}"#).await;
        orchestrator
            .handle_command(r#"{"type":"clear_dlq","model":"gpt-4o"}"#)
            .await;
        orchestrator.handle_command(r#"{"type":"health_check"}"#).await;
    }
}
