//! Tests for agent coordination

#[cfg(test)]
mod tests {
    use super::super::coordinator::Coordinator;
    use crate::config::CoordinationConfig;
    use crate::core::types::{AgentRecord, AgentStatus};
    use crate::storage::RedisPool;
    use crate::utils::time::now_ms;
    use std::time::Duration;

    fn noop_coordinator() -> Coordinator {
        Coordinator::new(RedisPool::create_noop(), CoordinationConfig::default())
    }

    #[tokio::test]
    async fn test_register_and_heartbeat_are_clean() {
        let coordinator = noop_coordinator();
        let record = AgentRecord::new("gpt-01", vec!["gpt-4o".to_string()], now_ms());
        coordinator.register(&record).await.unwrap();
        coordinator.heartbeat("gpt-01").await.unwrap();
        // Heartbeat is idempotent
        coordinator.heartbeat("gpt-01").await.unwrap();
    }

    #[tokio::test]
    async fn test_status_update() {
        let coordinator = noop_coordinator();
        coordinator
            .set_status("gpt-01", AgentStatus::Working, "T1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_noop_claim_and_release() {
        // The no-op pool acknowledges every claim; this exercises the
        // publish path without a live data plane.
        let coordinator = noop_coordinator();
        assert!(
            coordinator
                .claim_file("src/x.ts", "gpt-01", Duration::from_secs(30))
                .await
                .unwrap()
        );
        assert!(coordinator.release_file("src/x.ts", "gpt-01").await.unwrap());
    }

    #[tokio::test]
    async fn test_wait_for_file_returns_on_claim() {
        let coordinator = noop_coordinator();
        let acquired = coordinator
            .wait_for_file(
                "src/x.ts",
                "gpt-01",
                Duration::from_secs(30),
                Duration::from_secs(3),
            )
            .await
            .unwrap();
        assert!(acquired);
    }

    #[tokio::test]
    async fn test_empty_registry_census() {
        let coordinator = noop_coordinator();
        let census = coordinator.sweep().await.unwrap();
        assert_eq!(census.total, 0);
        assert_eq!(census.responsive, 0);
        assert!(coordinator.active_agents().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_messaging_surface() {
        let coordinator = noop_coordinator();
        coordinator.send("gpt-01", "gpt-02", "ready?").await.unwrap();
        coordinator.broadcast("gpt-01", "rollout done").await.unwrap();
        assert_eq!(coordinator.next_message("gpt-02").await.unwrap(), None);
        assert!(coordinator.inbox("gpt-02", 10).await.unwrap().is_empty());
    }
}
