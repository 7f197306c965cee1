//! System health sweep

use super::runner::Orchestrator;
use crate::core::coordination::AgentCensus;
use crate::core::types::ModelId;
use crate::storage::keyspace;
use crate::utils::error::Result;
use crate::utils::time::now_ms;
use serde::Serialize;
use tracing::debug;

/// One model's queue depths in the health report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueHealth {
    /// Queue model
    pub model: ModelId,
    /// Pending across all lanes
    pub pending: usize,
    /// In flight
    pub processing: usize,
    /// Awaiting classification
    pub dlq: usize,
}

/// Derived system health snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemHealth {
    /// Snapshot time, epoch ms
    pub ts: i64,
    /// Fraction of agents with a fresh heartbeat; 1.0 for an empty
    /// registry
    pub score: f64,
    /// Agent census from the sweep
    pub agents: AgentCensus,
    /// Per-model queue depths
    pub queues: Vec<QueueHealth>,
}

impl Orchestrator {
    /// Snapshot queue depths and agent liveness, store the report for
    /// external probes, and return it.
    pub async fn health_sweep(&self) -> Result<SystemHealth> {
        let agents = self.coordinator.sweep().await?;

        let mut queues = Vec::with_capacity(self.config.models.active.len());
        for model in &self.config.models.active {
            let depths = self.dispatcher.depths(*model).await?;
            queues.push(QueueHealth {
                model: *model,
                pending: depths.pending,
                processing: depths.processing,
                dlq: depths.dlq,
            });
        }

        let score = if agents.total == 0 {
            1.0
        } else {
            agents.responsive as f64 / agents.total as f64
        };

        let health = SystemHealth {
            ts: now_ms(),
            score,
            agents,
            queues,
        };

        // Keep the latest report readable by dashboards; short TTL so
        // a dead orchestrator is visible as a missing key.
        let ttl = self.config.orchestrator.health_interval_secs * 4;
        self.redis
            .set(
                keyspace::HEALTH_SNAPSHOT,
                &serde_json::to_string(&health)?,
                Some(ttl),
            )
            .await?;

        debug!(
            "Health sweep: score {:.2}, {} queues",
            health.score,
            health.queues.len()
        );
        Ok(health)
    }
}
