//! Agent registry and heartbeat sweep

use crate::config::CoordinationConfig;
use crate::core::types::{
    AgentPerformance, AgentRecord, AgentStatus, RegistryEvent, channels,
};
use crate::storage::{RedisPool, keyspace};
use crate::utils::error::Result;
use crate::utils::time::now_ms;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Registry snapshot produced by the sweep
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct AgentCensus {
    /// Registered agents
    pub total: usize,
    /// Agents with a fresh heartbeat
    pub responsive: usize,
    /// Agents past the unresponsive threshold
    pub unresponsive: usize,
    /// Agents removed this sweep
    pub removed: usize,
}

/// Agent coordination surface over the shared data plane
#[derive(Clone)]
pub struct Coordinator {
    pub(super) redis: RedisPool,
    pub(super) config: CoordinationConfig,
}

impl Coordinator {
    /// Create a coordinator
    pub fn new(redis: RedisPool, config: CoordinationConfig) -> Self {
        Self { redis, config }
    }

    /// Register an agent: install its record and liveness key, then
    /// announce it on the registry channel.
    pub async fn register(&self, record: &AgentRecord) -> Result<()> {
        info!("Registering agent {}", record.id);

        self.write_record(record).await?;
        self.refresh_heartbeat_key(&record.id).await?;

        let event = RegistryEvent::AgentRegistered {
            agent: record.clone(),
            ts: now_ms(),
        };
        self.redis
            .publish(channels::AGENT_REGISTRY, &serde_json::to_string(&event)?)
            .await
    }

    /// Record a heartbeat. Idempotent; callers must beat at a cadence
    /// below half the TTL.
    pub async fn heartbeat(&self, id: &str) -> Result<()> {
        self.redis
            .hash_set(
                &keyspace::agent(id),
                "last_heartbeat",
                &now_ms().to_string(),
            )
            .await?;
        self.refresh_heartbeat_key(id).await
    }

    /// Update an agent's status and current task, announcing the
    /// transition.
    pub async fn set_status(&self, id: &str, status: AgentStatus, current_task: &str) -> Result<()> {
        self.redis
            .hash_set_multiple(
                &keyspace::agent(id),
                &[
                    ("status", status.as_str().to_string()),
                    ("current_task", current_task.to_string()),
                ],
            )
            .await?;

        let event = RegistryEvent::AgentStatusUpdated {
            id: id.to_string(),
            status,
            ts: now_ms(),
        };
        self.redis
            .publish(channels::AGENT_REGISTRY, &serde_json::to_string(&event)?)
            .await
    }

    /// Fold a completion or failure into the agent's aggregate
    /// counters. Latency feeds an EMA with fixed smoothing.
    pub async fn record_outcome(&self, id: &str, success: bool, latency_ms: u64) -> Result<()> {
        let key = keyspace::agent(id);
        let field = if success { "perf_completed" } else { "perf_failed" };
        self.redis.hash_increment(&key, field, 1).await?;

        let previous = self
            .redis
            .hash_get(&key, "perf_avg_latency")
            .await?
            .and_then(|raw| raw.parse::<f64>().ok())
            .unwrap_or(0.0);
        let next = if previous == 0.0 {
            latency_ms as f64
        } else {
            previous + 0.2 * (latency_ms as f64 - previous)
        };
        self.redis
            .hash_set(&key, "perf_avg_latency", &format!("{:.1}", next))
            .await
    }

    /// Fetch one agent's record
    pub async fn agent(&self, id: &str) -> Result<Option<AgentRecord>> {
        let hash = self.redis.hash_get_all(&keyspace::agent(id)).await?;
        if hash.is_empty() {
            return Ok(None);
        }
        Ok(Self::record_from_hash(id, &hash))
    }

    /// Snapshot of agents with a heartbeat younger than the
    /// unresponsive threshold
    pub async fn active_agents(&self) -> Result<Vec<AgentRecord>> {
        let threshold_ms = (self.config.unresponsive_threshold_secs * 1000) as i64;
        let now = now_ms();

        let mut active = Vec::new();
        for record in self.all_agents().await? {
            if record.heartbeat_age_ms(now) < threshold_ms {
                active.push(record);
            }
        }
        Ok(active)
    }

    /// Every registered agent, regardless of liveness
    pub async fn all_agents(&self) -> Result<Vec<AgentRecord>> {
        let keys = self.redis.scan_keys("agent:*").await?;
        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            let id = key.trim_start_matches("agent:");
            let hash = self.redis.hash_get_all(&key).await?;
            if let Some(record) = Self::record_from_hash(id, &hash) {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Liveness sweep: mark stale agents unresponsive, remove agents
    /// past the GC threshold, and report the census.
    pub async fn sweep(&self) -> Result<AgentCensus> {
        let now = now_ms();
        let unresponsive_ms = (self.config.unresponsive_threshold_secs * 1000) as i64;
        let gc_ms = (self.config.gc_threshold_secs * 1000) as i64;

        let mut census = AgentCensus::default();
        for record in self.all_agents().await? {
            census.total += 1;
            let age = record.heartbeat_age_ms(now);

            if age > gc_ms {
                warn!("Removing agent {} (no heartbeat for {}ms)", record.id, age);
                self.remove(&record.id).await?;
                census.removed += 1;
                census.total -= 1;
            } else if age > unresponsive_ms {
                census.unresponsive += 1;
                if record.status != AgentStatus::Unresponsive {
                    self.set_status(&record.id, AgentStatus::Unresponsive, &record.current_task)
                        .await?;
                }
            } else {
                census.responsive += 1;
            }
        }

        debug!(
            "Agent sweep: {} total, {} responsive, {} unresponsive, {} removed",
            census.total, census.responsive, census.unresponsive, census.removed
        );
        Ok(census)
    }

    /// Remove an agent record and announce the removal
    pub async fn remove(&self, id: &str) -> Result<()> {
        self.redis.delete(&keyspace::agent(id)).await?;
        self.redis.delete(&keyspace::heartbeat(id)).await?;

        let event = RegistryEvent::AgentRemoved {
            id: id.to_string(),
            ts: now_ms(),
        };
        self.redis
            .publish(channels::AGENT_REGISTRY, &serde_json::to_string(&event)?)
            .await
    }

    /// Whether the agent's liveness key is still present
    pub async fn is_alive(&self, id: &str) -> Result<bool> {
        self.redis.exists(&keyspace::heartbeat(id)).await
    }

    async fn refresh_heartbeat_key(&self, id: &str) -> Result<()> {
        self.redis
            .set(
                &keyspace::heartbeat(id),
                "1",
                Some(self.config.gc_threshold_secs),
            )
            .await
    }

    async fn write_record(&self, record: &AgentRecord) -> Result<()> {
        self.redis
            .hash_set_multiple(
                &keyspace::agent(&record.id),
                &[
                    ("id", record.id.clone()),
                    ("capabilities", serde_json::to_string(&record.capabilities)?),
                    ("priority", record.priority.to_string()),
                    ("status", record.status.as_str().to_string()),
                    ("current_task", record.current_task.clone()),
                    ("last_heartbeat", record.last_heartbeat.to_string()),
                    (
                        "perf_completed",
                        record.performance.completed.to_string(),
                    ),
                    ("perf_failed", record.performance.failed.to_string()),
                    (
                        "perf_avg_latency",
                        format!("{:.1}", record.performance.avg_latency_ms),
                    ),
                ],
            )
            .await
    }

    fn record_from_hash(id: &str, hash: &HashMap<String, String>) -> Option<AgentRecord> {
        let status = match hash.get("status").map(String::as_str) {
            Some("active") => AgentStatus::Active,
            Some("idle") => AgentStatus::Idle,
            Some("working") => AgentStatus::Working,
            Some("offline") => AgentStatus::Offline,
            Some("unresponsive") => AgentStatus::Unresponsive,
            _ => return None,
        };

        Some(AgentRecord {
            id: id.to_string(),
            capabilities: hash
                .get("capabilities")
                .and_then(|raw| serde_json::from_str(raw).ok())
                .unwrap_or_default(),
            priority: hash
                .get("priority")
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(0),
            status,
            current_task: hash
                .get("current_task")
                .cloned()
                .unwrap_or_else(|| "idle".to_string()),
            last_heartbeat: hash
                .get("last_heartbeat")
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(0),
            performance: AgentPerformance {
                completed: hash
                    .get("perf_completed")
                    .and_then(|raw| raw.parse().ok())
                    .unwrap_or(0),
                failed: hash
                    .get("perf_failed")
                    .and_then(|raw| raw.parse().ok())
                    .unwrap_or(0),
                avg_latency_ms: hash
                    .get("perf_avg_latency")
                    .and_then(|raw| raw.parse().ok())
                    .unwrap_or(0.0),
            },
        })
    }
}
