//! Orphan recovery
//!
//! An in-flight entry whose claimer has vanished would otherwise sit
//! in `processing` forever; the reaper re-enqueues it with a synthetic
//! orphaned failure so the retry accounting still applies.

use super::dispatcher::Dispatcher;
use crate::core::types::{AgentStatus, FailureInfo, FailureKind, ModelId, Task, TaskEvent};
use crate::storage::keyspace;
use crate::utils::error::Result;
use crate::utils::time::now_ms;
use std::time::Duration;
use tracing::{info, warn};

impl Dispatcher {
    /// Scan `processing:<model>` and re-enqueue every entry older than
    /// `staleness` whose claiming agent is absent or unresponsive.
    /// Returns the number of reaped tasks.
    pub async fn reap_orphans(&self, model: ModelId, staleness: Duration) -> Result<u32> {
        let processing_key = keyspace::processing(model);
        let entries = self.redis.list_range(&processing_key, 0, -1).await?;
        let now = now_ms();
        let staleness_ms = staleness.as_millis() as i64;

        let mut reaped = 0;
        for payload in entries {
            let Ok(task) = Task::from_json(&payload) else {
                // A payload the claim script could not decode; move it
                // to the failure log so it stops clogging the scan.
                warn!("Unparseable in-flight entry on {}; discarding", processing_key);
                self.redis.list_remove(&processing_key, 1, &payload).await?;
                self.redis.list_push(keyspace::FAILURE_LOG, &payload).await?;
                continue;
            };

            let age = now - task.claimed_at.unwrap_or(0);
            if age <= staleness_ms {
                continue;
            }

            let claimer = task.claimed_by.clone().unwrap_or_default();
            if self.claimer_is_live(&claimer).await? {
                continue;
            }

            // Remove the exact stored payload; a concurrent complete
            // or fail already removed it when this misses.
            if self.redis.list_remove(&processing_key, 1, &payload).await? == 0 {
                continue;
            }

            let mut orphan = task;
            orphan.retries += 1;
            orphan.failure = Some(FailureInfo {
                kind: FailureKind::Orphaned,
                message: format!("claimer {} vanished while task was in flight", claimer),
                failed_at: now,
                failed_by: "orchestrator".to_string(),
            });
            orphan.claimed_by = None;
            orphan.claimed_at = None;

            self.requeue(&orphan, model).await?;
            self.publish_event(&TaskEvent::TaskOrphaned {
                id: orphan.id.clone(),
                model,
                agent: claimer,
                ts: now,
            })
            .await?;

            reaped += 1;
            info!("Reaped orphan {} back into queue:{}", orphan.id, model);
        }

        Ok(reaped)
    }

    /// Age of the oldest in-flight entry, if any
    pub async fn processing_head_age(&self, model: ModelId) -> Result<Option<Duration>> {
        // LPUSH on claim means the tail is the oldest entry
        let tail = self
            .redis
            .list_range(&keyspace::processing(model), -1, -1)
            .await?;
        let Some(payload) = tail.first() else {
            return Ok(None);
        };
        let Ok(task) = Task::from_json(payload) else {
            // Malformed entries are treated as infinitely old so the
            // reaper gets invoked and clears them out.
            return Ok(Some(Duration::MAX));
        };
        let age_ms = (now_ms() - task.claimed_at.unwrap_or(0)).max(0);
        Ok(Some(Duration::from_millis(age_ms as u64)))
    }

    async fn claimer_is_live(&self, claimer: &str) -> Result<bool> {
        if claimer.is_empty() {
            return Ok(false);
        }
        if !self.redis.exists(&keyspace::heartbeat(claimer)).await? {
            return Ok(false);
        }
        let status = self
            .redis
            .hash_get(&keyspace::agent(claimer), "status")
            .await?;
        Ok(status.as_deref() != Some(AgentStatus::Unresponsive.as_str()))
    }
}
