//! Durable retry scheduling
//!
//! Delayed re-insertions live in a sorted set scored by ready-at time,
//! drained at the top of every processing pass. Unlike in-process
//! timers, pending delays survive restart; a crash between scheduling
//! and drain at worst duplicates a retry, which at-least-once
//! delivery already admits.

use super::manager::DlqManager;
use crate::core::types::{ModelId, Task, TaskEvent, channels};
use crate::storage::keyspace;
use crate::utils::error::Result;
use crate::utils::time::now_ms;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A retry parked until its ready-at time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledRetry {
    /// Queue receiving the re-insertion
    pub queue: ModelId,
    /// The mutated task
    pub task: Task,
}

impl DlqManager {
    /// Park a retry until `now + delay_ms`
    pub(super) async fn schedule_retry(
        &self,
        queue: ModelId,
        task: Task,
        delay_ms: u64,
    ) -> Result<()> {
        let ready_at = now_ms() + delay_ms as i64;
        let entry = ScheduledRetry { queue, task };
        self.redis
            .sorted_set_add(
                keyspace::DLQ_SCHEDULED,
                &serde_json::to_string(&entry)?,
                ready_at as f64,
            )
            .await?;
        debug!(
            "Scheduled retry of {} into queue:{} in {}ms",
            entry.task.id, entry.queue, delay_ms
        );
        Ok(())
    }

    /// Move every due retry into its target lane. Returns the number
    /// of re-inserted tasks.
    pub async fn drain_scheduled(&self) -> Result<u32> {
        let due = self
            .redis
            .sorted_set_range_by_score(keyspace::DLQ_SCHEDULED, f64::MIN, now_ms() as f64)
            .await?;

        let mut drained = 0;
        for member in due {
            let entry: ScheduledRetry = match serde_json::from_str(&member) {
                Ok(entry) => entry,
                Err(err) => {
                    // Drop the member so one bad envelope cannot wedge
                    // the drain forever.
                    tracing::warn!("Discarding unparseable scheduled retry: {}", err);
                    self.redis
                        .sorted_set_remove(keyspace::DLQ_SCHEDULED, &member)
                        .await?;
                    continue;
                }
            };

            // Re-insertion bypasses ingest dedup: the task id is
            // deliberately reused across retries.
            let lane = keyspace::lane(entry.queue, entry.task.priority);
            self.redis
                .list_push(&lane, &entry.task.to_json()?)
                .await?;
            self.redis
                .sorted_set_remove(keyspace::DLQ_SCHEDULED, &member)
                .await?;

            let event = TaskEvent::TaskRetried {
                id: entry.task.id.clone(),
                queue: keyspace::queue(entry.queue),
                strategy: entry
                    .task
                    .retry_strategy
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string()),
                retries: entry.task.retries,
                ts: now_ms(),
            };
            self.redis
                .publish(channels::TASK_UPDATES, &serde_json::to_string(&event)?)
                .await?;

            info!(
                "Retry of {} re-inserted into {} (retries={})",
                entry.task.id, lane, entry.task.retries
            );
            drained += 1;
        }
        Ok(drained)
    }
}
