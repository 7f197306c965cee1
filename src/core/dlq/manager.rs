//! DLQ processing loop

use super::strategy::{self, Disposition};
use crate::config::DlqConfig;
use crate::core::types::{
    DlqControl, DlqRecord, FailureKind, ModelId, Task, TaskEvent, channels,
};
use crate::storage::{RedisPool, keyspace};
use crate::utils::error::{OrchestratorError, Result};
use crate::utils::time::{now_ms, today_partition};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Counters for one processing pass
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickStats {
    /// Due retries re-inserted into queues
    pub drained: u32,
    /// Retries newly scheduled
    pub retried: u32,
    /// Entries archived
    pub archived: u32,
    /// Entries terminally failed
    pub permanent: u32,
}

/// Entry appended to the aggregate failure log after classification
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct FailureLogEntry<'a> {
    task_id: &'a str,
    model: ModelId,
    kind: FailureKind,
    disposition: &'a str,
    ts: i64,
}

/// Dead-letter queue manager
pub struct DlqManager {
    pub(super) redis: RedisPool,
    pub(super) config: DlqConfig,
    models: Vec<ModelId>,
    /// Per-pass dedup of envelope fingerprints, so one batch never
    /// processes the same stuck entry twice
    in_flight: Mutex<HashSet<u64>>,
}

impl DlqManager {
    /// Create a manager over the given model DLQs
    pub fn new(redis: RedisPool, config: DlqConfig, models: Vec<ModelId>) -> Self {
        Self {
            redis,
            config,
            models,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Run the processing loop until shutdown: a classification pass
    /// every `process_interval`, a cleanup sweep every
    /// `cleanup_interval`, and external control requests in between.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "DLQ manager started (interval {}s, batch {})",
            self.config.process_interval_secs, self.config.batch_size
        );

        let mut tick = tokio::time::interval(Duration::from_secs(self.config.process_interval_secs));
        let mut cleanup =
            tokio::time::interval(Duration::from_secs(self.config.cleanup_interval_secs));

        let mut control = match self
            .redis
            .subscribe(&[channels::DLQ_RETRY, channels::DLQ_ARCHIVE, channels::DLQ_CLEAR])
            .await
        {
            Ok(subscription) => Some(subscription),
            Err(err) => {
                warn!("DLQ control channel unavailable: {}", err);
                None
            }
        };

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    if let Err(err) = self.tick().await {
                        error!("DLQ pass failed: {}", err);
                    }
                }
                _ = cleanup.tick() => {
                    if let Err(err) = self.cleanup().await {
                        error!("DLQ cleanup failed: {}", err);
                    }
                }
                message = next_control(&mut control), if control.is_some() => {
                    match message {
                        Some((channel, payload)) => self.handle_control(&channel, &payload).await,
                        None => control = None,
                    }
                }
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        info!("DLQ manager shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// One processing pass: drain due retries, then classify a batch
    /// from each model DLQ.
    pub async fn tick(&self) -> Result<TickStats> {
        self.in_flight.lock().clear();

        let mut stats = TickStats {
            drained: self.drain_scheduled().await?,
            ..TickStats::default()
        };

        for model in self.models.clone() {
            self.process_dlq(model, &mut stats).await?;
        }

        if stats != TickStats::default() {
            debug!(
                "DLQ pass: {} drained, {} retried, {} archived, {} permanent",
                stats.drained, stats.retried, stats.archived, stats.permanent
            );
        }
        Ok(stats)
    }

    async fn process_dlq(&self, model: ModelId, stats: &mut TickStats) -> Result<()> {
        let dlq_key = keyspace::dlq(model);
        let batch = self
            .redis
            .list_range(&dlq_key, 0, self.config.batch_size as isize - 1)
            .await?;

        for payload in batch {
            let Ok(task) = Task::from_json(&payload) else {
                warn!("Unparseable DLQ entry on {}; moving to failure log", dlq_key);
                self.redis.list_remove(&dlq_key, 1, &payload).await?;
                self.redis.list_push(keyspace::FAILURE_LOG, &payload).await?;
                continue;
            };

            if !self.in_flight.lock().insert(task.dlq_fingerprint()) {
                continue;
            }

            match self.process_entry(model, &payload, task, stats).await {
                Ok(()) => {}
                Err(err) => error!("Failed to process DLQ entry on {}: {}", dlq_key, err),
            }
        }
        Ok(())
    }

    async fn process_entry(
        &self,
        model: ModelId,
        payload: &str,
        task: Task,
        stats: &mut TickStats,
    ) -> Result<()> {
        match strategy::evaluate(&task, &self.config, now_ms()) {
            Disposition::Archive { reason } => {
                self.redis.list_remove(&keyspace::dlq(model), 1, payload).await?;
                self.log_failure(&task, model, reason).await?;
                self.archive_task(model, task, reason).await?;
                stats.archived += 1;
            }
            Disposition::Permanent => {
                self.redis.list_remove(&keyspace::dlq(model), 1, payload).await?;
                self.log_failure(&task, model, "permanent").await?;
                self.permanent_failure(model, task).await?;
                stats.permanent += 1;
            }
            Disposition::Retry { kind, delay_ms } => {
                self.log_failure(&task, model, "retry").await?;
                self.execute_retry(model, payload, task, kind, delay_ms)
                    .await?;
                stats.retried += 1;
            }
        }
        Ok(())
    }

    /// Retry execution: single-entry removal, mutation, then durable
    /// scheduling. Any error after removal re-inserts the original
    /// payload at the DLQ tail so the task cannot be lost.
    async fn execute_retry(
        &self,
        model: ModelId,
        payload: &str,
        mut task: Task,
        kind: FailureKind,
        delay_ms: u64,
    ) -> Result<()> {
        let removed = self
            .redis
            .list_remove(&keyspace::dlq(model), 1, payload)
            .await?;
        if removed == 0 {
            // Someone else (manual op, concurrent manager) took it
            return Ok(());
        }

        let queue = strategy::apply_mutation(kind, &mut task);
        task.retries += 1;
        task.last_retry_at = Some(now_ms());
        task.failure = None;
        task.retry_strategy = Some(kind.to_string());
        task.dlq_processed = Some(true);

        match self.schedule_retry(queue, task, delay_ms).await {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!("Retry scheduling failed, re-inserting at DLQ tail: {}", err);
                self.redis
                    .list_push_tail(&keyspace::dlq(model), payload)
                    .await?;
                Ok(())
            }
        }
    }

    /// Force a retry regardless of the classifier verdict
    pub async fn manual_retry(&self, model: ModelId, task_id: &str) -> Result<()> {
        let payload = self
            .redis
            .list_remove_by_id(&keyspace::dlq(model), task_id)
            .await?
            .ok_or_else(|| {
                OrchestratorError::NotFound(format!("task {} not in dlq:{}", task_id, model))
            })?;
        let mut task = Task::from_json(&payload)?;

        let queue = strategy::original_queue_model(&task);
        task.retries += 1;
        task.last_retry_at = Some(now_ms());
        task.failure = None;
        task.retry_strategy = Some("manual".to_string());
        task.dlq_processed = Some(true);

        info!("Manual retry of {} into queue:{}", task.id, queue);
        self.schedule_retry(queue, task, 0).await?;
        self.drain_scheduled().await?;
        Ok(())
    }

    /// Archive a single entry with reason `manual_archive`
    pub async fn manual_archive(&self, model: ModelId, task_id: &str) -> Result<()> {
        let payload = self
            .redis
            .list_remove_by_id(&keyspace::dlq(model), task_id)
            .await?
            .ok_or_else(|| {
                OrchestratorError::NotFound(format!("task {} not in dlq:{}", task_id, model))
            })?;
        let task = Task::from_json(&payload)?;
        info!("Manual archive of {}", task.id);
        self.archive_task(model, task, "manual_archive").await
    }

    /// Archive every entry (reason `dlq_cleared`) and remove the
    /// queue. Returns the number of archived entries.
    pub async fn clear(&self, model: ModelId) -> Result<u32> {
        let dlq_key = keyspace::dlq(model);
        let mut cleared = 0;
        while let Some(payload) = self.redis.list_pop(&dlq_key).await? {
            match Task::from_json(&payload) {
                Ok(task) => {
                    self.archive_task(model, task, "dlq_cleared").await?;
                    cleared += 1;
                }
                Err(_) => {
                    self.redis.list_push(keyspace::FAILURE_LOG, &payload).await?;
                }
            }
        }
        self.redis.delete(&dlq_key).await?;
        info!("Cleared dlq:{} ({} entries archived)", model, cleared);
        Ok(cleared)
    }

    async fn handle_control(&self, channel: &str, payload: &str) {
        let request: DlqControl = match serde_json::from_str(payload) {
            Ok(request) => request,
            Err(err) => {
                warn!("Ignoring malformed DLQ control request: {}", err);
                return;
            }
        };

        let result = match channel {
            channels::DLQ_RETRY => match &request.task_id {
                Some(task_id) => self.manual_retry(request.model, task_id).await,
                None => Err(OrchestratorError::NotFound(
                    "retry request without task id".to_string(),
                )),
            },
            channels::DLQ_ARCHIVE => match &request.task_id {
                Some(task_id) => self.manual_archive(request.model, task_id).await,
                None => Err(OrchestratorError::NotFound(
                    "archive request without task id".to_string(),
                )),
            },
            channels::DLQ_CLEAR => self.clear(request.model).await.map(|_| ()),
            other => {
                warn!("Unexpected control channel: {}", other);
                Ok(())
            }
        };

        if let Err(err) = result {
            warn!("DLQ control request on {} failed: {}", channel, err);
        }
    }

    async fn log_failure(&self, task: &Task, model: ModelId, disposition: &str) -> Result<()> {
        let kind = task
            .failure
            .as_ref()
            .map(|f| super::classify::classify(&f.message))
            .unwrap_or(FailureKind::Unknown);
        let entry = FailureLogEntry {
            task_id: &task.id,
            model,
            kind,
            disposition,
            ts: now_ms(),
        };
        self.redis
            .list_push(keyspace::FAILURE_LOG, &serde_json::to_string(&entry)?)
            .await
    }

    /// Move a task to today's archive partition
    pub(super) async fn archive_task(
        &self,
        model: ModelId,
        task: Task,
        reason: &str,
    ) -> Result<()> {
        let now = now_ms();
        let task_id = task.id.clone();
        let record = DlqRecord::archived(task, reason, now);
        let partition = keyspace::archive(model, &today_partition());

        self.redis
            .sorted_set_add(&partition, &serde_json::to_string(&record)?, now as f64)
            .await?;
        self.redis
            .expire(
                &partition,
                self.config.archive_retention_days as u64 * 86_400,
            )
            .await?;

        let event = TaskEvent::TaskArchived {
            id: task_id.clone(),
            reason: reason.to_string(),
            ts: now,
        };
        self.redis
            .publish(channels::TASK_UPDATES, &serde_json::to_string(&event)?)
            .await?;

        info!("Archived task {} ({})", task_id, reason);
        Ok(())
    }
}

/// Await the next control message, or hang forever when the channel is
/// gone (the select arm is disabled in that case).
async fn next_control(
    control: &mut Option<crate::storage::Subscription>,
) -> Option<(String, String)> {
    match control {
        Some(subscription) => subscription.next_message().await,
        None => std::future::pending().await,
    }
}
