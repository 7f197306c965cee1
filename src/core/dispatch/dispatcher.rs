//! Enqueue, claim, complete, and fail

use crate::config::QueueConfig;
use crate::core::dlq::classify;
use crate::core::types::{FailureInfo, ModelId, Task, TaskEvent, channels};
use crate::storage::{RedisPool, keyspace};
use crate::utils::error::{OrchestratorError, Result};
use crate::utils::time::now_ms;
use serde::Serialize;
use tracing::{debug, info};

/// Depth snapshot for one model's queues
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueueDepths {
    /// Pending tasks across all four lanes
    pub pending: usize,
    /// In-flight tasks
    pub processing: usize,
    /// Tasks awaiting DLQ classification
    pub dlq: usize,
}

/// Queue dispatcher over the shared data plane
#[derive(Clone)]
pub struct Dispatcher {
    pub(super) redis: RedisPool,
    pub(super) config: QueueConfig,
}

impl Dispatcher {
    /// Create a dispatcher
    pub fn new(redis: RedisPool, config: QueueConfig) -> Self {
        Self { redis, config }
    }

    /// Ingest a task into its priority lane.
    ///
    /// Sets `original_queue` on first ingest. Idempotent on task id
    /// within the de-duplication window: duplicates are silently
    /// dropped and the call returns false.
    pub async fn enqueue(&self, mut task: Task) -> Result<bool> {
        if task.original_queue.is_none() {
            task.original_queue = Some(keyspace::queue(task.target_model));
        }

        let fresh = self
            .redis
            .set_nx_ex(&keyspace::dedupe(&task.id), "1", self.config.dedup_window_secs)
            .await?;
        if !fresh {
            debug!("Dropping duplicate ingest of task {}", task.id);
            return Ok(false);
        }

        let lane = keyspace::lane(task.target_model, task.priority);
        self.redis.list_push(&lane, &task.to_json()?).await?;

        self.publish_event(&TaskEvent::TaskQueued {
            id: task.id.clone(),
            model: task.target_model,
            priority: task.priority,
            ts: now_ms(),
        })
        .await?;

        debug!("Enqueued task {} into {}", task.id, lane);
        Ok(true)
    }

    /// Push a task straight into its lane, bypassing ingest
    /// de-duplication. Used by DLQ retries and orphan recovery, whose
    /// task ids are deliberately re-used.
    pub(crate) async fn requeue(&self, task: &Task, queue_model: ModelId) -> Result<()> {
        let lane = keyspace::lane(queue_model, task.priority);
        self.redis.list_push(&lane, &task.to_json()?).await
    }

    /// Atomically claim the highest-priority pending task.
    ///
    /// Pop-from-pending and push-to-processing are a single step on
    /// the data plane, so a claimer crash cannot lose the task or
    /// leave it visible in both places. Returns None when every lane
    /// is empty or dispatch is paused.
    pub async fn claim(&self, model: ModelId, agent_id: &str) -> Result<Option<Task>> {
        if self.is_paused().await? {
            return Ok(None);
        }

        let lanes = keyspace::lanes(model);
        let payload = self
            .redis
            .claim_task(&lanes, &keyspace::processing(model), agent_id)
            .await?;

        let Some(payload) = payload else {
            return Ok(None);
        };
        let task = Task::from_json(&payload)?;

        self.publish_event(&TaskEvent::TaskClaimed {
            id: task.id.clone(),
            model,
            agent: agent_id.to_string(),
            ts: now_ms(),
        })
        .await?;

        debug!("Agent {} claimed task {} from {}", agent_id, task.id, model);
        Ok(Some(task))
    }

    /// Acknowledge successful completion, removing the task from the
    /// in-flight list.
    pub async fn complete(&self, task: &Task) -> Result<()> {
        let removed = self
            .redis
            .list_remove_by_id(&keyspace::processing(task.target_model), &task.id)
            .await?;
        if removed.is_none() {
            return Err(OrchestratorError::NotFound(format!(
                "task {} not in processing:{}",
                task.id, task.target_model
            )));
        }

        self.publish_event(&TaskEvent::TaskCompleted {
            id: task.id.clone(),
            model: task.target_model,
            agent: task.claimed_by.clone().unwrap_or_default(),
            ts: now_ms(),
        })
        .await?;

        info!("Task {} completed", task.id);
        Ok(())
    }

    /// Report a worker-side failure: the task leaves the in-flight
    /// list, gains failure metadata, and enters its model's DLQ.
    pub async fn fail(&self, task: &Task, message: &str, failed_by: &str) -> Result<()> {
        let removed = self
            .redis
            .list_remove_by_id(&keyspace::processing(task.target_model), &task.id)
            .await?;
        if removed.is_none() {
            return Err(OrchestratorError::NotFound(format!(
                "task {} not in processing:{}",
                task.id, task.target_model
            )));
        }

        let kind = classify::classify(message);
        let mut failed = task.clone();
        failed.failure = Some(FailureInfo {
            kind,
            message: message.to_string(),
            failed_at: now_ms(),
            failed_by: failed_by.to_string(),
        });

        self.redis
            .list_push(&keyspace::dlq(task.target_model), &failed.to_json()?)
            .await?;

        self.publish_event(&TaskEvent::TaskFailed {
            id: task.id.clone(),
            model: task.target_model,
            kind: kind.to_string(),
            ts: now_ms(),
        })
        .await?;

        info!(
            "Task {} failed ({}): routed to dlq:{}",
            task.id, kind, task.target_model
        );
        Ok(())
    }

    /// Depth snapshot across pending lanes, in-flight, and DLQ
    pub async fn depths(&self, model: ModelId) -> Result<QueueDepths> {
        let mut pending = 0;
        for lane in keyspace::lanes(model) {
            pending += self.redis.list_length(&lane).await?;
        }
        Ok(QueueDepths {
            pending,
            processing: self.redis.list_length(&keyspace::processing(model)).await?,
            dlq: self.redis.list_length(&keyspace::dlq(model)).await?,
        })
    }

    /// Stop claims globally (cross-process)
    pub async fn pause(&self) -> Result<()> {
        info!("Pausing dispatch");
        self.redis.set(keyspace::PAUSED, "1", None).await
    }

    /// Resume claims
    pub async fn resume(&self) -> Result<()> {
        info!("Resuming dispatch");
        self.redis.delete(keyspace::PAUSED).await
    }

    /// Whether dispatch is paused
    pub async fn is_paused(&self) -> Result<bool> {
        self.redis.exists(keyspace::PAUSED).await
    }

    pub(super) async fn publish_event(&self, event: &TaskEvent) -> Result<()> {
        self.redis
            .publish(channels::TASK_UPDATES, &serde_json::to_string(event)?)
            .await
    }
}
