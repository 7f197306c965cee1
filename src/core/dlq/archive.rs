//! Permanent failures and archive retention

use super::manager::DlqManager;
use crate::core::types::{AlertEvent, DlqRecord, ModelId, Task, channels};
use crate::storage::keyspace;
use crate::utils::error::Result;
use crate::utils::time::now_ms;
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use tracing::{debug, info, warn};

impl DlqManager {
    /// Record a terminal failure: append to the bounded sink, emit the
    /// alert, and leave the task out of every queue.
    pub(super) async fn permanent_failure(&self, model: ModelId, task: Task) -> Result<()> {
        let now = now_ms();
        let reason = task
            .failure
            .as_ref()
            .map(|f| f.message.clone())
            .unwrap_or_else(|| "unclassified failure".to_string());
        let task_id = task.id.clone();
        let record = DlqRecord::permanent(task, reason.clone(), now);

        self.redis
            .sorted_set_add(
                keyspace::PERMANENT_FAILURES,
                &serde_json::to_string(&record)?,
                now as f64,
            )
            .await?;
        self.trim_permanent_failures().await?;

        let alert = AlertEvent::PermanentFailure {
            task_id: task_id.clone(),
            model,
            reason,
            ts: now,
        };
        self.redis
            .publish(
                channels::ALERT_PERMANENT_FAILURE,
                &serde_json::to_string(&alert)?,
            )
            .await?;

        warn!("Task {} permanently failed", task_id);
        Ok(())
    }

    /// Keep only the most recent `permanent_failure_limit` entries
    async fn trim_permanent_failures(&self) -> Result<()> {
        let keep = self.config.permanent_failure_limit as isize;
        self.redis
            .sorted_set_remove_by_rank(keyspace::PERMANENT_FAILURES, 0, -(keep + 1))
            .await?;
        Ok(())
    }

    /// Hourly sweep: delete archive partitions past retention and trim
    /// the permanent-failures sink. Partition TTLs normally handle
    /// expiry; the sweep catches partitions written before a retention
    /// change.
    pub async fn cleanup(&self) -> Result<()> {
        let cutoff = Utc::now().date_naive()
            - ChronoDuration::days(self.config.archive_retention_days as i64);

        let partitions = self.redis.scan_keys("archive:dlq:*").await?;
        let mut deleted = 0;
        for key in partitions {
            let Some(date) = key
                .rsplit(':')
                .next()
                .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
            else {
                continue;
            };
            if date < cutoff {
                self.redis.delete(&key).await?;
                deleted += 1;
            }
        }

        self.trim_permanent_failures().await?;

        if deleted > 0 {
            info!("Cleanup removed {} expired archive partitions", deleted);
        } else {
            debug!("Cleanup pass: nothing to remove");
        }
        Ok(())
    }

    /// Read one day's archived records for a model
    pub async fn archived_tasks(&self, model: ModelId, date: &str) -> Result<Vec<DlqRecord>> {
        let raw = self
            .redis
            .sorted_set_range_by_score(&keyspace::archive(model, date), f64::MIN, f64::MAX)
            .await?;
        let mut records = Vec::with_capacity(raw.len());
        for entry in raw {
            records.push(serde_json::from_str(&entry)?);
        }
        Ok(records)
    }

    /// Read the permanent-failure sink, oldest first
    pub async fn permanent_failures(&self) -> Result<Vec<DlqRecord>> {
        let raw = self
            .redis
            .sorted_set_range_by_score(keyspace::PERMANENT_FAILURES, f64::MIN, f64::MAX)
            .await?;
        let mut records = Vec::with_capacity(raw.len());
        for entry in raw {
            records.push(serde_json::from_str(&entry)?);
        }
        Ok(records)
    }
}
