//! Queue depth rebalancing
//!
//! When one model's pending depth runs far ahead of its fallback peer,
//! tasks move across using the same model rewrite the parse strategy
//! applies. Only the least-urgent work moves: lanes drain in reverse
//! dispatch order, and the critical lane never migrates.

use super::runner::Orchestrator;
use crate::core::types::{ModelId, Priority, Task, TaskEvent};
use crate::storage::keyspace;
use crate::utils::error::Result;
use crate::utils::time::now_ms;
use tracing::{debug, info};

impl Orchestrator {
    /// Rebalance one model, or every active model. Returns the number
    /// of moved tasks.
    pub async fn rebalance(&self, only: Option<ModelId>) -> Result<u32> {
        let targets: Vec<ModelId> = match only {
            Some(model) => vec![model],
            None => self.config.models.active.clone(),
        };

        let mut moved = 0;
        for model in targets {
            moved += self.rebalance_model(model).await?;
        }
        Ok(moved)
    }

    async fn rebalance_model(&self, model: ModelId) -> Result<u32> {
        let Some(peer) = model.fallback() else {
            return Ok(0);
        };
        if !self.config.models.active.contains(&peer) {
            return Ok(0);
        }

        let depth = self.dispatcher.depths(model).await?.pending;
        let peer_depth = self.dispatcher.depths(peer).await?.pending;
        let delta = self.config.orchestrator.rebalance_depth_delta;
        if depth < peer_depth.saturating_add(delta) {
            debug!(
                "No rebalance for {} ({} pending vs peer {})",
                model, depth, peer_depth
            );
            return Ok(0);
        }

        let mut moved = 0;
        'outer: for priority in [Priority::Low, Priority::Medium, Priority::High] {
            let lane = keyspace::lane(model, priority);
            while moved < self.config.orchestrator.rebalance_batch as u32 {
                let Some(payload) = self.redis.list_pop(&lane).await? else {
                    break;
                };
                let Ok(mut task) = Task::from_json(&payload) else {
                    // Not ours to interpret; put it back where it was
                    self.redis.list_push_tail(&lane, &payload).await?;
                    break;
                };

                task.target_model = peer;
                task.fallback_used = Some(true);

                self.redis
                    .list_push(&keyspace::lane(peer, task.priority), &task.to_json()?)
                    .await?;

                let event = TaskEvent::TaskQueued {
                    id: task.id.clone(),
                    model: peer,
                    priority: task.priority,
                    ts: now_ms(),
                };
                self.redis
                    .publish(
                        crate::core::types::channels::TASK_UPDATES,
                        &serde_json::to_string(&event)?,
                    )
                    .await?;
                moved += 1;
            }
            if moved >= self.config.orchestrator.rebalance_batch as u32 {
                break 'outer;
            }
        }

        if moved > 0 {
            info!("Rebalanced {} tasks from {} to {}", moved, model, peer);
        }
        Ok(moved)
    }
}
