//! Orchestrator run loop

use crate::config::Config;
use crate::core::coordination::Coordinator;
use crate::core::dispatch::Dispatcher;
use crate::core::types::channels;
use crate::storage::{RedisPool, Subscription};
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Global health sweep and control surface
pub struct Orchestrator {
    pub(super) redis: RedisPool,
    pub(super) config: Arc<Config>,
    pub(super) dispatcher: Dispatcher,
    pub(super) coordinator: Coordinator,
}

impl Orchestrator {
    /// Create an orchestrator. The dispatcher and coordinator it
    /// carries are plain views over the shared data plane, not live
    /// references into other processes.
    pub fn new(redis: RedisPool, config: Arc<Config>) -> Self {
        let dispatcher = Dispatcher::new(redis.clone(), config.queue.clone());
        let coordinator = Coordinator::new(redis.clone(), config.coordination.clone());
        Self {
            redis,
            config,
            dispatcher,
            coordinator,
        }
    }

    /// Run sweeps and serve control commands until shutdown
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Orchestrator started (sweep every {}s)",
            self.config.orchestrator.health_interval_secs
        );

        let mut sweep = tokio::time::interval(Duration::from_secs(
            self.config.orchestrator.health_interval_secs,
        ));

        let mut control = match self.redis.subscribe(&[channels::ORCHESTRATOR_CONTROL]).await {
            Ok(subscription) => Some(subscription),
            Err(err) => {
                warn!("Control channel unavailable: {}", err);
                None
            }
        };

        loop {
            tokio::select! {
                _ = sweep.tick() => {
                    if let Err(err) = self.sweep_once().await {
                        error!("Health sweep failed: {}", err);
                    }
                }
                message = next_control(&mut control), if control.is_some() => {
                    match message {
                        Some((_, payload)) => self.handle_command(&payload).await,
                        None => control = None,
                    }
                }
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        info!("Orchestrator shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// One sweep: health snapshot, then orphan reaping for any model
    /// whose in-flight head has sat past the threshold.
    pub async fn sweep_once(&self) -> Result<()> {
        let health = self.health_sweep().await?;
        if health.score < 1.0 {
            warn!(
                "System health {:.2}: {}/{} agents responsive",
                health.score, health.agents.responsive, health.agents.total
            );
        }

        let threshold = Duration::from_secs(self.config.orchestrator.orphan_threshold_secs);
        let staleness = Duration::from_secs(self.config.queue.orphan_staleness_secs);
        for model in &self.config.models.active {
            let Some(age) = self.dispatcher.processing_head_age(*model).await? else {
                continue;
            };
            if age > threshold {
                let reaped = self.dispatcher.reap_orphans(*model, staleness).await?;
                if reaped > 0 {
                    info!("Reaped {} orphans from processing:{}", reaped, model);
                }
            }
        }
        Ok(())
    }
}

/// Await the next control message, or hang forever when the channel is
/// gone (the select arm is disabled in that case).
async fn next_control(control: &mut Option<Subscription>) -> Option<(String, String)> {
    match control {
        Some(subscription) => subscription.next_message().await,
        None => std::future::pending().await,
    }
}
