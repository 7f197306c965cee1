//! Key selection strategy implementations

use super::rotator::{KeyRotator, SelectedKey};
use crate::config::RotationStrategy;
use crate::core::types::ModelId;
use crate::storage::keyspace;
use crate::utils::error::Result;
use rand::Rng;
use tracing::{debug, warn};

impl KeyRotator {
    /// Select a key for the model using the given strategy.
    ///
    /// Never blocks and never raises for an unhealthy pool; only a
    /// missing or empty pool is an error.
    pub async fn next(&self, model: ModelId, strategy: RotationStrategy) -> Result<SelectedKey> {
        let pool_len = self.pool(model)?.keys.len();

        let (index, degraded) = match strategy {
            RotationStrategy::RoundRobin => (self.round_robin(model, pool_len).await?, false),
            RotationStrategy::LeastUsed => (self.least_used(model, pool_len).await?, false),
            RotationStrategy::Weighted => (self.weighted(model, pool_len).await?, false),
            RotationStrategy::HealthBased => self.health_based(model, pool_len).await?,
        };

        let key = self.pool(model)?.keys[index].clone();
        debug!("Selected key {} for {} via {:?}", index, model, strategy);
        Ok(SelectedKey {
            index,
            key,
            degraded,
        })
    }

    /// Select with the configured default strategy
    pub async fn next_default(&self, model: ModelId) -> Result<SelectedKey> {
        self.next(model, self.config.strategy).await
    }

    /// Monotonic cursor modulo pool size
    async fn round_robin(&self, model: ModelId, pool_len: usize) -> Result<usize> {
        let cursor = self
            .redis
            .increment(&keyspace::rotation_index(model), 1)
            .await?;
        Ok(((cursor - 1).max(0) as usize) % pool_len)
    }

    /// Fewest uses within the rate-limit window
    async fn least_used(&self, model: ModelId, pool_len: usize) -> Result<usize> {
        let mut best = 0usize;
        let mut best_count = usize::MAX;
        for index in 0..pool_len {
            let count = self.usage_count(model, index).await?;
            if count < best_count {
                best = index;
                best_count = count;
            }
        }
        Ok(best)
    }

    /// Sampled by `successRate × (1 / avgLatency)` weight
    async fn weighted(&self, model: ModelId, pool_len: usize) -> Result<usize> {
        let mut weights = Vec::with_capacity(pool_len);
        for index in 0..pool_len {
            let stats = self.key_stats(model, index).await?;
            // Unsampled keys get a neutral weight so they are explored
            let weight = if stats.samples == 0 {
                1.0
            } else {
                stats.success_ema * (1_000.0 / stats.latency_ema_ms.max(1.0))
            };
            weights.push(weight.max(0.0));
        }

        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            // Every key has a zero weight; fall back to the cursor
            return self.round_robin(model, pool_len).await;
        }

        let mut target = rand::thread_rng().gen_range(0.0..total);
        for (index, weight) in weights.iter().enumerate() {
            if target < *weight {
                return Ok(index);
            }
            target -= weight;
        }
        Ok(pool_len - 1)
    }

    /// Healthy keys only, round-robin among them.
    ///
    /// With no healthy key the rotator must not block: it returns key
    /// 0 flagged degraded and leaves recovery to the health TTL.
    async fn health_based(&self, model: ModelId, pool_len: usize) -> Result<(usize, bool)> {
        let mut healthy = Vec::with_capacity(pool_len);
        for index in 0..pool_len {
            if !self.is_unhealthy(model, index).await? {
                healthy.push(index);
            }
        }

        if healthy.is_empty() {
            warn!(
                "No healthy keys for {}; degrading to first key",
                model
            );
            return Ok((0, true));
        }

        let cursor = self
            .redis
            .increment(&keyspace::rotation_index(model), 1)
            .await?;
        let slot = ((cursor - 1).max(0) as usize) % healthy.len();
        Ok((healthy[slot], false))
    }
}
