//! Key rotator core: outcome recording, health, and rate-limit windows

use crate::config::{KeyPoolConfig, RotationConfig};
use crate::core::types::ModelId;
use crate::storage::{RedisPool, keyspace};
use crate::utils::error::{OrchestratorError, Result};
use crate::utils::time::now_ms;
use tracing::{debug, warn};
use uuid::Uuid;

/// Success-EMA floor for the unhealthy → healthy transition
const RECOVERY_SUCCESS_EMA: f64 = 0.8;
/// Minimum samples before a key may recover
const RECOVERY_MIN_SAMPLES: u64 = 10;
/// EMA smoothing denominator cap
const EMA_SAMPLE_CAP: u64 = 100;

/// A selected credential
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedKey {
    /// Index into the model's pool
    pub index: usize,
    /// The credential; never logged
    pub key: String,
    /// True when health-based selection found no healthy key and fell
    /// back to key 0
    pub degraded: bool,
}

/// Per-key performance snapshot read from the data plane
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyStats {
    /// Success-rate EMA in [0, 1]
    pub success_ema: f64,
    /// Latency EMA in milliseconds
    pub latency_ema_ms: f64,
    /// Outcome sample count
    pub samples: u64,
}

/// API-key rotator over per-model pools
#[derive(Clone)]
pub struct KeyRotator {
    pub(super) redis: RedisPool,
    pub(super) config: RotationConfig,
}

impl KeyRotator {
    /// Create a rotator over the configured pools
    pub fn new(redis: RedisPool, config: RotationConfig) -> Self {
        Self { redis, config }
    }

    /// The configured pool for a model
    pub(super) fn pool(&self, model: ModelId) -> Result<&KeyPoolConfig> {
        self.config
            .pools
            .get(&model)
            .filter(|pool| !pool.keys.is_empty())
            .ok_or_else(|| OrchestratorError::NoKeys(model.to_string()))
    }

    /// Pool size for a model; zero when unconfigured
    pub fn pool_size(&self, model: ModelId) -> usize {
        self.config
            .pools
            .get(&model)
            .map(|pool| pool.keys.len())
            .unwrap_or(0)
    }

    /// Next candidate model along the static fallback chain
    pub fn fallback(model: ModelId) -> Option<ModelId> {
        model.fallback()
    }

    /// Record a request outcome, updating the key's EMAs.
    ///
    /// Smoothing uses `α = 1 / (min(samples, cap) + 1)`, so early
    /// samples move the average quickly and late samples refine it.
    /// A key whose success EMA reaches the recovery floor over enough
    /// samples is cleared back to healthy.
    ///
    /// Errors here are logged and dropped by callers — the pool never
    /// blocks on bookkeeping.
    pub async fn record_outcome(
        &self,
        model: ModelId,
        index: usize,
        success: bool,
        latency_ms: u64,
    ) -> Result<()> {
        let samples = self
            .redis
            .increment_float(&keyspace::perf(model, index, "count"), 1.0)
            .await? as u64;
        let alpha = 1.0 / (samples.min(EMA_SAMPLE_CAP) as f64 + 1.0);

        let success_value = if success { 1.0 } else { 0.0 };
        let success_ema = self
            .update_ema(&keyspace::perf(model, index, "success"), success_value, alpha)
            .await?;
        self.update_ema(
            &keyspace::perf(model, index, "latency"),
            latency_ms as f64,
            alpha,
        )
        .await?;

        if success_ema >= RECOVERY_SUCCESS_EMA && samples >= RECOVERY_MIN_SAMPLES {
            self.redis
                .set(&keyspace::key_health(model, index), "healthy", None)
                .await?;
        }

        debug!(
            "Recorded outcome for {}:{}: success={} latency={}ms ema={:.3}",
            model, index, success, latency_ms, success_ema
        );
        Ok(())
    }

    async fn update_ema(&self, key: &str, value: f64, alpha: f64) -> Result<f64> {
        let previous = self
            .redis
            .get(key)
            .await?
            .and_then(|raw| raw.parse::<f64>().ok());
        let next = match previous {
            Some(prior) => prior + alpha * (value - prior),
            None => value,
        };
        self.redis.set(key, &format!("{:.6}", next), None).await?;
        Ok(next)
    }

    /// Mark a key unhealthy for at least `ttl_secs`.
    ///
    /// Health-based selection skips it until the TTL lapses or the
    /// recovery predicate clears it.
    pub async fn mark_unhealthy(
        &self,
        model: ModelId,
        index: usize,
        reason: &str,
        ttl_secs: u64,
    ) -> Result<()> {
        warn!("Marking key {}:{} unhealthy: {}", model, index, reason);
        self.redis
            .set(
                &keyspace::key_health(model, index),
                "unhealthy",
                Some(ttl_secs),
            )
            .await
    }

    /// Read a key's performance snapshot
    pub async fn key_stats(&self, model: ModelId, index: usize) -> Result<KeyStats> {
        let read = |raw: Option<String>| raw.and_then(|v| v.parse::<f64>().ok()).unwrap_or(0.0);
        let success_ema = read(self.redis.get(&keyspace::perf(model, index, "success")).await?);
        let latency_ema_ms = read(self.redis.get(&keyspace::perf(model, index, "latency")).await?);
        let samples = read(self.redis.get(&keyspace::perf(model, index, "count")).await?) as u64;
        Ok(KeyStats {
            success_ema,
            latency_ema_ms,
            samples,
        })
    }

    /// Whether the key is currently marked unhealthy
    pub(super) async fn is_unhealthy(&self, model: ModelId, index: usize) -> Result<bool> {
        Ok(self
            .redis
            .get(&keyspace::key_health(model, index))
            .await?
            .as_deref()
            == Some("unhealthy"))
    }

    /// Record one use of a key in its sliding rate-limit window
    pub async fn record_usage(&self, model: ModelId, index: usize) -> Result<()> {
        let key = keyspace::usage(model, index);
        let now = now_ms();
        self.redis
            .sorted_set_add(&key, &Uuid::new_v4().to_string(), now as f64)
            .await?;
        // Bound key lifetime so idle windows do not linger
        self.redis.expire(&key, self.config.window_secs * 2).await
    }

    /// Count uses within the current window, pruning expired entries
    pub(super) async fn usage_count(&self, model: ModelId, index: usize) -> Result<usize> {
        let key = keyspace::usage(model, index);
        let cutoff = now_ms() - (self.config.window_secs as i64) * 1000;
        self.redis
            .sorted_set_remove_by_score(&key, f64::MIN, cutoff as f64)
            .await?;
        self.redis.sorted_set_len(&key).await
    }

    /// Whether the key has exhausted its rate-limit window.
    ///
    /// Rate-limited is not unhealthy: the caller may pick another key
    /// or model while this key's window drains.
    pub async fn is_rate_limited(&self, model: ModelId, index: usize) -> Result<bool> {
        let pool = self.pool(model)?;
        let used = self.usage_count(model, index).await?;
        Ok(used >= pool.rpm as usize)
    }
}
