//! Redis Hash and Sorted Set operations

use super::pool::RedisPool;
use crate::utils::error::{OrchestratorError, Result};
use redis::{AsyncCommands, RedisResult};
use std::collections::HashMap;

impl RedisPool {
    // ===== Hash operations =====

    /// Set hash field value
    pub async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<()> {
        if self.noop_mode {
            return Ok(());
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let _: () = c
                .hset(key, field, value)
                .await
                .map_err(OrchestratorError::Redis)?;
        }
        Ok(())
    }

    /// Set multiple hash fields in one round trip
    pub async fn hash_set_multiple(&self, key: &str, fields: &[(&str, String)]) -> Result<()> {
        if self.noop_mode {
            return Ok(());
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let _: () = c
                .hset_multiple(key, fields)
                .await
                .map_err(OrchestratorError::Redis)?;
        }
        Ok(())
    }

    /// Increment an integer hash field, returning the new value
    pub async fn hash_increment(&self, key: &str, field: &str, delta: i64) -> Result<i64> {
        if self.noop_mode {
            return Ok(delta);
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let new_value: i64 = c
                .hincr(key, field, delta)
                .await
                .map_err(OrchestratorError::Redis)?;
            Ok(new_value)
        } else {
            Ok(delta)
        }
    }

    /// Get hash field value
    pub async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>> {
        if self.noop_mode {
            return Ok(None);
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let result: RedisResult<String> = c.hget(key, field).await;
            match result {
                Ok(value) => Ok(Some(value)),
                Err(e) if e.kind() == redis::ErrorKind::TypeError => Ok(None),
                Err(e) => Err(OrchestratorError::Redis(e)),
            }
        } else {
            Ok(None)
        }
    }

    /// Get all hash fields and values
    pub async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>> {
        if self.noop_mode {
            return Ok(HashMap::new());
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let hash: HashMap<String, String> =
                c.hgetall(key).await.map_err(OrchestratorError::Redis)?;
            Ok(hash)
        } else {
            Ok(HashMap::new())
        }
    }

    // ===== Sorted Set operations =====

    /// Add member to sorted set with score
    pub async fn sorted_set_add(&self, key: &str, member: &str, score: f64) -> Result<()> {
        if self.noop_mode {
            return Ok(());
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let _: () = c
                .zadd(key, member, score)
                .await
                .map_err(OrchestratorError::Redis)?;
        }
        Ok(())
    }

    /// Sorted set cardinality
    pub async fn sorted_set_len(&self, key: &str) -> Result<usize> {
        if self.noop_mode {
            return Ok(0);
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let len: usize = c.zcard(key).await.map_err(OrchestratorError::Redis)?;
            Ok(len)
        } else {
            Ok(0)
        }
    }

    /// Count members with scores within `[min, max]`
    pub async fn sorted_set_count(&self, key: &str, min: f64, max: f64) -> Result<usize> {
        if self.noop_mode {
            return Ok(0);
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let count: usize = c
                .zcount(key, min, max)
                .await
                .map_err(OrchestratorError::Redis)?;
            Ok(count)
        } else {
            Ok(0)
        }
    }

    /// Members with scores within `[min, max]`, ascending
    pub async fn sorted_set_range_by_score(
        &self,
        key: &str,
        min: f64,
        max: f64,
    ) -> Result<Vec<String>> {
        if self.noop_mode {
            return Ok(vec![]);
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let members: Vec<String> = c
                .zrangebyscore(key, min, max)
                .await
                .map_err(OrchestratorError::Redis)?;
            Ok(members)
        } else {
            Ok(vec![])
        }
    }

    /// Remove a member from a sorted set
    pub async fn sorted_set_remove(&self, key: &str, member: &str) -> Result<()> {
        if self.noop_mode {
            return Ok(());
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let _: () = c.zrem(key, member).await.map_err(OrchestratorError::Redis)?;
        }
        Ok(())
    }

    /// Remove members with scores within `[min, max]`.
    /// Returns the number removed.
    pub async fn sorted_set_remove_by_score(&self, key: &str, min: f64, max: f64) -> Result<usize> {
        if self.noop_mode {
            return Ok(0);
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let removed: usize = c
                .zrembyscore(key, min, max)
                .await
                .map_err(OrchestratorError::Redis)?;
            Ok(removed)
        } else {
            Ok(0)
        }
    }

    /// Remove members by rank range (0 = lowest score).
    /// Returns the number removed.
    pub async fn sorted_set_remove_by_rank(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> Result<usize> {
        if self.noop_mode {
            return Ok(0);
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let removed: usize = c
                .zremrangebyrank(key, start, stop)
                .await
                .map_err(OrchestratorError::Redis)?;
            Ok(removed)
        } else {
            Ok(0)
        }
    }
}
