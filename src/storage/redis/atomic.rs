//! Redis atomic counters

use super::pool::RedisPool;
use crate::utils::error::{OrchestratorError, Result};
use redis::AsyncCommands;

impl RedisPool {
    /// Increment key value by delta, returning the new value
    pub async fn increment(&self, key: &str, delta: i64) -> Result<i64> {
        if self.noop_mode {
            return Ok(delta);
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let new_value: i64 = c.incr(key, delta).await.map_err(OrchestratorError::Redis)?;
            Ok(new_value)
        } else {
            Ok(delta)
        }
    }

    /// Increment a float key by delta, returning the new value
    pub async fn increment_float(&self, key: &str, delta: f64) -> Result<f64> {
        if self.noop_mode {
            return Ok(delta);
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let new_value: f64 = redis::cmd("INCRBYFLOAT")
                .arg(key)
                .arg(delta)
                .query_async(c)
                .await
                .map_err(OrchestratorError::Redis)?;
            Ok(new_value)
        } else {
            Ok(delta)
        }
    }
}
