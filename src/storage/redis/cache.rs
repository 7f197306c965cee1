//! Basic Redis key operations

use super::pool::RedisPool;
use crate::utils::error::{OrchestratorError, Result};
use redis::{AsyncCommands, RedisResult};

impl RedisPool {
    /// Get a value
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        if self.noop_mode {
            return Ok(None);
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let result: RedisResult<String> = c.get(key).await;
            match result {
                Ok(value) => Ok(Some(value)),
                Err(e) if e.kind() == redis::ErrorKind::TypeError => Ok(None),
                Err(e) => Err(OrchestratorError::Redis(e)),
            }
        } else {
            Ok(None)
        }
    }

    /// Set a key-value pair with optional TTL in seconds
    pub async fn set(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<()> {
        if self.noop_mode {
            return Ok(());
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            if let Some(ttl_seconds) = ttl {
                let _: () = c
                    .set_ex(key, value, ttl_seconds)
                    .await
                    .map_err(OrchestratorError::Redis)?;
            } else {
                let _: () = c.set(key, value).await.map_err(OrchestratorError::Redis)?;
            }
        }
        Ok(())
    }

    /// SET NX EX: set only when absent, with a TTL in seconds.
    /// Returns true when this call created the key.
    pub async fn set_nx_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<bool> {
        if self.noop_mode {
            return Ok(true);
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let created: Option<String> = redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("NX")
                .arg("EX")
                .arg(ttl_secs)
                .query_async(c)
                .await
                .map_err(OrchestratorError::Redis)?;
            Ok(created.is_some())
        } else {
            Ok(true)
        }
    }

    /// SET NX PX: set only when absent, with a TTL in milliseconds.
    /// Returns true when this call created the key.
    pub async fn set_nx_px(&self, key: &str, value: &str, ttl_ms: u64) -> Result<bool> {
        if self.noop_mode {
            return Ok(true);
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let created: Option<String> = redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("NX")
                .arg("PX")
                .arg(ttl_ms)
                .query_async(c)
                .await
                .map_err(OrchestratorError::Redis)?;
            Ok(created.is_some())
        } else {
            Ok(true)
        }
    }

    /// Delete a key
    pub async fn delete(&self, key: &str) -> Result<()> {
        if self.noop_mode {
            return Ok(());
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let _: () = c.del(key).await.map_err(OrchestratorError::Redis)?;
        }
        Ok(())
    }

    /// Check if a key exists
    pub async fn exists(&self, key: &str) -> Result<bool> {
        if self.noop_mode {
            return Ok(false);
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let exists: bool = c.exists(key).await.map_err(OrchestratorError::Redis)?;
            Ok(exists)
        } else {
            Ok(false)
        }
    }

    /// Set expiration time for a key, in seconds
    pub async fn expire(&self, key: &str, ttl: u64) -> Result<()> {
        if self.noop_mode {
            return Ok(());
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let _: () = c
                .expire(key, ttl as i64)
                .await
                .map_err(OrchestratorError::Redis)?;
        }
        Ok(())
    }

    /// Get time to live for a key
    pub async fn ttl(&self, key: &str) -> Result<i64> {
        if self.noop_mode {
            return Ok(-2); // Key does not exist
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let ttl: i64 = c.ttl(key).await.map_err(OrchestratorError::Redis)?;
            Ok(ttl)
        } else {
            Ok(-2)
        }
    }
}
