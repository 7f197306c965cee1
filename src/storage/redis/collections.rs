//! Redis list operations and key scanning

use super::pool::RedisPool;
use crate::utils::error::{OrchestratorError, Result};
use redis::{AsyncCommands, RedisResult};

impl RedisPool {
    /// Push value to the head of a list (left push)
    pub async fn list_push(&self, key: &str, value: &str) -> Result<()> {
        if self.noop_mode {
            return Ok(());
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let _: () = c.lpush(key, value).await.map_err(OrchestratorError::Redis)?;
        }
        Ok(())
    }

    /// Push value to the tail of a list (right push)
    pub async fn list_push_tail(&self, key: &str, value: &str) -> Result<()> {
        if self.noop_mode {
            return Ok(());
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let _: () = c.rpush(key, value).await.map_err(OrchestratorError::Redis)?;
        }
        Ok(())
    }

    /// Pop value from the tail of a list (right pop)
    pub async fn list_pop(&self, key: &str) -> Result<Option<String>> {
        if self.noop_mode {
            return Ok(None);
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let result: RedisResult<String> = c.rpop(key, None).await;
            match result {
                Ok(value) => Ok(Some(value)),
                Err(e) if e.kind() == redis::ErrorKind::TypeError => Ok(None),
                Err(e) => Err(OrchestratorError::Redis(e)),
            }
        } else {
            Ok(None)
        }
    }

    /// Get list length
    pub async fn list_length(&self, key: &str) -> Result<usize> {
        if self.noop_mode {
            return Ok(0);
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let len: usize = c.llen(key).await.map_err(OrchestratorError::Redis)?;
            Ok(len)
        } else {
            Ok(0)
        }
    }

    /// Get list range
    pub async fn list_range(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        if self.noop_mode {
            return Ok(vec![]);
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let values: Vec<String> = c
                .lrange(key, start, stop)
                .await
                .map_err(OrchestratorError::Redis)?;
            Ok(values)
        } else {
            Ok(vec![])
        }
    }

    /// Remove up to `count` occurrences of `value` from a list.
    /// Returns the number of removed entries.
    pub async fn list_remove(&self, key: &str, count: isize, value: &str) -> Result<usize> {
        if self.noop_mode {
            return Ok(0);
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let removed: usize = c
                .lrem(key, count, value)
                .await
                .map_err(OrchestratorError::Redis)?;
            Ok(removed)
        } else {
            Ok(0)
        }
    }

    /// Trim a list to the given inclusive range
    pub async fn list_trim(&self, key: &str, start: isize, stop: isize) -> Result<()> {
        if self.noop_mode {
            return Ok(());
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let _: () = c
                .ltrim(key, start, stop)
                .await
                .map_err(OrchestratorError::Redis)?;
        }
        Ok(())
    }

    /// Collect keys matching a glob pattern via SCAN
    pub async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>> {
        if self.noop_mode {
            return Ok(vec![]);
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let mut keys = Vec::new();
            let mut cursor: u64 = 0;
            loop {
                let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                    .arg(cursor)
                    .arg("MATCH")
                    .arg(pattern)
                    .arg("COUNT")
                    .arg(100)
                    .query_async(c)
                    .await
                    .map_err(OrchestratorError::Redis)?;
                keys.extend(batch);
                cursor = next;
                if cursor == 0 {
                    break;
                }
            }
            Ok(keys)
        } else {
            Ok(vec![])
        }
    }
}
