//! Lua scripts for the cross-process serialization points
//!
//! Three scripts cover every multi-step mutation that must be atomic:
//! the reliable-queue claim, the owner-checked lock release, and
//! id-addressed removal from a task list. Everything else is a single
//! Redis command and needs no script.

use super::pool::RedisPool;
use crate::utils::error::{OrchestratorError, Result};
use once_cell::sync::Lazy;
use redis::Script;

/// Pop from the highest non-empty priority lane, annotate the payload
/// with the claimer and claim time, and push it onto the processing
/// list — one atomic step, so a task is never visible as both pending
/// and in-flight and never lost if the claimer crashes before
/// observing the return.
///
/// KEYS[1..4] = priority lanes in dispatch order, KEYS[5] = processing
/// list. ARGV[1] = claiming agent id. Returns the annotated payload or
/// false when every lane is empty.
static CLAIM: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
for i = 1, 4 do
    local payload = redis.call('RPOP', KEYS[i])
    if payload then
        local ok, task = pcall(cjson.decode, payload)
        if not ok then
            -- Malformed entry: park it in processing untouched so the
            -- orphan reaper can surface it rather than losing it.
            redis.call('LPUSH', KEYS[5], payload)
            return payload
        end
        local t = redis.call('TIME')
        task['claimedBy'] = ARGV[1]
        task['claimedAt'] = t[1] * 1000 + math.floor(t[2] / 1000)
        local annotated = cjson.encode(task)
        redis.call('LPUSH', KEYS[5], annotated)
        return annotated
    end
end
return false
"#,
    )
});

/// Delete a lock key only when its value equals the caller's owner id.
/// KEYS[1] = lock key, ARGV[1] = owner. Returns 1 on release, 0 on
/// owner mismatch or missing key.
static RELEASE_LOCK: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('DEL', KEYS[1])
else
    return 0
end
"#,
    )
});

/// Remove the single entry whose decoded `id` equals ARGV[1] from the
/// list at KEYS[1]. Returns the removed payload or false.
static REMOVE_BY_ID: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
local entries = redis.call('LRANGE', KEYS[1], 0, -1)
for i, payload in ipairs(entries) do
    local ok, task = pcall(cjson.decode, payload)
    if ok and task['id'] == ARGV[1] then
        redis.call('LREM', KEYS[1], 1, payload)
        return payload
    end
end
return false
"#,
    )
});

impl RedisPool {
    /// Atomic reliable-queue claim across priority lanes.
    /// Returns the annotated task payload, or None when all lanes are
    /// empty.
    pub async fn claim_task(
        &self,
        lanes: &[String; 4],
        processing_key: &str,
        agent_id: &str,
    ) -> Result<Option<String>> {
        if self.noop_mode {
            return Ok(None);
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let payload: Option<String> = CLAIM
                .key(&lanes[0])
                .key(&lanes[1])
                .key(&lanes[2])
                .key(&lanes[3])
                .key(processing_key)
                .arg(agent_id)
                .invoke_async(c)
                .await
                .map_err(OrchestratorError::Redis)?;
            Ok(payload)
        } else {
            Ok(None)
        }
    }

    /// Owner-checked lock release. Returns true when the lock was held
    /// by `owner` and has been deleted.
    pub async fn release_lock(&self, lock_key: &str, owner: &str) -> Result<bool> {
        if self.noop_mode {
            return Ok(true);
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let released: i64 = RELEASE_LOCK
                .key(lock_key)
                .arg(owner)
                .invoke_async(c)
                .await
                .map_err(OrchestratorError::Redis)?;
            Ok(released == 1)
        } else {
            Ok(true)
        }
    }

    /// Remove the single list entry carrying the given task id.
    /// Returns the removed payload, or None when no entry matches.
    pub async fn list_remove_by_id(&self, key: &str, task_id: &str) -> Result<Option<String>> {
        if self.noop_mode {
            return Ok(None);
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let payload: Option<String> = REMOVE_BY_ID
                .key(key)
                .arg(task_id)
                .invoke_async(c)
                .await
                .map_err(OrchestratorError::Redis)?;
            Ok(payload)
        } else {
            Ok(None)
        }
    }
}
