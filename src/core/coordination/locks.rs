//! Advisory per-file locks
//!
//! Compare-and-set acquisition with TTL-based crash recovery. At most
//! one lock per file; release succeeds only for the recorded owner.

use super::coordinator::Coordinator;
use crate::core::types::{FileEvent, channels};
use crate::storage::keyspace;
use crate::utils::error::Result;
use crate::utils::time::now_ms;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

impl Coordinator {
    /// Atomically claim a file lock. The first caller wins; later
    /// callers observe false until the TTL lapses or the owner
    /// releases.
    pub async fn claim_file(&self, file: &str, owner: &str, ttl: Duration) -> Result<bool> {
        let acquired = self
            .redis
            .set_nx_px(&keyspace::lock(file), owner, ttl.as_millis() as u64)
            .await?;

        if acquired {
            debug!("Agent {} claimed {}", owner, file);
            let event = FileEvent::FileClaimed {
                file: file.to_string(),
                agent: owner.to_string(),
                ts: now_ms(),
            };
            self.redis
                .publish(channels::FILE_UPDATES, &serde_json::to_string(&event)?)
                .await?;
        }
        Ok(acquired)
    }

    /// Claim with the configured default TTL
    pub async fn claim_file_default(&self, file: &str, owner: &str) -> Result<bool> {
        self.claim_file(file, owner, Duration::from_secs(self.config.lock_ttl_secs))
            .await
    }

    /// Release a lock. Succeeds only when the stored owner equals the
    /// caller, preventing hostile release.
    pub async fn release_file(&self, file: &str, owner: &str) -> Result<bool> {
        let released = self.redis.release_lock(&keyspace::lock(file), owner).await?;

        if released {
            debug!("Agent {} released {}", owner, file);
            let event = FileEvent::FileReleased {
                file: file.to_string(),
                agent: owner.to_string(),
                ts: now_ms(),
            };
            self.redis
                .publish(channels::FILE_UPDATES, &serde_json::to_string(&event)?)
                .await?;
        }
        Ok(released)
    }

    /// Current owner of a file lock, if any
    pub async fn lock_owner(&self, file: &str) -> Result<Option<String>> {
        self.redis.get(&keyspace::lock(file)).await
    }

    /// Poll `claim_file` until success or the deadline passes.
    ///
    /// The poll interval is bounded below at one second to avoid
    /// hot-looping on a contended file.
    pub async fn wait_for_file(
        &self,
        file: &str,
        owner: &str,
        ttl: Duration,
        deadline: Duration,
    ) -> Result<bool> {
        let poll = Duration::from_secs(self.config.wait_poll_secs.max(1));
        let give_up = Instant::now() + deadline;

        loop {
            if self.claim_file(file, owner, ttl).await? {
                return Ok(true);
            }
            if Instant::now() + poll > give_up {
                return Ok(false);
            }
            tokio::time::sleep(poll).await;
        }
    }
}
