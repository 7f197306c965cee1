//! Agent messaging
//!
//! Direct messages are retained per recipient as a bounded FIFO;
//! broadcasts are fire-and-forget pub-sub with no retention.

use super::coordinator::Coordinator;
use crate::core::types::{DirectMessage, Envelope, channels};
use crate::storage::keyspace;
use crate::utils::error::Result;
use crate::utils::time::now_ms;
use tracing::debug;

impl Coordinator {
    /// Queue a direct message in the recipient's inbox and mirror it
    /// on the chat channel.
    pub async fn send(&self, from: &str, to: &str, body: &str) -> Result<()> {
        let message = DirectMessage {
            from: from.to_string(),
            to: to.to_string(),
            body: body.to_string(),
            ts: now_ms(),
        };

        let inbox = keyspace::messages(to);
        self.redis
            .list_push(&inbox, &serde_json::to_string(&message)?)
            .await?;
        // Bound inbox retention
        self.redis
            .list_trim(&inbox, 0, self.config.inbox_limit as isize - 1)
            .await?;

        let mirrored = Envelope::Direct { message };
        self.redis
            .publish(channels::AGENT_CHAT, &serde_json::to_string(&mirrored)?)
            .await?;

        debug!("Queued message {} -> {}", from, to);
        Ok(())
    }

    /// Pop the oldest message from an agent's inbox
    pub async fn next_message(&self, id: &str) -> Result<Option<DirectMessage>> {
        match self.redis.list_pop(&keyspace::messages(id)).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Peek at the newest messages in an agent's inbox without
    /// consuming them
    pub async fn inbox(&self, id: &str, limit: usize) -> Result<Vec<DirectMessage>> {
        let raw = self
            .redis
            .list_range(&keyspace::messages(id), 0, limit as isize - 1)
            .await?;
        let mut messages = Vec::with_capacity(raw.len());
        for entry in raw {
            messages.push(serde_json::from_str(&entry)?);
        }
        Ok(messages)
    }

    /// Fire-and-forget broadcast to every subscriber of the chat
    /// channel
    pub async fn broadcast(&self, from: &str, body: &str) -> Result<()> {
        let envelope = Envelope::Broadcast {
            from: from.to_string(),
            body: body.to_string(),
            ts: now_ms(),
        };
        self.redis
            .publish(channels::AGENT_CHAT, &serde_json::to_string(&envelope)?)
            .await
    }

    /// High-severity operator alert
    pub async fn emergency(&self, from: &str, body: &str) -> Result<()> {
        let envelope = Envelope::Broadcast {
            from: from.to_string(),
            body: body.to_string(),
            ts: now_ms(),
        };
        self.redis
            .publish(channels::AGENT_EMERGENCY, &serde_json::to_string(&envelope)?)
            .await
    }
}
