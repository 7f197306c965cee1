//! Redis Pub/Sub operations
//!
//! Publishing goes through the shared multiplexed connection;
//! subscriptions hold a dedicated pub-sub connection because Redis
//! pins subscriber connections to the subscribe state.

use super::pool::RedisPool;
use crate::utils::error::{OrchestratorError, Result};
use futures_util::StreamExt;
use redis::AsyncCommands;
use redis::aio::PubSub;
use tracing::debug;

/// An active subscription over one or more channels
pub struct Subscription {
    inner: Option<PubSub>,
}

impl RedisPool {
    /// Publish message to channel
    pub async fn publish(&self, channel: &str, message: &str) -> Result<()> {
        if self.noop_mode {
            return Ok(());
        }

        let mut conn = self.get_connection().await?;
        if let Some(ref mut c) = conn.conn {
            let _: () = c
                .publish(channel, message)
                .await
                .map_err(OrchestratorError::Redis)?;
        }
        Ok(())
    }

    /// Subscribe to the given channels.
    ///
    /// In no-op mode the subscription yields nothing, so consumer
    /// loops drain cleanly.
    pub async fn subscribe(&self, channels: &[&str]) -> Result<Subscription> {
        if self.noop_mode {
            return Ok(Subscription { inner: None });
        }

        let client = self
            .client
            .as_ref()
            .ok_or_else(|| OrchestratorError::Internal("pool has no client".to_string()))?;

        let mut pubsub = client
            .get_async_pubsub()
            .await
            .map_err(OrchestratorError::Redis)?;
        for channel in channels {
            pubsub
                .subscribe(*channel)
                .await
                .map_err(OrchestratorError::Redis)?;
            debug!("Subscribed to channel: {}", channel);
        }

        Ok(Subscription {
            inner: Some(pubsub),
        })
    }
}

impl Subscription {
    /// Await the next message as `(channel, payload)`.
    ///
    /// Returns None when the subscription is closed (or in no-op mode).
    pub async fn next_message(&mut self) -> Option<(String, String)> {
        let pubsub = self.inner.as_mut()?;
        let mut stream = pubsub.on_message();
        let msg = stream.next().await?;
        let channel = msg.get_channel_name().to_string();
        let payload: String = msg.get_payload().ok()?;
        Some((channel, payload))
    }
}
