//! Chat-channel transport envelopes
//!
//! Everything on the agent chat and emergency channels is one of these
//! tagged variants, so transport metadata never leaks into the task
//! shape. Task envelopes themselves travel the queue keys as plain
//! task JSON, and control channels carry their own typed command
//! enums.

use serde::{Deserialize, Serialize};

/// A direct, per-recipient queued message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectMessage {
    /// Sender agent id
    pub from: String,
    /// Recipient agent id
    pub to: String,
    /// Opaque body
    pub body: String,
    /// Epoch ms at send time
    pub ts: i64,
}

/// Tagged chat transport envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Envelope {
    /// Fire-and-forget broadcast to all agents
    Broadcast {
        /// Sender agent id
        from: String,
        /// Opaque body
        body: String,
        /// Epoch ms at send time
        ts: i64,
    },
    /// Queued per-recipient message, mirrored onto the chat channel
    Direct {
        /// The message
        message: DirectMessage,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_tagging() {
        let envelope = Envelope::Broadcast {
            from: "gpt-01".to_string(),
            body: "hello".to_string(),
            ts: 1,
        };
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains("\"kind\":\"broadcast\""));
        let back: Envelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back, envelope);
    }

    #[test]
    fn test_direct_envelope_carries_message() {
        let envelope = Envelope::Direct {
            message: DirectMessage {
                from: "gpt-01".to_string(),
                to: "gpt-02".to_string(),
                body: "ready?".to_string(),
                ts: 2,
            },
        };
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains("\"kind\":\"direct\""));
        assert!(json.contains("\"to\":\"gpt-02\""));
        let back: Envelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back, envelope);
    }
}
