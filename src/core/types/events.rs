//! Typed pub-sub events, one enum per channel
//!
//! Channel names are part of the external interface; dashboards and
//! CLIs subscribe to them directly.

use super::agent::{AgentRecord, AgentStatus};
use super::model::ModelId;
use super::task::Priority;
use serde::{Deserialize, Serialize};

/// Channel name constants
pub mod channels {
    /// Agent registration and status transitions
    pub const AGENT_REGISTRY: &str = "agent-registry";
    /// Broadcasts and mirrored direct messages
    pub const AGENT_CHAT: &str = "agent-chat";
    /// High-severity operator alerts
    pub const AGENT_EMERGENCY: &str = "agent-emergency";
    /// File lock claims and releases
    pub const FILE_UPDATES: &str = "file-updates";
    /// Task lifecycle transitions
    pub const TASK_UPDATES: &str = "task-updates";
    /// External DLQ-control requests
    pub const DLQ_RETRY: &str = "dlq:retry";
    /// External DLQ-control requests
    pub const DLQ_ARCHIVE: &str = "dlq:archive";
    /// External DLQ-control requests
    pub const DLQ_CLEAR: &str = "dlq:clear";
    /// Emitted on terminal failure
    pub const ALERT_PERMANENT_FAILURE: &str = "alert:permanent_failure";
    /// Orchestrator control commands
    pub const ORCHESTRATOR_CONTROL: &str = "orchestrator-control";
}

/// Events on `agent-registry`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryEvent {
    /// A new agent joined
    AgentRegistered {
        /// The full registration record
        agent: AgentRecord,
        /// Epoch ms
        ts: i64,
    },
    /// An agent's status changed
    AgentStatusUpdated {
        /// Agent id
        id: String,
        /// New status
        status: AgentStatus,
        /// Epoch ms
        ts: i64,
    },
    /// An agent was garbage-collected or deregistered
    AgentRemoved {
        /// Agent id
        id: String,
        /// Epoch ms
        ts: i64,
    },
}

/// Events on `file-updates`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileEvent {
    /// A lock was acquired
    FileClaimed {
        /// Locked resource
        file: String,
        /// Owner agent
        agent: String,
        /// Epoch ms
        ts: i64,
    },
    /// A lock was released
    FileReleased {
        /// Unlocked resource
        file: String,
        /// Previous owner
        agent: String,
        /// Epoch ms
        ts: i64,
    },
}

/// Task lifecycle transitions on `task-updates`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskEvent {
    /// Ingested into a pending lane
    TaskQueued {
        /// Task id
        id: String,
        /// Target queue model
        model: ModelId,
        /// Priority class
        priority: Priority,
        /// Epoch ms
        ts: i64,
    },
    /// Atomically moved to in-flight
    TaskClaimed {
        /// Task id
        id: String,
        /// Target queue model
        model: ModelId,
        /// Claiming agent
        agent: String,
        /// Epoch ms
        ts: i64,
    },
    /// Removed from in-flight after success
    TaskCompleted {
        /// Task id
        id: String,
        /// Target queue model
        model: ModelId,
        /// Completing agent
        agent: String,
        /// Epoch ms
        ts: i64,
    },
    /// Removed from in-flight and pushed to the DLQ
    TaskFailed {
        /// Task id
        id: String,
        /// Target queue model
        model: ModelId,
        /// Classified failure kind
        kind: String,
        /// Epoch ms
        ts: i64,
    },
    /// Re-queued by a DLQ retry strategy
    TaskRetried {
        /// Task id
        id: String,
        /// Queue receiving the retry
        queue: String,
        /// Strategy that produced the retry
        strategy: String,
        /// Retry ordinal after increment
        retries: u32,
        /// Epoch ms
        ts: i64,
    },
    /// Moved to a day-keyed archive partition
    TaskArchived {
        /// Task id
        id: String,
        /// Archive reason
        reason: String,
        /// Epoch ms
        ts: i64,
    },
    /// Reinjected after its claimer vanished
    TaskOrphaned {
        /// Task id
        id: String,
        /// Target queue model
        model: ModelId,
        /// Vanished claimer
        agent: String,
        /// Epoch ms
        ts: i64,
    },
}

/// Commands accepted on `orchestrator-control`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlCommand {
    /// Stop dispatcher claims globally
    Pause,
    /// Resume dispatcher claims
    Resume,
    /// Trigger the rebalance step
    Rebalance {
        /// Restrict to one model, or all when absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<ModelId>,
    },
    /// Emit an immediate health report
    HealthCheck,
    /// Archive and clear a DLQ
    ClearDlq {
        /// Restrict to one model, or all when absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<ModelId>,
    },
}

/// Requests on the `dlq:{retry,archive,clear}` channels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DlqControl {
    /// DLQ model
    pub model: ModelId,
    /// Target task, absent for clear
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

/// Events on `alert:permanent_failure`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AlertEvent {
    /// A task was terminally failed
    PermanentFailure {
        /// Task id
        task_id: String,
        /// Model whose DLQ held the task
        model: ModelId,
        /// Terminal reason
        reason: String,
        /// Epoch ms
        ts: i64,
    },
}
