//! Agent registry records

use serde::{Deserialize, Serialize};
use std::fmt;

/// Agent liveness / activity state.
///
/// `unresponsive` is derived from heartbeat age, never self-reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// Registered and heartbeating
    Active,
    /// Alive with no claimed task
    Idle,
    /// Holds a claimed task
    Working,
    /// Deregistered cleanly
    Offline,
    /// Heartbeat older than the unresponsive threshold
    Unresponsive,
}

impl AgentStatus {
    /// Whether the agent counts toward the responsive fraction of the
    /// system health score
    pub fn is_responsive(&self) -> bool {
        matches!(
            self,
            AgentStatus::Active | AgentStatus::Idle | AgentStatus::Working
        )
    }

    /// Wire form
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Active => "active",
            AgentStatus::Idle => "idle",
            AgentStatus::Working => "working",
            AgentStatus::Offline => "offline",
            AgentStatus::Unresponsive => "unresponsive",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate per-agent counters maintained across completions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPerformance {
    /// Tasks completed successfully
    pub completed: u64,
    /// Tasks failed
    pub failed: u64,
    /// EMA of completion latency in milliseconds
    pub avg_latency_ms: f64,
}

/// A logical worker in the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRecord {
    /// Unique, opaque
    pub id: String,
    /// Capability tags, free-form
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Dispatch-order hint within a queue
    #[serde(default)]
    pub priority: u32,
    /// Current state
    pub status: AgentStatus,
    /// Claimed task id, or "idle"
    #[serde(default = "default_current_task")]
    pub current_task: String,
    /// Epoch ms of the last heartbeat
    pub last_heartbeat: i64,
    /// Aggregate counters
    #[serde(default)]
    pub performance: AgentPerformance,
}

fn default_current_task() -> String {
    "idle".to_string()
}

impl AgentRecord {
    /// Fresh registration record
    pub fn new(id: impl Into<String>, capabilities: Vec<String>, now_ms: i64) -> Self {
        Self {
            id: id.into(),
            capabilities,
            priority: 0,
            status: AgentStatus::Active,
            current_task: default_current_task(),
            last_heartbeat: now_ms,
            performance: AgentPerformance::default(),
        }
    }

    /// Heartbeat age in milliseconds at `now_ms`
    pub fn heartbeat_age_ms(&self, now_ms: i64) -> i64 {
        (now_ms - self.last_heartbeat).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_idle_and_active() {
        let record = AgentRecord::new("gpt-01", vec!["gpt-4o".to_string()], 1_000);
        assert_eq!(record.status, AgentStatus::Active);
        assert_eq!(record.current_task, "idle");
        assert_eq!(record.heartbeat_age_ms(4_000), 3_000);
    }

    #[test]
    fn test_responsive_statuses() {
        assert!(AgentStatus::Working.is_responsive());
        assert!(!AgentStatus::Unresponsive.is_responsive());
        assert!(!AgentStatus::Offline.is_responsive());
    }

    #[test]
    fn test_status_wire_form() {
        assert_eq!(
            serde_json::to_string(&AgentStatus::Unresponsive).unwrap(),
            "\"unresponsive\""
        );
    }
}
