//! Data-plane key layout
//!
//! The prefixes here are part of the interface contract and visible to
//! external tools (dashboards, CLIs). Keys not in the contract table
//! (`dlq:scheduled`, `dedupe:task:*`, `heartbeat:*`, pause flag) are
//! implementation keys documented in DESIGN.md.

use crate::core::types::{ModelId, Priority};

/// Pending-task list for the default (medium) lane; the contract key
pub fn queue(model: ModelId) -> String {
    format!("queue:{}", model)
}

/// Priority lane for a queue. Medium is the bare contract key; the
/// other classes are suffixed lanes.
pub fn lane(model: ModelId, priority: Priority) -> String {
    match priority {
        Priority::Medium => queue(model),
        other => format!("queue:{}:{}", model, other),
    }
}

/// All four lanes of a queue in dispatch order (highest first)
pub fn lanes(model: ModelId) -> [String; 4] {
    [
        lane(model, Priority::Critical),
        lane(model, Priority::High),
        lane(model, Priority::Medium),
        lane(model, Priority::Low),
    ]
}

/// In-flight task list
pub fn processing(model: ModelId) -> String {
    format!("processing:{}", model)
}

/// Failed tasks awaiting classification
pub fn dlq(model: ModelId) -> String {
    format!("dlq:{}", model)
}

/// Day-partitioned archive sorted set
pub fn archive(model: ModelId, date: &str) -> String {
    format!("archive:dlq:{}:{}", model, date)
}

/// Registered agent record hash
pub fn agent(id: &str) -> String {
    format!("agent:{}", id)
}

/// Agent liveness key (TTL = gc threshold)
pub fn heartbeat(id: &str) -> String {
    format!("heartbeat:{}", id)
}

/// Advisory file lock; value = owner id
pub fn lock(file: &str) -> String {
    format!("lock:{}", file)
}

/// Direct-message inbox list
pub fn messages(id: &str) -> String {
    format!("messages:{}", id)
}

/// Round-robin cursor
pub fn rotation_index(model: ModelId) -> String {
    format!("rotation:{}:index", model)
}

/// Per-key rate-limit window sorted set
pub fn usage(model: ModelId, index: usize) -> String {
    format!("usage:{}:{}", model, index)
}

/// Per-key performance EMA value
pub fn perf(model: ModelId, index: usize, metric: &str) -> String {
    format!("perf:{}:{}:{}", model, index, metric)
}

/// Per-key health marker (string with TTL)
pub fn key_health(model: ModelId, index: usize) -> String {
    format!("health:{}:{}", model, index)
}

/// Ingest de-duplication marker
pub fn dedupe(task_id: &str) -> String {
    format!("dedupe:task:{}", task_id)
}

/// Aggregate failure log (append-only list)
pub const FAILURE_LOG: &str = "queue:failures";

/// Terminal failures, capped sorted set
pub const PERMANENT_FAILURES: &str = "permanent_failures";

/// Durable retry-delay sorted set (score = ready-at ms)
pub const DLQ_SCHEDULED: &str = "dlq:scheduled";

/// Global claim-pause flag; presence pauses dispatch
pub const PAUSED: &str = "orchestrator:paused";

/// Latest health snapshot written by the orchestrator sweep
pub const HEALTH_SNAPSHOT: &str = "orchestrator:health";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_prefixes() {
        assert_eq!(queue(ModelId::Gpt4o), "queue:gpt-4o");
        assert_eq!(processing(ModelId::ClaudeOpus), "processing:claude-3-opus");
        assert_eq!(dlq(ModelId::DeepseekCoder), "dlq:deepseek-coder");
        assert_eq!(
            archive(ModelId::Gpt4o, "2024-01-15"),
            "archive:dlq:gpt-4o:2024-01-15"
        );
        assert_eq!(lock("src/x.ts"), "lock:src/x.ts");
        assert_eq!(messages("gpt-01"), "messages:gpt-01");
        assert_eq!(rotation_index(ModelId::GeminiPro), "rotation:gemini-pro:index");
        assert_eq!(usage(ModelId::Gpt4o, 2), "usage:gpt-4o:2");
        assert_eq!(perf(ModelId::Gpt4o, 0, "success"), "perf:gpt-4o:0:success");
        assert_eq!(key_health(ModelId::Gpt4o, 1), "health:gpt-4o:1");
    }

    #[test]
    fn test_medium_lane_is_contract_key() {
        assert_eq!(lane(ModelId::Gpt4o, Priority::Medium), "queue:gpt-4o");
        assert_eq!(lane(ModelId::Gpt4o, Priority::Low), "queue:gpt-4o:low");
        assert_eq!(
            lane(ModelId::Gpt4o, Priority::Critical),
            "queue:gpt-4o:critical"
        );
    }

    #[test]
    fn test_lanes_in_dispatch_order() {
        let lanes = lanes(ModelId::Gpt4o);
        assert_eq!(lanes[0], "queue:gpt-4o:critical");
        assert_eq!(lanes[1], "queue:gpt-4o:high");
        assert_eq!(lanes[2], "queue:gpt-4o");
        assert_eq!(lanes[3], "queue:gpt-4o:low");
    }
}
