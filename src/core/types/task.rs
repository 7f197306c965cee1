//! Task envelope and failure metadata
//!
//! Tasks travel the data plane as JSON. Decoding is lenient (unknown
//! fields are ignored); encoding writes only the fields below, with
//! absent optionals omitted so re-encoded envelopes stay compact.

use super::model::ModelId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dispatch priority class.
///
/// Strict ordering between classes, FIFO within a class. `medium` is
/// the ingest default; the rate-limit retry strategy rewrites tasks to
/// `low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Dispatched before everything else
    Critical,
    /// Elevated
    High,
    /// Default class
    #[default]
    Medium,
    /// Background; also the retry-demotion class
    Low,
}

impl Priority {
    /// All classes in dispatch order (highest first)
    pub const DISPATCH_ORDER: [Priority; 4] = [
        Priority::Critical,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];

    /// Lane-key suffix form
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure classification attached to a task by `fail` and consumed by
/// the DLQ manager's per-kind retry strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Provider rate limit hit
    RateLimit,
    /// Worker or provider deadline exceeded
    Timeout,
    /// Network-level failure
    Connection,
    /// Response could not be parsed
    Parse,
    /// Worker ran out of memory
    Memory,
    /// Claimer vanished while the task was in flight
    Orphaned,
    /// Caller-initiated cancellation
    Cancelled,
    /// None of the above
    Unknown,
}

impl FailureKind {
    /// Snake-case wire form
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::RateLimit => "rate_limit",
            FailureKind::Timeout => "timeout",
            FailureKind::Connection => "connection",
            FailureKind::Parse => "parse",
            FailureKind::Memory => "memory",
            FailureKind::Orphaned => "orphaned",
            FailureKind::Cancelled => "cancelled",
            FailureKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure metadata recorded when a task is failed; cleared on
/// successful re-queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureInfo {
    /// Failure class
    pub kind: FailureKind,
    /// Worker-reported message, input to the DLQ classifier
    pub message: String,
    /// Epoch ms at which the failure was recorded
    pub failed_at: i64,
    /// Agent that reported the failure
    pub failed_by: String,
}

/// The unit of work.
///
/// `id` is stable across retries; `original_queue` never changes once
/// first assigned; `retries` is monotonically non-decreasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique, opaque, stable across retries
    pub id: String,
    /// Determines the queue
    pub target_model: ModelId,
    /// Artifact the task produces; key for file-lock coordination
    #[serde(default)]
    pub file: String,
    /// Opaque payload for the worker
    #[serde(default)]
    pub prompt: String,
    /// Dispatch priority class
    #[serde(default)]
    pub priority: Priority,
    /// Retry counter, incremented on each retry
    #[serde(default)]
    pub retries: u32,
    /// Queue the task was first ingested into, e.g. `queue:gpt-4o`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_queue: Option<String>,
    /// Present while the task sits in a DLQ
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureInfo>,
    /// Per-task deadline hint in ms; widened by the timeout strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Optional correlator grouping related tasks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhancement_id: Option<String>,
    /// Token ceiling hint; halved by the memory strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Set by the memory strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduce_context: Option<bool>,
    /// Set when the parse strategy substituted the target model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_used: Option<bool>,
    /// Epoch ms of the most recent DLQ retry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_retry_at: Option<i64>,
    /// Name of the strategy that last re-queued the task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_strategy: Option<String>,
    /// Marker that the task went through the DLQ at least once
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dlq_processed: Option<bool>,
    /// Agent holding the task; set by the atomic claim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_by: Option<String>,
    /// Epoch ms of the claim; set by the atomic claim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_at: Option<i64>,
}

impl Task {
    /// Create a task with default priority and a fresh id when none is
    /// supplied by the producer.
    pub fn new(id: impl Into<String>, target_model: ModelId) -> Self {
        Self {
            id: id.into(),
            target_model,
            file: String::new(),
            prompt: String::new(),
            priority: Priority::default(),
            retries: 0,
            original_queue: None,
            failure: None,
            timeout: None,
            enhancement_id: None,
            max_tokens: None,
            reduce_context: None,
            fallback_used: None,
            last_retry_at: None,
            retry_strategy: None,
            dlq_processed: None,
            claimed_by: None,
            claimed_at: None,
        }
    }

    /// Decode a task envelope, ignoring unknown fields
    pub fn from_json(payload: &str) -> serde_json::Result<Self> {
        serde_json::from_str(payload)
    }

    /// Encode the task envelope
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Stable dedup fingerprint over the fields that change between
    /// DLQ passes. Two reads of the same stuck entry hash identically;
    /// a retried entry does not.
    pub fn dlq_fingerprint(&self) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.id.hash(&mut hasher);
        self.retries.hash(&mut hasher);
        if let Some(failure) = &self.failure {
            failure.failed_at.hash(&mut hasher);
        }
        hasher.finish()
    }
}

/// A task at rest in the archive or permanent-failure sink.
///
/// Entries flow DLQ → archive or DLQ → permanent failures and never
/// return to a DLQ from either state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DlqRecord {
    /// The underlying task envelope
    #[serde(flatten)]
    pub task: Task,
    /// Epoch ms at which the task was archived
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<i64>,
    /// Why the task was archived
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_reason: Option<String>,
    /// Epoch ms at which the task was declared permanently failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permanent_failure_at: Option<i64>,
    /// Terminal failure reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl DlqRecord {
    /// Archive-form record
    pub fn archived(task: Task, reason: impl Into<String>, at: i64) -> Self {
        Self {
            task,
            archived_at: Some(at),
            archive_reason: Some(reason.into()),
            permanent_failure_at: None,
            failure_reason: None,
        }
    }

    /// Permanent-failure-form record
    pub fn permanent(task: Task, reason: impl Into<String>, at: i64) -> Self {
        Self {
            task,
            archived_at: None,
            archive_reason: None,
            permanent_failure_at: Some(at),
            failure_reason: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_round_trip() {
        let mut task = Task::new("T1", ModelId::Gpt4o);
        task.file = "src/a.ts".to_string();
        task.priority = Priority::Medium;

        let json = task.to_json().unwrap();
        let back = Task::from_json(&json).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let payload = r#"{
            "id": "T9",
            "targetModel": "gemini-pro",
            "somethingNew": {"nested": true},
            "dashboardHint": 3
        }"#;
        let task = Task::from_json(payload).unwrap();
        assert_eq!(task.id, "T9");
        assert_eq!(task.target_model, ModelId::GeminiPro);
        assert_eq!(task.retries, 0);
    }

    #[test]
    fn test_absent_optionals_not_serialized() {
        let task = Task::new("T2", ModelId::ClaudeOpus);
        let json = task.to_json().unwrap();
        assert!(!json.contains("failure"));
        assert!(!json.contains("claimedBy"));
        assert!(!json.contains("originalQueue"));
    }

    #[test]
    fn test_priority_dispatch_order() {
        let order = Priority::DISPATCH_ORDER;
        assert_eq!(order[0], Priority::Critical);
        assert_eq!(order[3], Priority::Low);
    }

    #[test]
    fn test_priority_wire_form() {
        assert_eq!(
            serde_json::to_string(&Priority::Critical).unwrap(),
            "\"critical\""
        );
        let p: Priority = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(p, Priority::Low);
    }

    #[test]
    fn test_dlq_fingerprint_changes_with_retries() {
        let mut task = Task::new("T3", ModelId::Gpt4o);
        let first = task.dlq_fingerprint();
        task.retries += 1;
        assert_ne!(first, task.dlq_fingerprint());
    }

    #[test]
    fn test_failure_kind_wire_form() {
        assert_eq!(
            serde_json::to_string(&FailureKind::RateLimit).unwrap(),
            "\"rate_limit\""
        );
        assert_eq!(FailureKind::Orphaned.as_str(), "orphaned");
    }

    #[test]
    fn test_dlq_record_flattens_task() {
        let task = Task::new("T4", ModelId::DeepseekCoder);
        let record = DlqRecord::archived(task, "expired", 1_700_000_000_000);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"id\":\"T4\""));
        assert!(json.contains("\"archiveReason\":\"expired\""));
    }
}
