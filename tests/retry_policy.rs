//! End-to-end retry-policy scenarios against the public API

use swarmq::config::DlqConfig;
use swarmq::core::dlq::{Disposition, classify, evaluate};
use swarmq::core::types::{FailureInfo, FailureKind, ModelId, Priority, Task};

fn dlq_entry(id: &str, model: ModelId, message: &str, retries: u32) -> Task {
    let mut task = Task::new(id, model);
    task.original_queue = Some(format!("queue:{}", model));
    task.retries = retries;
    task.failure = Some(FailureInfo {
        kind: classify::classify(message),
        message: message.to_string(),
        failed_at: chrono::Utc::now().timestamp_millis(),
        failed_by: "gpt-01".to_string(),
    });
    task
}

#[test]
fn rate_limited_task_is_demoted_and_delayed_one_minute() {
    let config = DlqConfig::default();
    let now = chrono::Utc::now().timestamp_millis();

    let task = dlq_entry("T2", ModelId::ClaudeOpus, "429 rate limit exceeded", 0);
    match evaluate(&task, &config, now) {
        Disposition::Retry { kind, delay_ms } => {
            assert_eq!(kind, FailureKind::RateLimit);
            assert_eq!(delay_ms, 60_000);
        }
        other => panic!("expected retry, got {:?}", other),
    }
}

#[test]
fn parse_failure_falls_back_across_models() {
    let config = DlqConfig::default();
    let now = chrono::Utc::now().timestamp_millis();

    let task = dlq_entry("T3", ModelId::DeepseekCoder, "JSON parse error", 0);
    match evaluate(&task, &config, now) {
        Disposition::Retry { kind, delay_ms } => {
            assert_eq!(kind, FailureKind::Parse);
            assert_eq!(delay_ms, 10_000);
        }
        other => panic!("expected retry, got {:?}", other),
    }
}

#[test]
fn sixth_failure_archives_while_fresh_unknown_is_terminal() {
    let config = DlqConfig::default();
    let now = chrono::Utc::now().timestamp_millis();

    // Five prior retries: archived, not permanent-failed
    let exhausted = dlq_entry("T-old", ModelId::Gpt4o, "timeout", 5);
    assert_eq!(
        evaluate(&exhausted, &config, now),
        Disposition::Archive {
            reason: "max_retries_exceeded"
        }
    );

    // Unclassified, non-temporary, zero retries: straight to the sink
    let opaque = dlq_entry("T-new", ModelId::Gpt4o, "illegal instruction", 0);
    assert_eq!(evaluate(&opaque, &config, now), Disposition::Permanent);
}

#[test]
fn task_envelope_survives_retry_mutations() {
    let mut task = dlq_entry("T2", ModelId::ClaudeOpus, "429 rate limit exceeded", 0);
    task.priority = Priority::Low;
    task.retries = 1;
    task.failure = None;
    task.retry_strategy = Some("rate_limit".to_string());
    task.dlq_processed = Some(true);

    let json = task.to_json().unwrap();
    let back = Task::from_json(&json).unwrap();
    assert_eq!(back, task);
    assert_eq!(back.original_queue.as_deref(), Some("queue:claude-3-opus"));
    assert_eq!(back.priority, Priority::Low);
}

#[test]
fn retries_only_increase_along_the_policy_path() {
    let config = DlqConfig::default();
    let now = chrono::Utc::now().timestamp_millis();

    // Walk a connection-failure task through the per-kind budget; the
    // disposition stays a retry until the global gate closes, and the
    // count we simulate never decreases.
    let mut previous = 0;
    for retries in 0..config.max_retries {
        let task = dlq_entry("T-walk", ModelId::Gpt4o, "connection refused", retries);
        assert!(retries >= previous);
        previous = retries;
        assert!(matches!(
            evaluate(&task, &config, now),
            Disposition::Retry { .. }
        ));
    }
}
