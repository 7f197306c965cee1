//! Per-kind retry strategies
//!
//! A closed lookup from failure kind to retry budget, delay curve, and
//! task mutation. The decision pipeline gates on entry age and the
//! global retry cap before consulting the per-kind budget.

use super::classify;
use crate::config::DlqConfig;
use crate::core::types::{FailureKind, ModelId, Task};
use std::str::FromStr;

/// Outcome of evaluating one DLQ entry
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    /// Re-queue after `delay_ms` under the named strategy
    Retry {
        /// Strategy that accepted the task
        kind: FailureKind,
        /// Delay before re-insertion
        delay_ms: u64,
    },
    /// Move to the day-keyed archive
    Archive {
        /// Archive reason recorded on the entry
        reason: &'static str,
    },
    /// Terminal: record in the permanent-failure sink and alert
    Permanent,
}

/// Per-kind retry budget
fn kind_max_retries(kind: FailureKind, config: &DlqConfig) -> u32 {
    match kind {
        FailureKind::RateLimit => 3,
        FailureKind::Timeout => 3,
        FailureKind::Connection => 5,
        FailureKind::Parse => 2,
        FailureKind::Memory => 2,
        // Temporary unknowns and orphans run to the global cap
        _ => config.max_retries,
    }
}

/// Per-kind delay curve, indexed by the pre-increment retry count
fn kind_delay_ms(kind: FailureKind, retries: u32, config: &DlqConfig) -> u64 {
    match kind {
        FailureKind::RateLimit => 2u64.saturating_pow(retries) * 60_000,
        FailureKind::Timeout => 30_000,
        FailureKind::Connection => 5_000 * retries as u64,
        FailureKind::Parse => 10_000,
        FailureKind::Memory => 15_000,
        _ => config.retry_delay_ms,
    }
}

/// Evaluate a DLQ entry against the gates and the strategy table.
pub fn evaluate(task: &Task, config: &DlqConfig, now_ms: i64) -> Disposition {
    let Some(failure) = &task.failure else {
        // An entry with no failure metadata carries nothing the
        // classifier can work with.
        return Disposition::Permanent;
    };

    // Step 1: age and retry gating
    let age_ms = now_ms - failure.failed_at;
    if age_ms > (config.entry_ttl_secs as i64) * 1000 {
        return Disposition::Archive { reason: "expired" };
    }
    if task.retries >= config.max_retries {
        return Disposition::Archive {
            reason: "max_retries_exceeded",
        };
    }

    // Step 2: classification
    let kind = classify::classify(&failure.message);
    let temporary = classify::is_temporary(&failure.message);

    // Step 3: per-kind strategy
    if kind == FailureKind::Unknown && !temporary {
        return Disposition::Permanent;
    }
    if task.retries >= kind_max_retries(kind, config) {
        return Disposition::Archive {
            reason: "non_retryable_error",
        };
    }

    Disposition::Retry {
        kind,
        delay_ms: kind_delay_ms(kind, task.retries, config),
    }
}

/// Apply the strategy's task mutation before re-enqueue and return the
/// model whose queue receives the retry.
///
/// Every kind except parse re-inserts into the original queue; parse
/// substitutes the target model along the fallback chain.
pub fn apply_mutation(kind: FailureKind, task: &mut Task) -> ModelId {
    match kind {
        FailureKind::RateLimit => {
            task.priority = crate::core::types::Priority::Low;
        }
        FailureKind::Timeout => {
            task.timeout = task.timeout.map(|t| t + t / 2);
        }
        FailureKind::Parse => {
            if let Some(next) = task.target_model.fallback() {
                task.target_model = next;
                task.fallback_used = Some(true);
            }
            return task.target_model;
        }
        FailureKind::Memory => {
            task.reduce_context = Some(true);
            task.max_tokens = task.max_tokens.map(|t| t / 2);
        }
        _ => {}
    }
    original_queue_model(task)
}

/// Model parsed from `original_queue`, falling back to the current
/// target
pub fn original_queue_model(task: &Task) -> ModelId {
    task.original_queue
        .as_deref()
        .and_then(|queue| queue.strip_prefix("queue:"))
        .and_then(|name| ModelId::from_str(name).ok())
        .unwrap_or(task.target_model)
}
