//! Failure-message classification
//!
//! Case-insensitive substring matching against a closed trigger table,
//! checked in a fixed order so overlapping messages classify
//! deterministically. A secondary pattern set flags temporary
//! failures, which keeps unknown-kind messages retryable.

use crate::core::types::FailureKind;

/// Classify a worker-reported failure message.
///
/// Checked in order: rate limit, timeout, connection, parse, memory.
/// Anything unmatched is `unknown`.
pub fn classify(message: &str) -> FailureKind {
    let lower = message.to_lowercase();

    if lower.contains("rate") && lower.contains("limit") {
        FailureKind::RateLimit
    } else if lower.contains("timeout") {
        FailureKind::Timeout
    } else if lower.contains("connection") || lower.contains("econnrefused") {
        FailureKind::Connection
    } else if lower.contains("parse") || lower.contains("json") {
        FailureKind::Parse
    } else if lower.contains("memory") || lower.contains("heap") {
        FailureKind::Memory
    } else {
        FailureKind::Unknown
    }
}

/// Whether the message indicates a temporary condition.
///
/// An `unknown` classification that is also temporary stays retryable
/// with the default delay.
pub fn is_temporary(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("temporary")
        || (lower.contains("try") && lower.contains("again"))
        || lower.contains("unavailable")
        || lower.contains("busy")
        || lower.contains("concurrent")
}
