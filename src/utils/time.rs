//! Time helpers
//!
//! All persisted instants are UTC epoch milliseconds; archive partitions
//! are keyed by UTC calendar date.

use chrono::{DateTime, Utc};

/// Current UTC time as epoch milliseconds
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// UTC calendar date (`YYYY-MM-DD`) for an epoch-millisecond instant
pub fn date_partition(ts_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ts_ms)
        .unwrap_or_else(Utc::now)
        .format("%Y-%m-%d")
        .to_string()
}

/// Today's UTC calendar date (`YYYY-MM-DD`)
pub fn today_partition() -> String {
    date_partition(now_ms())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_partition() {
        // 2024-01-15T00:00:00Z
        assert_eq!(date_partition(1_705_276_800_000), "2024-01-15");
    }

    #[test]
    fn test_now_ms_is_recent() {
        // Sanity bound: after 2020, before 2100
        let now = now_ms();
        assert!(now > 1_577_836_800_000);
        assert!(now < 4_102_444_800_000);
    }
}
