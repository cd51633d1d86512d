//! Formatting helpers shared by query building, error messages and progress logs.

use std::fmt::Display;
use std::time::Duration;

/// Join values with a separator, e.g. `[1, 2, 3]` -> `"1,2,3"`.
pub fn join_values<T: Display>(values: &[T], sep: &str) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Human readable elapsed time, e.g. 65 seconds becomes "1m 5s".
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Records per second over the elapsed time, scaled to per-minute when slow.
pub fn format_rate(records: u64, elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return format!("{} records", records);
    }

    let per_second = records as f64 / secs;
    if per_second < 1.0 {
        format!("{:.2} records/min", per_second * 60.0)
    } else {
        format!("{:.2} records/sec", per_second)
    }
}
