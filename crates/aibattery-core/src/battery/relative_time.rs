//! Coarse "in N units" formatting for reset timestamps.

use chrono::{DateTime, Utc};

use crate::usage::UsageMetric;

/// Format a reset timestamp relative to `now`.
///
/// Uses a single unit: minutes under an hour, hours under a day, days
/// otherwise. Past or current timestamps read as `"now"`.
pub fn format_relative(reset_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<String> {
    let reset_at = reset_at?;
    let diff = reset_at - now;
    if diff <= chrono::Duration::zero() {
        return Some("now".to_string());
    }

    let minutes = diff.num_minutes();
    if minutes < 60 {
        return Some(format!("in {}", plural(minutes, "minute")));
    }
    let hours = diff.num_hours();
    if hours < 24 {
        return Some(format!("in {}", plural(hours, "hour")));
    }
    Some(format!("in {}", plural(diff.num_days(), "day")))
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("{} {}", n, unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

/// "Resets ..." line for a metric.
///
/// Prefers the relative time from `reset_at`, falls back to the free-text
/// `reset_info`.
pub fn reset_label(metric: &UsageMetric, now: DateTime<Utc>) -> Option<String> {
    if let Some(relative) = format_relative(metric.reset_at, now) {
        return Some(format!("Resets {}", relative));
    }
    metric
        .reset_info
        .as_ref()
        .map(|info| format!("Resets {}", info))
}
