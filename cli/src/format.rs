//! Human readable rendering of estimator output.

use chrono::{DateTime, TimeDelta, Utc};

const UNITS: [(&str, u64); 5] = [
    ("week", 7 * 24 * 60 * 60),
    ("day", 24 * 60 * 60),
    ("hour", 60 * 60),
    ("minute", 60),
    ("second", 1),
];

/// Renders a span of seconds as e.g. "1 day, 2 hours, and 5 seconds"
pub fn time_elapsed(seconds: f64) -> String {
    if !seconds.is_finite() || seconds >= u64::MAX as f64 {
        return "forever".to_string();
    }
    let mut remaining = seconds.max(0.0).round() as u64;

    let mut parts = Vec::new();
    for (name, size) in UNITS {
        let count = remaining / size;
        remaining %= size;
        if count > 0 {
            let plural = if count == 1 { "" } else { "s" };
            parts.push(format!("{count} {name}{plural}"));
        }
    }

    match parts.len() {
        0 => "0 seconds".to_string(),
        1 => parts.remove(0),
        2 => parts.join(" and "),
        _ => {
            let last = parts.pop().unwrap_or_default();
            format!("{}, and {last}", parts.join(", "))
        }
    }
}

/// `asctime`-style UTC timestamp `seconds` after `now`
pub fn utc_after(now: DateTime<Utc>, seconds: u64) -> String {
    i64::try_from(seconds)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|delta| now.checked_add_signed(delta))
        .map(|at| at.format("%a %b %e %H:%M:%S %Y").to_string())
        .unwrap_or_else(|| "the distant future".to_string())
}
