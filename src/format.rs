// Human-readable durations for the dashboard and /health

use std::time::Duration;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Coarse uptime: whole minutes under an hour, whole hours under a day,
/// whole days otherwise. Truncates.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < HOUR {
        format!("{}m", secs / MINUTE)
    } else if secs < DAY {
        format!("{}h", secs / HOUR)
    } else {
        format!("{}d", secs / DAY)
    }
}

/// Compact elapsed time such as `42s`, `3m7s` or `26h0m5s`; leading zero units are dropped.
pub fn format_elapsed(d: Duration) -> String {
    let secs = d.as_secs();
    let (h, m, s) = (secs / HOUR, (secs % HOUR) / MINUTE, secs % MINUTE);
    if h > 0 {
        format!("{h}h{m}m{s}s")
    } else if m > 0 {
        format!("{m}m{s}s")
    } else {
        format!("{s}s")
    }
}
