//! Time formatting for the timer display and the stats views.
//!
//! - [`format_clock`]: running session clock, `HH:MM:SS`
//! - [`format_stats_time`]: period totals, `HH:MM`
//! - [`format_last_synced`]: wall-clock time of the last stats sync, `h:mm AM`
//!
//! ```rust
//! use tracklet::libs::formatter::{format_clock, format_stats_time};
//!
//! assert_eq!(format_clock(42), "00:00:42");
//! assert_eq!(format_stats_time(5400), "01:30");
//! ```

use chrono::{DateTime, Local, Timelike};

/// Formats elapsed seconds as `HH:MM:SS`. Hours are not wrapped at 24.
pub fn format_clock(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Formats a period total as `HH:MM`, dropping seconds.
pub fn format_stats_time(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    format!("{:02}:{:02}", hours, minutes)
}

/// Formats the last sync time on a 12-hour clock, or `Never`.
pub fn format_last_synced(synced_at: Option<&DateTime<Local>>) -> String {
    match synced_at {
        None => "Never".to_string(),
        Some(time) => {
            let (is_pm, hour) = time.hour12();
            format!("{}:{:02} {}", hour, time.minute(), if is_pm { "PM" } else { "AM" })
        }
    }
}
