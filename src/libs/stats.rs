//! Productivity figures fetched from the tracker.
//!
//! Stats are recomputed by the tracker on every fetch. The client never
//! merges, accumulates or averages them: each successful fetch replaces the
//! stored value for its period.

use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Aggregate figures for one period.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
    /// Tracked seconds in the period. The tracker calls this field `totalHours`.
    #[serde(alias = "totalHours", default, deserialize_with = "lenient_seconds")]
    pub total_seconds: u64,
    #[serde(alias = "activeHours", default, deserialize_with = "lenient_seconds")]
    pub active_seconds: u64,
    #[serde(default, deserialize_with = "lenient_percentage")]
    pub active_percentage: u8,
}

// The tracker may send fractional or null figures; round them instead of
// failing the whole fetch.
fn lenient_seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Option::<f64>::deserialize(deserializer)?.unwrap_or_default();
    Ok(if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    })
}

fn lenient_percentage<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let value = Option::<f64>::deserialize(deserializer)?.unwrap_or_default();
    Ok(if value.is_finite() {
        value.clamp(0.0, 100.0).round() as u8
    } else {
        0
    })
}

impl ActivityStats {
    pub fn new(total_seconds: u64, active_seconds: u64, active_percentage: u8) -> Self {
        Self {
            total_seconds,
            active_seconds,
            active_percentage,
        }
        .normalized()
    }

    /// Clamps the percentage into `0..=100`.
    pub fn normalized(mut self) -> Self {
        self.active_percentage = self.active_percentage.min(100);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Daily,
    Weekly,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Daily => write!(f, "Today"),
            Period::Weekly => write!(f, "This week"),
        }
    }
}

/// The latest stats per period plus local sync bookkeeping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsBoard {
    pub daily: ActivityStats,
    pub weekly: ActivityStats,
    pub last_synced_at: Option<DateTime<Local>>,
}

impl StatsBoard {
    /// Replaces the stats of `period` and stamps the sync time.
    pub fn apply(&mut self, period: Period, stats: ActivityStats) {
        let stats = stats.normalized();
        match period {
            Period::Daily => self.daily = stats,
            Period::Weekly => self.weekly = stats,
        }
        self.last_synced_at = Some(Local::now());
    }

    pub fn get(&self, period: Period) -> &ActivityStats {
        match period {
            Period::Daily => &self.daily,
            Period::Weekly => &self.weekly,
        }
    }
}
