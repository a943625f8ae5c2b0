//! Timestamp resolution shared by the time-based aggregations.
//!
//! The creator-local wall clock is preferred: `user_timestamp` keeps its
//! embedded offset when it has one. Candles fall back to the server instant
//! (UTC) and are skipped entirely when neither parses.

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike};

use candle_client::Candle;

/// Resolve a candle's local wall-clock instant.
pub fn local_instant(candle: &Candle) -> Option<NaiveDateTime> {
    if let Some(raw) = candle.user_timestamp.as_deref() {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_local());
        }
        // Bare ISO date-time without an offset.
        if let Ok(dt) = raw.parse::<NaiveDateTime>() {
            return Some(dt);
        }
    }
    candle.created_at.map(|dt| dt.naive_utc())
}

/// Hour of day (0-23) of the candle's local instant.
pub fn local_hour(candle: &Candle) -> Option<u32> {
    local_instant(candle).map(|dt| dt.hour())
}

/// Weekday index, Monday = 0 … Sunday = 6.
pub fn weekday_index(candle: &Candle) -> Option<usize> {
    local_instant(candle).map(|dt| dt.weekday().num_days_from_monday() as usize)
}
