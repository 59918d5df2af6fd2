use chrono::{DateTime, Duration, Timelike, Utc};

pub const DEFAULT_HORIZON_MINUTES: u32 = 24 * 60;
pub const MAX_HORIZON_MINUTES: u32 = 7 * 24 * 60;

/// Start of the minute containing `now`
pub fn truncate_to_minute(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::seconds(now.second() as i64) - Duration::nanoseconds(now.nanosecond() as i64)
}

/// One instant per minute, `horizon_minutes` of them, starting at the
/// current minute.
pub fn build_timeline(now: DateTime<Utc>, horizon_minutes: u32) -> Vec<DateTime<Utc>> {
    let start = truncate_to_minute(now);
    (0..horizon_minutes)
        .map(|i| start + Duration::minutes(i64::from(i)))
        .collect()
}
