use chrono::{DateTime, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Wall clock in nanoseconds since the unix epoch.
pub fn now_nanos() -> u64 {
    now()
        .timestamp_nanos_opt()
        .map(|nanos| nanos.max(0) as u64)
        .unwrap_or(u64::MAX)
}
