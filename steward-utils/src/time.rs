use std::time::{SystemTime, UNIX_EPOCH};

use twilight_model::util::Timestamp;

/// Current Unix time in seconds, zero if the clock is before the epoch.
pub fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

/// Current time as an embed timestamp.
pub fn now_timestamp() -> anyhow::Result<Timestamp> {
    Ok(Timestamp::from_secs(now_unix_secs() as i64)?)
}

/// Render a prompt timeout as `3m`, `90s`, `1m 30s`.
pub fn format_timeout(seconds: u64) -> String {
    match (seconds / 60, seconds % 60) {
        (0, secs) => format!("{secs}s"),
        (mins, 0) => format!("{mins}m"),
        (mins, secs) => format!("{mins}m {secs}s"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_formatting() {
        assert_eq!(format_timeout(180), "3m");
        assert_eq!(format_timeout(30), "30s");
        assert_eq!(format_timeout(90), "1m 30s");
    }
}
