use crate::domain::market_data::Timestamp;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Converts epoch timestamps into local wall-clock time.
///
/// The browser implementation asks `Date` for the timezone offset; tests use a
/// fixed offset so the output is deterministic.
pub trait WallClock {
    /// Minutes to add to UTC to get local time at `timestamp`
    fn utc_offset_minutes(&self, timestamp: Timestamp) -> i32;

    /// `HH:MM:SS` in local time
    fn display_time(&self, timestamp: Timestamp) -> String {
        format_hms(timestamp, self.utc_offset_minutes(timestamp))
    }

    /// `HH:MM` in local time, used for axis labels
    fn axis_label(&self, timestamp: Timestamp) -> String {
        let hms = self.display_time(timestamp);
        hms[..5].to_string()
    }
}

/// Wall clock with a constant offset from UTC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedOffsetClock {
    pub offset_minutes: i32,
}

impl FixedOffsetClock {
    pub fn utc() -> Self {
        Self { offset_minutes: 0 }
    }

    pub fn new(offset_minutes: i32) -> Self {
        Self { offset_minutes }
    }
}

impl WallClock for FixedOffsetClock {
    fn utc_offset_minutes(&self, _timestamp: Timestamp) -> i32 {
        self.offset_minutes
    }
}

/// Format the time-of-day of `timestamp` shifted by `offset_minutes`.
///
/// Log stamps go through `js_sys::Date` in `BrowserTimeProvider::format_timestamp`;
/// here only the offset comes from `Date`, so the arithmetic also runs natively.
pub fn format_hms(timestamp: Timestamp, offset_minutes: i32) -> String {
    let millis = i64::try_from(timestamp.value()).unwrap_or(i64::MAX);
    let local = millis.saturating_add(i64::from(offset_minutes) * 60_000);
    let of_day = local.rem_euclid(MILLIS_PER_DAY) / 1000;
    format!("{:02}:{:02}:{:02}", of_day / 3600, (of_day % 3600) / 60, of_day % 60)
}
