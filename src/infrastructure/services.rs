//! Browser-backed implementations of the domain logging and clock traits.

use crate::domain::logging::{LogEntry, LogLevel, Logger, TimeProvider, get_time_provider};
use crate::domain::market_data::Timestamp;
use crate::time_utils::WallClock;

/// Console logger for the WASM environment
pub struct ConsoleLogger {
    min_level: LogLevel,
}

impl ConsoleLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }

    fn format_log_entry(entry: &LogEntry) -> String {
        let timestamp = get_time_provider().format_timestamp(entry.timestamp);
        let level = entry.level.to_string();
        let head = format!("[{timestamp}] {level:>5} {} | {}", entry.component, entry.message);
        match &entry.metadata {
            Some(metadata) => format!("{head} | {metadata}"),
            None => head,
        }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, entry: LogEntry) {
        if entry.level < self.min_level {
            return;
        }

        let formatted: wasm_bindgen::JsValue = Self::format_log_entry(&entry).into();
        match entry.level {
            LogLevel::Trace | LogLevel::Debug => web_sys::console::debug_1(&formatted),
            LogLevel::Info => web_sys::console::info_1(&formatted),
            LogLevel::Warn => web_sys::console::warn_1(&formatted),
            LogLevel::Error => web_sys::console::error_1(&formatted),
        }
    }
}

/// Log timestamps from `Date.now()`, formatted in local time
pub struct BrowserTimeProvider;

impl BrowserTimeProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BrowserTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeProvider for BrowserTimeProvider {
    fn current_timestamp(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    fn format_timestamp(&self, timestamp: u64) -> String {
        let date = js_sys::Date::new(&(timestamp as f64).into());
        format!(
            "{:02}:{:02}:{:02}.{:03}",
            date.get_hours(),
            date.get_minutes(),
            date.get_seconds(),
            date.get_milliseconds()
        )
    }
}

/// Wall clock that follows the browser's timezone, DST included
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserWallClock;

impl WallClock for BrowserWallClock {
    fn utc_offset_minutes(&self, timestamp: Timestamp) -> i32 {
        let date = js_sys::Date::new(&timestamp.as_f64().into());
        // getTimezoneOffset is UTC minus local
        -(date.get_timezone_offset() as i32)
    }
}
