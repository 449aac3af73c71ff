use serde::{Deserialize, Serialize};
use std::fmt;

use super::value_objects::{Symbol, Timestamp};

/// A single executed trade as shown in the trade panel.
///
/// Price and quantity stay the decimal strings the feed sent, so the panel
/// shows exactly what the exchange reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeEvent {
    pub event_time: Timestamp,
    pub symbol: Symbol,
    pub price: String,
    pub quantity: String,
    /// Local wall-clock `HH:MM:SS` of `event_time`
    pub display_time: String,
}

/// A committed candle derived from a closed kline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandlePoint {
    pub timestamp: Timestamp,
    /// `[open, high, low, close]`
    pub ohlc: [f64; 4],
}

impl CandlePoint {
    pub fn new(timestamp: Timestamp, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self { timestamp, ohlc: [open, high, low, close] }
    }

    pub fn open(&self) -> f64 {
        self.ohlc[0]
    }

    pub fn high(&self) -> f64 {
        self.ohlc[1]
    }

    pub fn low(&self) -> f64 {
        self.ohlc[2]
    }

    pub fn close(&self) -> f64 {
        self.ohlc[3]
    }

    pub fn is_bullish(&self) -> bool {
        self.close() >= self.open()
    }
}

/// One entry of the signal feed. Numbers and strings are both accepted and
/// rendered verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmaValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for EmaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmaValue::Number(value) => write!(f, "{}", value),
            EmaValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for EmaValue {
    fn from(value: &str) -> Self {
        EmaValue::Text(value.to_string())
    }
}

impl From<f64> for EmaValue {
    fn from(value: f64) -> Self {
        EmaValue::Number(value)
    }
}
