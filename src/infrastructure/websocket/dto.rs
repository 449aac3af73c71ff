use serde::Deserialize;

use crate::domain::errors::{FeedError, FeedResult};
use crate::domain::market_data::{CandlePoint, EmaValue, Symbol, Timestamp, TradeEvent};
use crate::time_utils::WallClock;

/// Just enough of a market frame to route it
#[derive(Debug, Deserialize)]
pub struct EventEnvelope {
    #[serde(rename = "e")]
    pub event_type: Option<String>,
    /// Only set on replies to subscribe/unsubscribe requests
    pub id: Option<serde_json::Value>,
}

/// DTO for a trade frame of the market feed
#[derive(Debug, Deserialize)]
pub struct TradeFrame {
    /// Unix seconds
    #[serde(rename = "E")]
    pub event_time: u64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "p")]
    pub price: String,
    #[serde(rename = "q")]
    pub quantity: String,
}

/// DTO for a kline frame of the market feed
#[derive(Debug, Deserialize)]
pub struct KlineFrame {
    /// Unix milliseconds
    #[serde(rename = "E")]
    pub event_time: u64,
    #[serde(rename = "k")]
    pub kline: KlineBody,
}

#[derive(Debug, Deserialize)]
pub struct KlineBody {
    #[serde(rename = "x")]
    pub is_closed: bool,
    #[serde(rename = "o")]
    pub open: String,
    #[serde(rename = "h")]
    pub high: String,
    #[serde(rename = "l")]
    pub low: String,
    #[serde(rename = "c")]
    pub close: String,
}

/// The signal feed sends a bare JSON array per frame
pub type SignalFrame = Vec<EmaValue>;

impl TradeFrame {
    pub fn into_domain(self, clock: &dyn WallClock) -> TradeEvent {
        let event_time = Timestamp::from_secs(self.event_time);
        TradeEvent {
            event_time,
            symbol: Symbol::new(self.symbol),
            price: self.price,
            quantity: self.quantity,
            display_time: clock.display_time(event_time),
        }
    }
}

impl KlineFrame {
    pub fn event_time(&self) -> Timestamp {
        Timestamp::from_millis(self.event_time)
    }

    /// Converts the kline into a chart point regardless of its closed flag.
    pub fn to_candle(&self) -> FeedResult<CandlePoint> {
        let kline = &self.kline;
        Ok(CandlePoint::new(
            self.event_time(),
            parse_price("open", &kline.open)?,
            parse_price("high", &kline.high)?,
            parse_price("low", &kline.low)?,
            parse_price("close", &kline.close)?,
        ))
    }
}

fn parse_price(field: &'static str, raw: &str) -> FeedResult<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| FeedError::InvalidNumber { field, value: raw.to_string() })
}
