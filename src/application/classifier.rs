//! Turns raw text frames into [`FeedMessage`]s.
//!
//! Classification is pure: it never touches session state, so a frame that
//! fails here is simply dropped by the caller.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::errors::{FeedError, FeedResult};
use crate::domain::events::{FeedKind, FeedMessage};
use crate::infrastructure::websocket::dto::{EventEnvelope, KlineFrame, SignalFrame, TradeFrame};
use crate::time_utils::WallClock;

const TRADE_EVENT: &str = "trade";
const KLINE_EVENT: &str = "kline";

/// Classify a frame according to the feed it arrived on.
pub fn classify(kind: FeedKind, raw: &str, clock: &dyn WallClock) -> FeedResult<FeedMessage> {
    match kind {
        FeedKind::Market => classify_market(raw, clock),
        FeedKind::Signal => classify_signal(raw),
    }
}

/// Market frames are routed on their `e` discriminator.
pub fn classify_market(raw: &str, clock: &dyn WallClock) -> FeedResult<FeedMessage> {
    let value: Value = serde_json::from_str(raw)?;
    if !value.is_object() {
        return Err(FeedError::Malformed("expected a JSON object".to_string()));
    }

    let envelope = EventEnvelope::deserialize(&value)
        .map_err(|e| FeedError::InvalidPayload(e.to_string()))?;
    match envelope.event_type.as_deref() {
        None => match envelope.id {
            Some(id) => Err(FeedError::ControlReply(id.to_string())),
            None => Err(FeedError::MissingEventType),
        },
        Some(TRADE_EVENT) => {
            let frame: TradeFrame = from_payload(value)?;
            Ok(FeedMessage::Trade(frame.into_domain(clock)))
        }
        Some(KLINE_EVENT) => {
            let frame: KlineFrame = from_payload(value)?;
            if frame.kline.is_closed {
                Ok(FeedMessage::ClosedKline(frame.to_candle()?))
            } else {
                Ok(FeedMessage::OpenKline { event_time: frame.event_time() })
            }
        }
        Some(other) => Err(FeedError::UnknownEventType(other.to_string())),
    }
}

/// Signal frames carry no envelope: each one is the full EMA array.
pub fn classify_signal(raw: &str) -> FeedResult<FeedMessage> {
    let values: SignalFrame = serde_json::from_str(raw)?;
    Ok(FeedMessage::EmaSnapshot(values))
}

fn from_payload<T: serde::de::DeserializeOwned>(value: Value) -> FeedResult<T> {
    serde_json::from_value(value).map_err(|e| FeedError::InvalidPayload(e.to_string()))
}
