use crate::domain::market_data::{CandlePoint, EmaValue, Timestamp, TradeEvent};
use std::fmt::Debug;
use strum::{AsRefStr, Display};

/// Base trait for everything the feeds can deliver
pub trait DomainEvent: Debug + Clone {
    fn event_type(&self) -> &'static str;
}

/// Which of the two subscriptions a frame arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
pub enum FeedKind {
    /// Data-ingest feed: trades and klines
    #[strum(serialize = "market")]
    Market,
    /// Signal feed: EMA arrays
    #[strum(serialize = "signal")]
    Signal,
}

/// A classified inbound frame, ready to be folded into the session.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    Trade(TradeEvent),
    ClosedKline(CandlePoint),
    /// An in-progress kline. Received but never charted.
    OpenKline { event_time: Timestamp },
    EmaSnapshot(Vec<EmaValue>),
}

impl DomainEvent for FeedMessage {
    fn event_type(&self) -> &'static str {
        match self {
            FeedMessage::Trade(_) => "Trade",
            FeedMessage::ClosedKline(_) => "ClosedKline",
            FeedMessage::OpenKline { .. } => "OpenKline",
            FeedMessage::EmaSnapshot(_) => "EmaSnapshot",
        }
    }
}

/// Lifecycle of one feed connection as shown in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ConnectionStatus {
    #[strum(serialize = "connecting")]
    Connecting,
    #[strum(serialize = "live")]
    Connected,
    /// Waiting `delay_secs` before the next connect attempt
    #[strum(serialize = "retrying")]
    Backoff { delay_secs: u64 },
    /// Connection dropped or never opened, no further attempts
    #[strum(serialize = "off")]
    Disconnected,
    /// Closed by the dashboard itself on unmount
    #[strum(serialize = "closed")]
    Closed,
}

impl ConnectionStatus {
    pub fn is_live(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }
}
