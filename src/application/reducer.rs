use crate::domain::events::{DomainEvent, FeedMessage};
use crate::domain::logging::LogComponent;
use crate::domain::state::SessionState;
use crate::log_trace;

/// Fold one classified message into the session.
///
/// Returns `true` when anything visible changed. Trades and closed klines are
/// appended in arrival order, open klines are dropped, EMA snapshots replace
/// the whole EMA log.
pub fn apply(state: &mut SessionState, message: FeedMessage) -> bool {
    log_trace!(LogComponent::Application("Reducer"), "applying {}", message.event_type());
    match message {
        FeedMessage::Trade(trade) => {
            state.trades.push(trade);
            true
        }
        FeedMessage::ClosedKline(candle) => {
            state.candles.push(candle);
            true
        }
        FeedMessage::OpenKline { .. } => false,
        FeedMessage::EmaSnapshot(values) => {
            state.ema = values;
            true
        }
    }
}
