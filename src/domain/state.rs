use std::collections::VecDeque;

use crate::domain::market_data::{CandlePoint, EmaValue, TradeEvent};

/// Retention policy for the append-only logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryLimit {
    /// Keep every entry for the life of the session. Memory grows with the feed.
    #[default]
    Unbounded,
    /// Keep only the newest `n` entries.
    Capped(usize),
}

/// Arrival-ordered log with an optional ring-buffer cap.
///
/// Every entry gets a sequence number, its position among all entries ever
/// pushed. Sequence numbers survive eviction and are never reused.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedLog<T> {
    items: VecDeque<T>,
    limit: HistoryLimit,
    pushed: usize,
}

impl<T> BoundedLog<T> {
    pub fn new(limit: HistoryLimit) -> Self {
        Self { items: VecDeque::new(), limit, pushed: 0 }
    }

    pub fn push(&mut self, item: T) {
        self.pushed += 1;
        self.items.push_back(item);
        if let HistoryLimit::Capped(max) = self.limit {
            while self.items.len() > max {
                self.items.pop_front();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }

    /// Oldest first, paired with each entry's sequence number
    pub fn sequenced(&self) -> impl DoubleEndedIterator<Item = (usize, &T)> + ExactSizeIterator {
        let first = self.pushed - self.items.len();
        self.items.iter().enumerate().map(move |(offset, item)| (first + offset, item))
    }

    /// Entries pushed over the log's lifetime, evicted ones included
    pub fn total_pushed(&self) -> usize {
        self.pushed
    }

    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn limit(&self) -> HistoryLimit {
        self.limit
    }
}

impl<T> Default for BoundedLog<T> {
    fn default() -> Self {
        Self::new(HistoryLimit::Unbounded)
    }
}

pub type TradeLog = BoundedLog<TradeEvent>;
pub type CandleSeries = BoundedLog<CandlePoint>;

/// Everything the dashboard shows, owned by one mounted view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    pub trades: TradeLog,
    pub candles: CandleSeries,
    pub ema: Vec<EmaValue>,
}

impl SessionState {
    pub fn new(limit: HistoryLimit) -> Self {
        Self { trades: BoundedLog::new(limit), candles: BoundedLog::new(limit), ema: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty() && self.candles.is_empty() && self.ema.is_empty()
    }
}
