//! Maps session state to render-ready structures.
//!
//! Everything here is pure so the panels and the chart geometry can be tested
//! without a browser.

use serde::Serialize;

use crate::domain::market_data::{CandlePoint, EmaValue, Timestamp, TradeEvent};
use crate::domain::state::{CandleSeries, TradeLog};
use crate::time_utils::WallClock;

/// Shown by any panel whose container is still empty
pub const PLACEHOLDER: &str = "Waiting for data from websocket...";
pub const EMA_HEADER: &str = "EMA Values:";

/// Series length from which geometry is computed on the rayon pool
#[cfg(feature = "parallel")]
const PARALLEL_THRESHOLD: usize = 100;

/// One row of the trade panel. `key` is the trade's sequence number in the log,
/// so a row keeps its key after older trades are evicted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeLine {
    pub key: usize,
    pub text: String,
}

pub fn trade_line(trade: &TradeEvent) -> String {
    format!(
        "{}: {} was bought for {} at volume {}",
        trade.display_time, trade.symbol, trade.price, trade.quantity
    )
}

/// Trade panel rows, newest first
pub fn trade_lines(trades: &TradeLog) -> Vec<TradeLine> {
    trades
        .sequenced()
        .rev()
        .map(|(key, trade)| TradeLine { key, text: trade_line(trade) })
        .collect()
}

/// EMA panel rows, last array element first
pub fn ema_lines(values: &[EmaValue]) -> Vec<String> {
    values.iter().rev().map(ToString::to_string).collect()
}

/// Canvas size and the margins around the plot area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    /// Room on the right for the last-close label
    pub text_space: f64,
}

impl ChartLayout {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width: width as f64, height: height as f64, padding: 50.0, text_space: 80.0 }
    }

    pub fn plot_width(&self) -> f64 {
        (self.width - self.padding * 2.0 - self.text_space).max(1.0)
    }

    pub fn plot_height(&self) -> f64 {
        (self.height - self.padding * 2.0).max(1.0)
    }

    pub fn plot_right(&self) -> f64 {
        self.padding + self.plot_width()
    }

    pub fn plot_bottom(&self) -> f64 {
        self.padding + self.plot_height()
    }
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self::new(800, 400)
    }
}

/// Price and time extents of a series, mapped onto a layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleParams {
    pub min_price: f64,
    pub max_price: f64,
    pub first_time: f64,
    pub last_time: f64,
    pub candle_width: f64,
    #[serde(skip)]
    layout: ChartLayout,
}

impl ScaleParams {
    /// `None` for an empty series
    pub fn from_candles<'a, I>(candles: I, layout: ChartLayout) -> Option<Self>
    where
        I: ExactSizeIterator<Item = &'a CandlePoint>,
    {
        let count = candles.len();
        let mut extents: Option<(f64, f64, f64, f64)> = None;
        for candle in candles {
            let t = candle.timestamp.as_f64();
            extents = Some(match extents {
                None => (candle.low(), candle.high(), t, t),
                Some((lo, hi, t0, t1)) => {
                    (lo.min(candle.low()), hi.max(candle.high()), t0.min(t), t1.max(t))
                }
            });
        }
        let (mut min_price, mut max_price, first_time, last_time) = extents?;

        if max_price - min_price <= f64::EPSILON {
            let pad = if max_price.abs() > 0.0 { max_price.abs() * 0.01 } else { 1.0 };
            min_price -= pad;
            max_price += pad;
        }

        Some(Self {
            min_price,
            max_price,
            first_time,
            last_time,
            candle_width: layout.plot_width() / count as f64,
            layout,
        })
    }

    pub fn price_range(&self) -> f64 {
        self.max_price - self.min_price
    }

    /// Y grows downwards: the highest price sits on the top padding
    pub fn price_to_y(&self, price: f64) -> f64 {
        self.layout.padding + (self.max_price - price) / self.price_range() * self.layout.plot_height()
    }

    /// Candles are spaced by event time; a single instant lands mid-plot
    pub fn time_to_x(&self, millis: f64) -> f64 {
        let span = self.last_time - self.first_time;
        let half = self.candle_width / 2.0;
        if span <= 0.0 {
            return self.layout.padding + self.layout.plot_width() / 2.0;
        }
        self.layout.padding + half + (millis - self.first_time) / span * (self.layout.plot_width() - self.candle_width)
    }
}

/// Screen coordinates of one candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CandleGeometry {
    pub x: f64,
    pub high_y: f64,
    pub low_y: f64,
    pub open_y: f64,
    pub close_y: f64,
    pub body_width: f64,
    pub is_bullish: bool,
}

impl CandleGeometry {
    pub fn body_top(&self) -> f64 {
        self.open_y.min(self.close_y)
    }

    pub fn body_height(&self) -> f64 {
        (self.open_y - self.close_y).abs()
    }
}

fn candle_geometry(candle: &CandlePoint, params: &ScaleParams) -> CandleGeometry {
    CandleGeometry {
        x: params.time_to_x(candle.timestamp.as_f64()),
        high_y: params.price_to_y(candle.high()),
        low_y: params.price_to_y(candle.low()),
        open_y: params.price_to_y(candle.open()),
        close_y: params.price_to_y(candle.close()),
        body_width: (params.candle_width * 0.6).clamp(1.0, 24.0),
        is_bullish: candle.is_bullish(),
    }
}

/// Price marker drawn across the plot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceLine {
    pub price: f64,
    pub y: f64,
}

/// Everything the canvas renderer draws for a non-empty series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartModel {
    pub scale: ScaleParams,
    pub candles: Vec<CandleGeometry>,
    pub last_close: PriceLine,
    pub first_label: String,
    pub last_label: String,
}

impl ChartModel {
    /// `None` while the series is empty; the renderer then shows the placeholder.
    pub fn project(series: &CandleSeries, layout: ChartLayout, clock: &dyn WallClock) -> Option<Self> {
        let scale = ScaleParams::from_candles(series.iter(), layout)?;
        let latest = series.latest()?;

        let candles = project_candles(series, &scale);
        let last_close = PriceLine { price: latest.close(), y: scale.price_to_y(latest.close()) };

        Some(Self {
            first_label: clock.axis_label(millis_to_timestamp(scale.first_time)),
            last_label: clock.axis_label(millis_to_timestamp(scale.last_time)),
            scale,
            candles,
            last_close,
        })
    }
}

fn millis_to_timestamp(millis: f64) -> Timestamp {
    Timestamp::from_millis(millis as u64)
}

#[cfg(not(feature = "parallel"))]
fn project_candles(series: &CandleSeries, scale: &ScaleParams) -> Vec<CandleGeometry> {
    series.iter().map(|candle| candle_geometry(candle, scale)).collect()
}

#[cfg(feature = "parallel")]
fn project_candles(series: &CandleSeries, scale: &ScaleParams) -> Vec<CandleGeometry> {
    use rayon::prelude::*;

    if series.len() < PARALLEL_THRESHOLD {
        return series.iter().map(|candle| candle_geometry(candle, scale)).collect();
    }

    let points: Vec<CandlePoint> = series.iter().copied().collect();
    points.par_iter().map(|candle| candle_geometry(candle, scale)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market_data::Symbol;
    use crate::domain::state::HistoryLimit;
    use crate::time_utils::FixedOffsetClock;

    fn trade(secs: u64, price: &str) -> TradeEvent {
        TradeEvent {
            event_time: Timestamp::from_secs(secs),
            symbol: Symbol::from("BTCUSDT"),
            price: price.to_string(),
            quantity: "0.5".to_string(),
            display_time: FixedOffsetClock::utc().display_time(Timestamp::from_secs(secs)),
        }
    }

    fn series(points: &[CandlePoint]) -> CandleSeries {
        let mut series = CandleSeries::new(HistoryLimit::Unbounded);
        for point in points {
            series.push(*point);
        }
        series
    }

    #[test]
    fn trade_lines_are_newest_first_with_arrival_keys() {
        let mut log = TradeLog::default();
        log.push(trade(0, "1.0"));
        log.push(trade(1, "2.0"));

        let lines = trade_lines(&log);
        assert_eq!(lines[0].key, 1);
        assert_eq!(lines[0].text, "00:00:01: BTCUSDT was bought for 2.0 at volume 0.5");
        assert_eq!(lines[1].key, 0);
    }

    #[test]
    fn evicting_old_trades_never_reuses_a_row_key() {
        let mut log = TradeLog::new(HistoryLimit::Capped(2));
        let mut keyed = Vec::new();
        for secs in 0..4 {
            log.push(trade(secs, &format!("{secs}.0")));
            keyed.extend(trade_lines(&log).into_iter().map(|line| (line.key, line.text)));
        }

        let keys: Vec<usize> = trade_lines(&log).iter().map(|line| line.key).collect();
        assert_eq!(keys, vec![3, 2]);
        for (key, text) in &keyed {
            assert!(keyed.iter().all(|(other, other_text)| other != key || other_text == text));
        }
    }

    #[test]
    fn ema_lines_reverse_the_array() {
        let values = vec![EmaValue::from("10.2"), EmaValue::from(10.3)];
        assert_eq!(ema_lines(&values), vec!["10.3", "10.2"]);
        assert!(ema_lines(&[]).is_empty());
    }

    #[test]
    fn empty_series_has_no_chart() {
        let clock = FixedOffsetClock::utc();
        assert!(ChartModel::project(&CandleSeries::default(), ChartLayout::default(), &clock).is_none());
    }

    #[test]
    fn extremes_map_to_plot_edges() {
        let layout = ChartLayout::default();
        let clock = FixedOffsetClock::utc();
        let series = series(&[
            CandlePoint::new(Timestamp::from_millis(0), 10.0, 12.0, 9.0, 11.0),
            CandlePoint::new(Timestamp::from_millis(60_000), 11.0, 15.0, 10.0, 10.5),
        ]);

        let model = ChartModel::project(&series, layout, &clock).unwrap();
        assert_eq!(model.scale.min_price, 9.0);
        assert_eq!(model.scale.max_price, 15.0);
        assert!((model.candles[1].high_y - layout.padding).abs() < 1e-9);
        assert!((model.candles[0].low_y - layout.plot_bottom()).abs() < 1e-9);
        assert!(model.candles[0].is_bullish);
        assert!(!model.candles[1].is_bullish);
        assert!(model.candles[0].x < model.candles[1].x);
        assert_eq!(model.last_close.price, 10.5);
        assert_eq!(model.first_label, "00:00");
        assert_eq!(model.last_label, "00:01");
    }

    #[test]
    fn flat_series_still_has_a_price_range() {
        let layout = ChartLayout::default();
        let series = series(&[CandlePoint::new(Timestamp::from_millis(1000), 5.0, 5.0, 5.0, 5.0)]);

        let model = ChartModel::project(&series, layout, &FixedOffsetClock::utc()).unwrap();
        assert!(model.scale.price_range() > 0.0);
        assert!(model.candles[0].high_y.is_finite());
        assert_eq!(model.candles[0].x, layout.padding + layout.plot_width() / 2.0);
    }

    #[test]
    fn geometry_keeps_arrival_order_for_out_of_order_points() {
        let series = series(&[
            CandlePoint::new(Timestamp::from_millis(2000), 1.0, 2.0, 0.5, 1.5),
            CandlePoint::new(Timestamp::from_millis(1000), 1.0, 2.0, 0.5, 1.5),
        ]);

        let model = ChartModel::project(&series, ChartLayout::default(), &FixedOffsetClock::utc()).unwrap();
        assert_eq!(model.candles.len(), 2);
        assert!(model.candles[0].x > model.candles[1].x);
    }
}
