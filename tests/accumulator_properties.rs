use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use trade_stream_dashboard::application::{apply, classify};
use trade_stream_dashboard::domain::events::FeedKind;
use trade_stream_dashboard::domain::market_data::{CandlePoint, EmaValue, Timestamp};
use trade_stream_dashboard::domain::state::{HistoryLimit, SessionState};
use trade_stream_dashboard::time_utils::{FixedOffsetClock, format_hms};

fn feed(state: &mut SessionState, kind: FeedKind, raw: &str) -> bool {
    match classify(kind, raw, &FixedOffsetClock::utc()) {
        Ok(message) => apply(state, message),
        Err(_) => false,
    }
}

fn trade_frame(secs: u32, n: usize) -> String {
    format!(r#"{{"e":"trade","E":{secs},"s":"BTCUSDT","p":"{n}.5","q":"0.{n}"}}"#)
}

fn kline_frame(millis: u32, closed: bool, ohlc: [f64; 4]) -> String {
    format!(
        r#"{{"e":"kline","E":{millis},"k":{{"x":{closed},"o":"{}","h":"{}","l":"{}","c":"{}"}}}}"#,
        ohlc[0], ohlc[1], ohlc[2], ohlc[3]
    )
}

fn cents(raw: (u32, u32, u32, u32)) -> [f64; 4] {
    [raw.0, raw.1, raw.2, raw.3].map(|v| v as f64 / 100.0)
}

fn seeded_state() -> SessionState {
    let mut state = SessionState::new(HistoryLimit::Unbounded);
    feed(&mut state, FeedKind::Market, &trade_frame(60, 1));
    feed(&mut state, FeedKind::Market, &kline_frame(1000, true, [1.0, 2.0, 0.5, 1.5]));
    feed(&mut state, FeedKind::Signal, r#"["10.2", 10.3]"#);
    state
}

#[quickcheck]
fn trades_append_in_arrival_order(times: Vec<u32>) -> bool {
    let mut state = SessionState::default();
    for (n, secs) in times.iter().enumerate() {
        feed(&mut state, FeedKind::Market, &trade_frame(*secs, n));
    }

    state.trades.len() == times.len()
        && state.trades.iter().zip(&times).enumerate().all(|(n, (trade, secs))| {
            let ts = Timestamp::from_secs(u64::from(*secs));
            trade.event_time == ts
                && trade.display_time == format_hms(ts, 0)
                && trade.price == format!("{n}.5")
        })
}

#[quickcheck]
fn open_klines_never_grow_the_series(klines: Vec<(u32, (u32, u32, u32, u32))>) -> bool {
    let mut state = seeded_state();
    let before = state.candles.len();
    for (millis, ohlc) in klines {
        feed(&mut state, FeedKind::Market, &kline_frame(millis, false, cents(ohlc)));
    }
    state.candles.len() == before
}

#[quickcheck]
fn closed_kline_appends_exactly_one_point(millis: u32, ohlc: (u32, u32, u32, u32)) -> bool {
    let mut state = seeded_state();
    let before = state.candles.len();
    let ohlc = cents(ohlc);

    let changed = feed(&mut state, FeedKind::Market, &kline_frame(millis, true, ohlc));

    changed
        && state.candles.len() == before + 1
        && state.candles.latest()
            == Some(&CandlePoint { timestamp: Timestamp::from_millis(u64::from(millis)), ohlc })
}

#[quickcheck]
fn unparseable_frames_leave_state_untouched(junk: String) -> TestResult {
    if serde_json::from_str::<serde_json::Value>(&junk).is_ok() {
        return TestResult::discard();
    }

    let mut state = seeded_state();
    let before = state.clone();
    let market = feed(&mut state, FeedKind::Market, &junk);
    let signal = feed(&mut state, FeedKind::Signal, &junk);
    TestResult::from_bool(!market && !signal && state == before)
}

#[quickcheck]
fn ema_snapshot_replaces_previous_values(first: Vec<u32>, second: Vec<u32>) -> bool {
    let as_frame = |values: &[u32]| serde_json::to_string(&values.iter().map(u32::to_string).collect::<Vec<_>>());
    let (Ok(first_frame), Ok(second_frame)) = (as_frame(&first[..]), as_frame(&second[..])) else {
        return false;
    };

    let mut state = SessionState::default();
    feed(&mut state, FeedKind::Signal, &first_frame);
    feed(&mut state, FeedKind::Signal, &second_frame);

    let expected: Vec<EmaValue> = second.iter().map(|v| EmaValue::Text(v.to_string())).collect();
    state.ema == expected
}

#[quickcheck]
fn capped_history_keeps_the_newest_entries(times: Vec<u32>, cap: u8) -> TestResult {
    if cap == 0 {
        return TestResult::discard();
    }
    let cap = usize::from(cap % 16) + 1;

    let mut state = SessionState::new(HistoryLimit::Capped(cap));
    for (n, secs) in times.iter().enumerate() {
        feed(&mut state, FeedKind::Market, &trade_frame(*secs, n));
    }

    let kept: Vec<Timestamp> = state.trades.iter().map(|t| t.event_time).collect();
    let expected: Vec<Timestamp> = times
        .iter()
        .skip(times.len().saturating_sub(cap))
        .map(|secs| Timestamp::from_secs(u64::from(*secs)))
        .collect();
    TestResult::from_bool(kept == expected)
}
