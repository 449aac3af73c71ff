#![cfg(target_arch = "wasm32")]

use futures::channel::oneshot;
use futures::future::select;
use gloo_timers::future::sleep;
use js_sys::Date;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use trade_stream_dashboard::config::ReconnectPolicy;
use trade_stream_dashboard::domain::errors::FeedError;
use trade_stream_dashboard::domain::events::{ConnectionStatus, FeedKind};
use trade_stream_dashboard::domain::market_data::{CandlePoint, Timestamp};
use trade_stream_dashboard::domain::state::CandleSeries;
use trade_stream_dashboard::infrastructure::rendering::CanvasRenderer;
use trade_stream_dashboard::infrastructure::services::BrowserWallClock;
use trade_stream_dashboard::infrastructure::websocket::FeedClient;
use trade_stream_dashboard::time_utils::WallClock;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn canvas() -> web_sys::HtmlCanvasElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas = document
        .create_element("canvas")
        .unwrap()
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .unwrap();
    document.body().unwrap().append_child(&canvas).unwrap();
    canvas
}

#[wasm_bindgen_test]
fn browser_clock_matches_local_date() {
    let millis = 1_700_000_000_000u64;
    let date = Date::new(&JsValue::from_f64(millis as f64));
    assert_eq!(
        BrowserWallClock.display_time(Timestamp::from_millis(millis)),
        format!("{:02}:{:02}:{:02}", date.get_hours(), date.get_minutes(), date.get_seconds())
    );
}

#[wasm_bindgen_test]
fn malformed_url_fails_to_connect() {
    let client = FeedClient::new(FeedKind::Market, "definitely not a url", ReconnectPolicy::Never);
    assert!(matches!(client.connect(), Err(FeedError::Connection(_))));
}

#[wasm_bindgen_test(async)]
async fn refused_connection_ends_disconnected_without_retry() {
    let client = FeedClient::new(FeedKind::Signal, "ws://127.0.0.1:9/ws", ReconnectPolicy::Never);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let (_tx, rx) = oneshot::channel();

    let run = client.run(|_| {}, move |status| sink.borrow_mut().push(status), rx);
    let _ = select(Box::pin(run), Box::pin(sleep(Duration::from_secs(5)))).await;

    assert_eq!(*seen.borrow(), vec![ConnectionStatus::Connecting, ConnectionStatus::Disconnected]);
}

#[wasm_bindgen_test(async)]
async fn refused_retries_back_off_with_growing_delays() {
    let client = FeedClient::new(FeedKind::Market, "ws://127.0.0.1:59999/ws", ReconnectPolicy::backoff());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let (_tx, rx) = oneshot::channel();

    let run = client.run(|_| {}, move |status| sink.borrow_mut().push(status), rx);
    let _ = select(Box::pin(run), Box::pin(sleep(Duration::from_millis(4500)))).await;

    let seen = seen.borrow();
    assert!(!seen.contains(&ConnectionStatus::Connected));
    let delays: Vec<u64> = seen
        .iter()
        .filter_map(|status| match status {
            ConnectionStatus::Backoff { delay_secs } => Some(*delay_secs),
            _ => None,
        })
        .collect();
    assert_eq!(&delays[..2], &[1, 2]);
}

#[wasm_bindgen_test]
fn renderer_draws_placeholder_and_candles() {
    let canvas = canvas();
    let renderer = CanvasRenderer::attach(&canvas, 400, 300).unwrap();
    assert_eq!(canvas.width(), 400);

    let mut series = CandleSeries::default();
    assert!(renderer.render(&series, &BrowserWallClock).is_ok());

    series.push(CandlePoint::new(Timestamp::from_millis(0), 1.0, 2.0, 0.5, 1.5));
    series.push(CandlePoint::new(Timestamp::from_millis(60_000), 1.5, 1.8, 1.0, 1.1));
    assert!(renderer.render(&series, &BrowserWallClock).is_ok());
}
