//! Lifetime of the two feed connections behind one mounted dashboard.

use futures::channel::oneshot;
use std::rc::Rc;

use crate::application::classifier::classify;
use crate::config::DashboardConfig;
use crate::domain::{
    errors::FeedError,
    events::{ConnectionStatus, FeedKind, FeedMessage},
    logging::{LogComponent, LogLevel, get_logger},
};
use crate::infrastructure::websocket::{FeedClient, FeedSubscription};
use crate::time_utils::WallClock;

/// Longest raw-frame excerpt attached to a drop log entry
const FRAME_EXCERPT_LEN: usize = 120;

/// Both feed subscriptions of one dashboard.
///
/// Closing or dropping the session releases both sockets.
#[derive(Debug)]
pub struct DashboardSession {
    market: FeedSubscription,
    signal: FeedSubscription,
}

impl DashboardSession {
    /// Open the market and signal feeds described by `config`.
    ///
    /// `on_message` receives every classified frame; `on_status` every
    /// connection state change. Both run on the browser event loop.
    pub fn start<M, S>(
        config: &DashboardConfig,
        clock: Rc<dyn WallClock>,
        on_message: M,
        on_status: S,
    ) -> Self
    where
        M: Fn(FeedKind, FeedMessage) + Clone + 'static,
        S: Fn(FeedKind, ConnectionStatus) + Clone + 'static,
    {
        get_logger().info(
            LogComponent::Application("Session"),
            &format!("🚀 Starting dashboard session ({} stage)", config.stage),
        );

        let market = spawn_feed(
            FeedClient::new(FeedKind::Market, &config.market_feed_url, config.reconnect),
            Rc::clone(&clock),
            on_message.clone(),
            on_status.clone(),
        );
        let signal = spawn_feed(
            FeedClient::new(FeedKind::Signal, &config.signal_feed_url, config.reconnect),
            clock,
            on_message,
            on_status,
        );

        Self { market, signal }
    }

    pub fn from_subscriptions(market: FeedSubscription, signal: FeedSubscription) -> Self {
        Self { market, signal }
    }

    pub fn is_open(&self) -> bool {
        self.market.is_open() || self.signal.is_open()
    }

    /// Release both feeds
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        self.market.close();
        self.signal.close();
    }
}

impl Drop for DashboardSession {
    fn drop(&mut self) {
        self.release();
    }
}

fn spawn_feed<M, S>(client: FeedClient, clock: Rc<dyn WallClock>, on_message: M, on_status: S) -> FeedSubscription
where
    M: Fn(FeedKind, FeedMessage) + 'static,
    S: Fn(FeedKind, ConnectionStatus) + 'static,
{
    let kind = client.kind();
    let (tx, rx) = oneshot::channel();

    wasm_bindgen_futures::spawn_local(async move {
        client
            .run(
                |raw| {
                    handle_frame(kind, raw, clock.as_ref(), |message| on_message(kind, message));
                },
                |status| on_status(kind, status),
                rx,
            )
            .await;
    });

    FeedSubscription::new(kind, tx)
}

/// Classify one raw frame and hand the result to `sink`.
///
/// Frames that fail to classify are logged and dropped. Returns whether
/// `sink` was called.
pub fn handle_frame<F>(kind: FeedKind, raw: &str, clock: &dyn WallClock, sink: F) -> bool
where
    F: FnOnce(FeedMessage),
{
    match classify(kind, raw, clock) {
        Ok(message) => {
            sink(message);
            true
        }
        Err(e) => {
            get_logger().log_with_metadata(
                drop_level(&e),
                LogComponent::Application("Session"),
                &format!("Dropped {kind} frame: {e}"),
                &excerpt(raw),
            );
            false
        }
    }
}

/// Unknown event types and subscribe replies are expected chatter; broken frames are not
fn drop_level(error: &FeedError) -> LogLevel {
    match error {
        FeedError::UnknownEventType(_) | FeedError::ControlReply(_) => LogLevel::Debug,
        _ => LogLevel::Warn,
    }
}

fn excerpt(raw: &str) -> String {
    match raw.char_indices().nth(FRAME_EXCERPT_LEN) {
        Some((cut, _)) => format!("{}…", &raw[..cut]),
        None => raw.to_string(),
    }
}
