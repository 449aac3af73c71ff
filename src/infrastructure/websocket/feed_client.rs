use crate::config::{BackoffState, ReconnectPolicy};
use crate::domain::{
    errors::{FeedError, FeedResult},
    events::{ConnectionStatus, FeedKind},
    logging::{LogComponent, get_logger},
};
use futures::channel::oneshot;
use futures::future::{Either, select};
use futures::{Stream, StreamExt};
use gloo_net::websocket::{Message, State, WebSocketError, futures::WebSocket};
use std::future::Future;
use std::time::Duration;

/// Normal closure code sent when the dashboard releases a feed
const CLOSE_NORMAL: u16 = 1000;

/// How often a CONNECTING socket is checked for the open handshake
const OPEN_POLL: Duration = Duration::from_millis(50);

/// How a frame pump stopped
#[derive(Debug, Clone, PartialEq)]
pub enum PumpExit {
    /// The owner asked the feed to close
    Shutdown,
    /// The server ended the stream
    Ended,
    /// Transport error
    Failed(FeedError),
}

/// Receive-only WebSocket client for one feed, based on gloo
pub struct FeedClient {
    kind: FeedKind,
    url: String,
    reconnect: ReconnectPolicy,
}

impl FeedClient {
    pub fn new(kind: FeedKind, url: impl Into<String>, reconnect: ReconnectPolicy) -> Self {
        Self { kind, url: url.into(), reconnect }
    }

    pub fn kind(&self) -> FeedKind {
        self.kind
    }

    /// Open the socket. Fails synchronously on a malformed URL or a blocked port.
    pub fn connect(&self) -> FeedResult<WebSocket> {
        get_logger().info(
            LogComponent::Infrastructure("FeedWS"),
            &format!("🔌 Connecting {} feed: {}", self.kind, self.url),
        );

        WebSocket::open(&self.url)
            .map_err(|e| FeedError::Connection(format!("Failed to open WebSocket: {e:?}")))
    }

    /// Run the feed until `shutdown` fires (or its sender is dropped).
    ///
    /// Every text frame is handed to `on_text`. With [`ReconnectPolicy::Never`]
    /// a dropped connection ends the task; with backoff it is reopened after
    /// an exponentially growing delay.
    pub async fn run<F, S>(self, mut on_text: F, mut on_status: S, mut shutdown: oneshot::Receiver<()>)
    where
        F: FnMut(&str),
        S: FnMut(ConnectionStatus),
    {
        use gloo_timers::future::sleep;

        let mut backoff = BackoffState::new(self.reconnect);
        loop {
            on_status(ConnectionStatus::Connecting);
            let mut opened = false;
            let exit = match self.connect() {
                Ok(mut ws) => {
                    let ready = wait_until_open(|| ws.state(), &mut shutdown, || sleep(OPEN_POLL)).await;
                    let exit = match ready {
                        Ok(()) => {
                            opened = true;
                            on_status(ConnectionStatus::Connected);
                            pump_frames(&mut ws, &mut shutdown, &mut on_text).await
                        }
                        Err(exit) => exit,
                    };
                    if exit == PumpExit::Shutdown {
                        if let Err(e) = ws.close(Some(CLOSE_NORMAL), Some("dashboard closed")) {
                            get_logger().warn(
                                LogComponent::Infrastructure("FeedWS"),
                                &format!("Closing {} feed failed: {e:?}", self.kind),
                            );
                        }
                    }
                    exit
                }
                Err(e) => PumpExit::Failed(e),
            };

            match exit {
                PumpExit::Shutdown => {
                    get_logger().info(
                        LogComponent::Infrastructure("FeedWS"),
                        &format!("🔌 {} feed closed", self.kind),
                    );
                    on_status(ConnectionStatus::Closed);
                    return;
                }
                PumpExit::Ended => {
                    get_logger().warn(
                        LogComponent::Infrastructure("FeedWS"),
                        &format!("{} feed ended by server", self.kind),
                    );
                }
                PumpExit::Failed(e) => {
                    get_logger().error(
                        LogComponent::Infrastructure("FeedWS"),
                        &format!("❌ {} feed: {e}", self.kind),
                    );
                }
            }

            let Some(delay) = backoff.after_attempt(opened) else {
                on_status(ConnectionStatus::Disconnected);
                return;
            };

            get_logger().warn(
                LogComponent::Infrastructure("FeedWS"),
                &format!("🔌 Reconnecting {} feed in {}s", self.kind, delay.as_secs()),
            );
            on_status(ConnectionStatus::Backoff { delay_secs: delay.as_secs() });
            if let Either::Left(_) = select(&mut shutdown, Box::pin(sleep(delay))).await {
                on_status(ConnectionStatus::Closed);
                return;
            }
        }
    }
}

/// Wait for the opening handshake of a socket that is still CONNECTING.
///
/// `ready_state` is polled after every `tick`. A socket that goes to
/// CLOSING or CLOSED first was refused.
pub async fn wait_until_open<R, T, W>(
    mut ready_state: R,
    shutdown: &mut oneshot::Receiver<()>,
    mut tick: T,
) -> Result<(), PumpExit>
where
    R: FnMut() -> State,
    T: FnMut() -> W,
    W: Future<Output = ()>,
{
    loop {
        match ready_state() {
            State::Open => return Ok(()),
            State::Closing | State::Closed => {
                return Err(PumpExit::Failed(FeedError::Connection(
                    "socket closed before opening".to_string(),
                )));
            }
            State::Connecting => {
                if let Either::Left(_) = select(&mut *shutdown, Box::pin(tick())).await {
                    return Err(PumpExit::Shutdown);
                }
            }
        }
    }
}

/// Deliver text frames from `frames` until shutdown, end of stream or error.
///
/// Binary frames are ignored; neither feed sends them.
pub async fn pump_frames<S, F>(
    frames: &mut S,
    shutdown: &mut oneshot::Receiver<()>,
    on_text: &mut F,
) -> PumpExit
where
    S: Stream<Item = Result<Message, WebSocketError>> + Unpin,
    F: FnMut(&str),
{
    loop {
        let next = match select(&mut *shutdown, frames.next()).await {
            Either::Left(_) => return PumpExit::Shutdown,
            Either::Right((frame, _)) => frame,
        };

        match next {
            Some(Ok(Message::Text(text))) => on_text(&text),
            Some(Ok(Message::Bytes(bytes))) => {
                get_logger().debug(
                    LogComponent::Infrastructure("FeedWS"),
                    &format!("Ignoring {}-byte binary frame", bytes.len()),
                );
            }
            Some(Err(e)) => return PumpExit::Failed(FeedError::Connection(format!("{e:?}"))),
            None => return PumpExit::Ended,
        }
    }
}
