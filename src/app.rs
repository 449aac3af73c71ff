use leptos::html::Canvas;
use leptos::*;
use std::rc::Rc;

use crate::{
    application::{reducer::apply, session::DashboardSession},
    config::build_config,
    domain::{
        errors::RenderError,
        events::{ConnectionStatus, FeedKind, FeedMessage},
        logging::{LogComponent, get_logger},
        state::SessionState,
    },
    infrastructure::{rendering::draw_chart, services::BrowserWallClock},
    presentation::projection::{EMA_HEADER, PLACEHOLDER, ema_lines, trade_lines},
};

const CHART_WIDTH: u32 = 800;
const CHART_HEIGHT: u32 = 400;

/// Root component: owns the session state and both feed connections
#[component]
pub fn App() -> impl IntoView {
    let config = build_config();
    let state = create_rw_signal(SessionState::new(config.history_limit));
    let market_status = create_rw_signal(ConnectionStatus::Connecting);
    let signal_status = create_rw_signal(ConnectionStatus::Connecting);

    let session = DashboardSession::start(
        config,
        Rc::new(BrowserWallClock),
        move |_kind, message| {
            fold_message(state, message);
        },
        move |kind, status| {
            let target = match kind {
                FeedKind::Market => market_status,
                FeedKind::Signal => signal_status,
            };
            let _ = target.try_set(status);
        },
    );

    on_cleanup(move || {
        get_logger().info(LogComponent::Presentation("App"), "🔌 Dashboard unmounted, closing feeds");
        session.close();
    });

    view! {
        <style>
            {r#"
            .dashboard {
                font-family: -apple-system, BlinkMacSystemFont, sans-serif;
                background: #12161c;
                color: #e0e0e0;
                min-height: 100vh;
                padding: 20px;
            }
            .header { display: flex; gap: 40px; align-items: baseline; margin-bottom: 16px; }
            .feed-status { font-size: 14px; }
            .panels { display: flex; gap: 20px; margin-top: 16px; }
            .panel {
                flex: 1;
                max-height: 300px;
                overflow-y: auto;
                background: #1a1f26;
                border: 1px solid #2c3440;
                border-radius: 8px;
                padding: 10px;
                font-family: 'Courier New', monospace;
                font-size: 13px;
            }
            .placeholder { color: #888888; }
            "#}
        </style>
        <div class="dashboard">
            <Header market=market_status signal=signal_status />
            <ChartPanel state=state />
            <div class="panels">
                <TradePanel state=state />
                <EmaPanel state=state />
            </div>
        </div>
    }
}

/// Apply a feed message to the session signal, waking subscribers only when
/// the state actually changed. Returns that flag.
///
/// A disposed signal (a late frame after unmount) is left alone.
pub fn fold_message(state: RwSignal<SessionState>, message: FeedMessage) -> bool {
    let changed = state.try_update_untracked(|s| apply(s, message)).unwrap_or(false);
    if changed {
        state.update(|_| {});
    }
    changed
}

fn status_label(status: ConnectionStatus) -> String {
    match status {
        s if s.is_live() => "🟢 LIVE".to_string(),
        ConnectionStatus::Connecting => "🟡 connecting".to_string(),
        ConnectionStatus::Backoff { delay_secs } => format!("🟡 retry in {delay_secs}s"),
        _ => "🔴 OFF".to_string(),
    }
}

#[component]
fn Header(market: RwSignal<ConnectionStatus>, signal: RwSignal<ConnectionStatus>) -> impl IntoView {
    view! {
        <div class="header">
            <h1>"Trade Stream Dashboard"</h1>
            <div class="feed-status">"Market feed: " {move || status_label(market.get())}</div>
            <div class="feed-status">"Signal feed: " {move || status_label(signal.get())}</div>
        </div>
    }
}

/// Candlestick canvas, redrawn whenever the series gains a candle
#[component]
fn ChartPanel(state: RwSignal<SessionState>) -> impl IntoView {
    let canvas_ref = create_node_ref::<Canvas>();
    let chart_key = create_memo(move |_| state.with(|s| s.candles.total_pushed()));

    create_effect(move |_| {
        chart_key.track();
        let Some(canvas) = canvas_ref.get() else {
            crate::log_debug!(
                LogComponent::Presentation("ChartPanel"),
                "{}",
                RenderError::CanvasUnavailable("not mounted yet".to_string())
            );
            return;
        };
        state.with_untracked(|s| {
            draw_chart(&canvas, &s.candles, &BrowserWallClock, CHART_WIDTH, CHART_HEIGHT);
        });
    });

    view! {
        <canvas
            id="chart-canvas"
            node_ref=canvas_ref
            width=CHART_WIDTH
            height=CHART_HEIGHT
            style="border: 1px solid #2c3440; border-radius: 8px;"
        />
    }
}

#[component]
fn TradePanel(state: RwSignal<SessionState>) -> impl IntoView {
    let lines = create_memo(move |_| state.with(|s| trade_lines(&s.trades)));

    view! {
        <div class="panel trade-panel">
            <Show
                when=move || !lines.with(Vec::is_empty)
                fallback=|| view! { <p class="placeholder">{PLACEHOLDER}</p> }
            >
                <For
                    each=move || lines.get()
                    key=|line| line.key
                    children=|line| view! { <div class="line">{line.text}</div> }
                />
            </Show>
        </div>
    }
}

#[component]
fn EmaPanel(state: RwSignal<SessionState>) -> impl IntoView {
    let lines = create_memo(move |_| state.with(|s| ema_lines(&s.ema)));

    view! {
        <div class="panel ema-panel">
            <Show
                when=move || !lines.with(Vec::is_empty)
                fallback=|| view! { <p class="placeholder">{PLACEHOLDER}</p> }
            >
                <p>{EMA_HEADER}</p>
                <For
                    each=move || lines.get().into_iter().enumerate()
                    key=|line| line.clone()
                    children=|(_, text)| view! { <div class="line">{text}</div> }
                />
            </Show>
        </div>
    }
}
