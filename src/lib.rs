use wasm_bindgen::prelude::*;

use crate::domain::logging::{LogComponent, get_logger};

pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
pub mod time_utils;

/// Entry point: wire logging, then mount the dashboard
#[wasm_bindgen(start)]
pub fn initialize() {
    console_error_panic_hook::set_once();

    let config = config::build_config();

    let console_logger = Box::new(infrastructure::services::ConsoleLogger::new(config.log_level));
    domain::logging::init_logger(console_logger);

    let browser_time_provider = Box::new(infrastructure::services::BrowserTimeProvider::new());
    domain::logging::init_time_provider(browser_time_provider);

    config::report_build_settings();
    get_logger().info(
        LogComponent::Presentation("Initialize"),
        &format!(
            "🚀 Dashboard starting: market={} signal={}",
            config.market_feed_url, config.signal_feed_url
        ),
    );

    leptos::mount_to_body(app::App);
}
