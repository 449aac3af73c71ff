//! Build-time dashboard configuration.
//!
//! Endpoints are constants baked into the bundle. `DASHBOARD_STAGE` picks
//! which set at compile time, `DASHBOARD_HISTORY_LIMIT` and
//! `DASHBOARD_RECONNECT` tune retention and retries. There is no runtime
//! configuration surface.

use once_cell::sync::Lazy;
use std::str::FromStr;
use std::time::Duration;
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::domain::logging::{LogComponent, LogLevel, get_logger};
use crate::domain::state::HistoryLimit;

/// Deployment target the bundle is built for
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter, AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Stage {
    /// Browser on the host, feeds in docker containers
    #[default]
    #[strum(serialize = "docker")]
    Docker,
    #[strum(serialize = "local")]
    Local,
    /// Dashboard served from inside the compose network
    #[strum(serialize = "production")]
    Production,
}

impl Stage {
    pub fn market_feed_url(&self) -> &'static str {
        match self {
            Stage::Docker => "ws://host.docker.internal:8080/ws",
            Stage::Local => "ws://localhost:8080/ws",
            Stage::Production => "ws://data_ingest:8080/ws",
        }
    }

    pub fn signal_feed_url(&self) -> &'static str {
        match self {
            Stage::Docker => "ws://host.docker.internal:8090/ws",
            Stage::Local => "ws://localhost:8090/ws",
            Stage::Production => "ws://trading_algo:8090/ws",
        }
    }
}

/// What a feed does after its connection drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconnectPolicy {
    /// Log the failure and stay disconnected
    #[default]
    Never,
    /// Retry with exponential backoff, doubling from `initial_secs` up to `max_secs`
    Backoff { initial_secs: u64, max_secs: u64 },
}

impl ReconnectPolicy {
    pub fn backoff() -> Self {
        ReconnectPolicy::Backoff { initial_secs: 1, max_secs: 32 }
    }
}

/// Running retry delay for one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffState {
    policy: ReconnectPolicy,
    current_secs: u64,
    initial_secs: u64,
    max_secs: u64,
}

impl BackoffState {
    pub fn new(policy: ReconnectPolicy) -> Self {
        let (initial_secs, max_secs) = match policy {
            ReconnectPolicy::Never => (0, 0),
            ReconnectPolicy::Backoff { initial_secs, max_secs } => {
                let initial_secs = initial_secs.max(1);
                (initial_secs, max_secs.max(initial_secs))
            }
        };
        Self { policy, current_secs: initial_secs, initial_secs, max_secs }
    }

    pub fn current_secs(&self) -> u64 {
        self.current_secs
    }

    /// Delay before the next attempt once a connection attempt has ended,
    /// or `None` when the policy never retries.
    ///
    /// `opened` is whether the attempt reached the open state. Only an opened
    /// connection restarts the delay; refused attempts keep doubling it.
    pub fn after_attempt(&mut self, opened: bool) -> Option<Duration> {
        if self.policy == ReconnectPolicy::Never {
            return None;
        }
        if opened {
            self.reset();
        }
        let delay = Duration::from_secs(self.current_secs);
        self.escalate();
        Some(delay)
    }

    fn escalate(&mut self) {
        self.current_secs = self.current_secs.saturating_mul(2).min(self.max_secs);
    }

    fn reset(&mut self) {
        self.current_secs = self.initial_secs;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub stage: Stage,
    pub market_feed_url: String,
    pub signal_feed_url: String,
    pub history_limit: HistoryLimit,
    pub reconnect: ReconnectPolicy,
    pub log_level: LogLevel,
}

impl DashboardConfig {
    pub fn for_stage(stage: Stage) -> Self {
        Self {
            stage,
            market_feed_url: stage.market_feed_url().to_string(),
            signal_feed_url: stage.signal_feed_url().to_string(),
            history_limit: HistoryLimit::Unbounded,
            reconnect: ReconnectPolicy::Never,
            log_level: match stage {
                Stage::Production => LogLevel::Info,
                Stage::Docker | Stage::Local => LogLevel::Debug,
            },
        }
    }

    /// Resolve the stage name baked in at build time, falling back to docker.
    pub fn from_stage_name(name: Option<&str>) -> Self {
        Self::for_stage(parse_stage(name).unwrap_or_default())
    }

    pub fn with_history_limit(mut self, limit: HistoryLimit) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_reconnect(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::for_stage(Stage::default())
    }
}

/// Knobs read by the compiler. Each is optional; blank means default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildEnv<'a> {
    /// `DASHBOARD_STAGE`: docker, local or production
    pub stage: Option<&'a str>,
    /// `DASHBOARD_HISTORY_LIMIT`: entries kept per log, or `unbounded`
    pub history_limit: Option<&'a str>,
    /// `DASHBOARD_RECONNECT`: `never` or `backoff`
    pub reconnect: Option<&'a str>,
}

pub const BUILD_ENV: BuildEnv<'static> = BuildEnv {
    stage: option_env!("DASHBOARD_STAGE"),
    history_limit: option_env!("DASHBOARD_HISTORY_LIMIT"),
    reconnect: option_env!("DASHBOARD_RECONNECT"),
};

impl BuildEnv<'_> {
    /// Resolve every knob, falling back to its default when unrecognised.
    pub fn config(&self) -> DashboardConfig {
        DashboardConfig::from_stage_name(self.stage)
            .with_history_limit(parse_history_limit(self.history_limit).unwrap_or_default())
            .with_reconnect(parse_reconnect(self.reconnect).unwrap_or_default())
    }

    /// One message per knob whose value was ignored
    pub fn rejected(&self) -> Vec<String> {
        let mut rejected = Vec::new();
        if let Err(raw) = parse_stage(self.stage) {
            rejected.push(format!("Unknown DASHBOARD_STAGE {raw:?}, using {}", Stage::default()));
        }
        if let Err(raw) = parse_history_limit(self.history_limit) {
            rejected.push(format!("Invalid DASHBOARD_HISTORY_LIMIT {raw:?}, keeping everything"));
        }
        if let Err(raw) = parse_reconnect(self.reconnect) {
            rejected.push(format!("Unknown DASHBOARD_RECONNECT {raw:?}, never reconnecting"));
        }
        rejected
    }
}

fn knob(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a stage name. A missing or blank name means the default stage;
/// an unrecognised one is returned as the error.
pub fn parse_stage(name: Option<&str>) -> Result<Stage, String> {
    match knob(name) {
        None => Ok(Stage::default()),
        Some(raw) => Stage::from_str(raw).map_err(|_| raw.to_string()),
    }
}

/// `unbounded` or a positive entry count
pub fn parse_history_limit(raw: Option<&str>) -> Result<HistoryLimit, String> {
    match knob(raw) {
        None => Ok(HistoryLimit::Unbounded),
        Some(raw) if raw.eq_ignore_ascii_case("unbounded") => Ok(HistoryLimit::Unbounded),
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if n > 0 => Ok(HistoryLimit::Capped(n)),
            _ => Err(raw.to_string()),
        },
    }
}

/// `never` or `backoff` (1s doubling to 32s)
pub fn parse_reconnect(raw: Option<&str>) -> Result<ReconnectPolicy, String> {
    match knob(raw) {
        None => Ok(ReconnectPolicy::Never),
        Some(raw) if raw.eq_ignore_ascii_case("never") => Ok(ReconnectPolicy::Never),
        Some(raw) if raw.eq_ignore_ascii_case("backoff") => Ok(ReconnectPolicy::backoff()),
        Some(raw) => Err(raw.to_string()),
    }
}

/// Log build knobs that were ignored. Called once the console logger is up.
pub fn report_build_settings() {
    for message in BUILD_ENV.rejected() {
        get_logger().warn(LogComponent::Application("Config"), &message);
    }
}

static BUILD_CONFIG: Lazy<DashboardConfig> = Lazy::new(|| BUILD_ENV.config());

/// Configuration the bundle was compiled with
pub fn build_config() -> &'static DashboardConfig {
    &BUILD_CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn default_stage_uses_docker_host_endpoints() {
        let config = DashboardConfig::default();
        assert_eq!(config.market_feed_url, "ws://host.docker.internal:8080/ws");
        assert_eq!(config.signal_feed_url, "ws://host.docker.internal:8090/ws");
        assert_eq!(config.history_limit, HistoryLimit::Unbounded);
        assert_eq!(config.reconnect, ReconnectPolicy::Never);
    }

    #[test]
    fn stage_names_parse_and_fall_back() {
        assert_eq!(DashboardConfig::from_stage_name(Some("Production")).stage, Stage::Production);
        assert_eq!(DashboardConfig::from_stage_name(Some(" local ")).stage, Stage::Local);
        assert_eq!(DashboardConfig::from_stage_name(Some("staging")).stage, Stage::Docker);
        assert_eq!(DashboardConfig::from_stage_name(None).stage, Stage::Docker);
    }

    #[test]
    fn unknown_stage_is_reported_verbatim() {
        assert_eq!(parse_stage(Some("staging")), Err("staging".to_string()));
        assert_eq!(parse_stage(Some("  ")), Ok(Stage::Docker));
        assert_eq!(parse_stage(Some("DOCKER")), Ok(Stage::Docker));
    }

    #[test]
    fn every_stage_points_both_feeds_at_ws_endpoints() {
        for stage in Stage::iter() {
            assert!(stage.market_feed_url().starts_with("ws://"));
            assert!(stage.signal_feed_url().ends_with(":8090/ws"));
        }
    }

    #[test]
    fn refused_attempts_keep_doubling_up_to_the_cap() {
        let mut state = BackoffState::new(ReconnectPolicy::backoff());
        let delays: Vec<u64> =
            (0..8).filter_map(|_| state.after_attempt(false)).map(|d| d.as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 16, 32, 32, 32]);
    }

    #[test]
    fn an_opened_connection_restarts_the_delay() {
        let mut state = BackoffState::new(ReconnectPolicy::backoff());
        for _ in 0..3 {
            state.after_attempt(false);
        }
        assert_eq!(state.current_secs(), 8);

        assert_eq!(state.after_attempt(true), Some(Duration::from_secs(1)));
        assert_eq!(state.after_attempt(false), Some(Duration::from_secs(2)));
    }

    #[test]
    fn never_policy_yields_no_delay() {
        let mut state = BackoffState::new(ReconnectPolicy::Never);
        assert_eq!(state.after_attempt(false), None);
        assert_eq!(state.after_attempt(true), None);
    }

    #[test]
    fn build_knobs_reach_the_config() {
        let env = BuildEnv {
            stage: Some("local"),
            history_limit: Some("500"),
            reconnect: Some("Backoff"),
        };
        let config = env.config();
        assert_eq!(config.stage, Stage::Local);
        assert_eq!(config.history_limit, HistoryLimit::Capped(500));
        assert_eq!(config.reconnect, ReconnectPolicy::backoff());
        assert!(env.rejected().is_empty());
    }

    #[test]
    fn missing_knobs_keep_the_defaults() {
        let config = BuildEnv::default().config();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(parse_history_limit(Some(" unbounded ")), Ok(HistoryLimit::Unbounded));
        assert_eq!(parse_reconnect(Some("never")), Ok(ReconnectPolicy::Never));
    }

    #[test]
    fn bad_knobs_fall_back_and_are_reported() {
        let env = BuildEnv { stage: Some("staging"), history_limit: Some("0"), reconnect: Some("always") };
        let config = env.config();
        assert_eq!(config.history_limit, HistoryLimit::Unbounded);
        assert_eq!(config.reconnect, ReconnectPolicy::Never);

        let rejected = env.rejected();
        assert_eq!(rejected.len(), 3);
        assert!(rejected[1].contains("\"0\""));
        assert_eq!(parse_history_limit(Some("-3")), Err("-3".to_string()));
    }
}
