//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use math_duel::{SessionConfig, game::rules::Rules};
use std::{net::SocketAddr, time::Duration};

/// Address used when neither `--bind` nor `SERVER_BIND` is given.
pub const DEFAULT_BIND: &str = "127.0.0.1:3001";

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP/WebSocket bind address
    pub bind: SocketAddr,
    /// Prometheus listener; metrics are off when unset
    pub metrics_bind: Option<SocketAddr>,
    /// Timing and rules for every session
    pub session: SessionConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `metrics_override` - Optional metrics address override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if an address variable does not parse
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        metrics_override: Option<SocketAddr>,
    ) -> Result<Self, ConfigError> {
        Self::from_lookup(bind_override, metrics_override, |key| {
            std::env::var(key).ok()
        })
    }

    /// Same as [`ServerConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(
        bind_override: Option<SocketAddr>,
        metrics_override: Option<SocketAddr>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(addr) => addr,
            None => parse_addr(
                "SERVER_BIND",
                lookup("SERVER_BIND").as_deref().unwrap_or(DEFAULT_BIND),
            )?,
        };

        let metrics_bind = match metrics_override {
            Some(addr) => Some(addr),
            None => lookup("METRICS_BIND")
                .map(|value| parse_addr("METRICS_BIND", &value))
                .transpose()?,
        };

        let defaults = SessionConfig::default();
        let rules = Rules {
            starting_hand_size: parse_or(&lookup, "STARTING_HAND_SIZE", defaults.rules.starting_hand_size),
            max_resource: parse_or(&lookup, "MAX_RESOURCE", defaults.rules.max_resource),
            grace_turns: parse_or(&lookup, "GRACE_TURNS", defaults.rules.grace_turns),
            copies_per_card: parse_or(&lookup, "CARD_COPIES", defaults.rules.copies_per_card),
            ..defaults.rules.clone()
        };

        let session = SessionConfig {
            rules,
            turn_delay: Duration::from_millis(parse_or(
                &lookup,
                "TURN_DELAY_MS",
                millis(defaults.turn_delay),
            )),
            disconnect_teardown_delay: Duration::from_millis(parse_or(
                &lookup,
                "DISCONNECT_TEARDOWN_MS",
                millis(defaults.disconnect_teardown_delay),
            )),
            finished_linger: Duration::from_secs(parse_or(
                &lookup,
                "FINISHED_SESSION_LINGER_SECS",
                defaults.finished_linger.as_secs(),
            )),
            ..defaults
        };

        Ok(ServerConfig {
            bind,
            metrics_bind,
            session,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rules = &self.session.rules;

        if rules.starting_hand_size == 0 {
            return Err(ConfigError::Invalid {
                var: "STARTING_HAND_SIZE".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if rules.max_resource <= 0 {
            return Err(ConfigError::Invalid {
                var: "MAX_RESOURCE".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if rules.grace_turns <= 0 {
            return Err(ConfigError::Invalid {
                var: "GRACE_TURNS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if rules.copies_per_card == 0 {
            return Err(ConfigError::Invalid {
                var: "CARD_COPIES".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        self.session
            .validate()
            .map_err(|reason| ConfigError::Invalid {
                var: "session".to_string(),
                reason,
            })
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn parse_addr(var: &str, value: &str) -> Result<SocketAddr, ConfigError> {
    value.parse().map_err(|e| ConfigError::Invalid {
        var: var.to_string(),
        reason: format!("{value:?} is not a socket address: {e}"),
    })
}

/// Parse a variable, falling back to `default` when unset or unparsable.
fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
