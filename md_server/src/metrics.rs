//! Prometheus metrics for monitoring the relay.
//!
//! Recording is always cheap; nothing is exported unless [`init_metrics`]
//! installed the Prometheus recorder.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use md_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::connection_opened();
//! metrics::card_played();
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// WebSocket Metrics
// ============================================================================

pub fn connection_opened() {
    metrics::counter!("ws_connections_total").increment(1);
    metrics::gauge!("ws_connections_active").increment(1.0);
}

pub fn connection_closed() {
    metrics::gauge!("ws_connections_active").decrement(1.0);
}

/// Record an intent dropped by the per-connection rate limiter.
pub fn intent_rate_limited() {
    metrics::counter!("ws_intents_rate_limited_total").increment(1);
}

// ============================================================================
// Game Metrics
// ============================================================================

pub fn match_created() {
    metrics::counter!("matches_created_total").increment(1);
}

pub fn card_played() {
    metrics::counter!("cards_played_total").increment(1);
}

pub fn game_finished() {
    metrics::counter!("games_finished_total").increment(1);
}
