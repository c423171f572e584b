//! Structured logging configuration.
//!
//! The library logs through the `log` facade; the subscriber installed here
//! also captures those records, so both end up in the same output.

use math_duel::{ParticipantId, SessionId};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,tower_http=warn,hyper=warn";

/// Initialize structured logging
///
/// Log levels come from the `RUST_LOG` env var, falling back to
/// [`DEFAULT_FILTER`].
///
/// # Example
///
/// ```no_run
/// use md_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a connection lifecycle step with the participant and, once paired,
/// the session.
pub fn log_connection_event(event: &str, participant_id: ParticipantId, session_id: Option<SessionId>) {
    tracing::info!(
        event = event,
        participant_id = %participant_id,
        session_id = %session_id.map_or_else(|| "-".to_string(), |id| id.to_string()),
        "Connection {}",
        event
    );
}

/// Log an intent the lobby refused.
pub fn log_rejected_intent(intent: &str, participant_id: ParticipantId, reason: &str) {
    tracing::debug!(
        intent = intent,
        participant_id = %participant_id,
        reason = reason,
        "Intent rejected"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }

    #[test]
    fn test_log_connection_event() {
        // Just ensure it doesn't panic without a subscriber
        log_connection_event("connected", ParticipantId::new(), None);
        log_connection_event("matched", ParticipantId::new(), Some(SessionId::new()));
    }

    #[test]
    fn test_log_rejected_intent() {
        log_rejected_intent("play-card", ParticipantId::new(), "not your turn");
    }
}
