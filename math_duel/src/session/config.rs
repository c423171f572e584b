//! Per-session configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::game::{constants, rules::Rules};

/// Timing and rules every session actor is spawned with.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SessionConfig {
    pub rules: Rules,

    /// Pause between an accepted play and the turn advance.
    pub turn_delay: Duration,

    /// How long a session survives after one side disconnects. Zero tears it
    /// down right away.
    pub disconnect_teardown_delay: Duration,

    /// How long a finished session stays registered after `game-ended`.
    pub finished_linger: Duration,

    /// Actor inbox capacity.
    pub inbox_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rules: Rules::default(),
            turn_delay: constants::TURN_DELAY,
            disconnect_teardown_delay: Duration::ZERO,
            finished_linger: Duration::from_secs(30),
            inbox_capacity: 100,
        }
    }
}

impl SessionConfig {
    /// Validate session configuration
    pub fn validate(&self) -> Result<(), String> {
        self.rules.validate()?;

        if self.inbox_capacity == 0 {
            return Err("Inbox capacity must be at least 1".to_string());
        }

        Ok(())
    }
}
