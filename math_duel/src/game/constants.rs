use std::time::Duration;

/// Resource pool every participant starts a session with.
pub const STARTING_RESOURCE: i32 = 100;

/// Ceiling applied when a participant gains resource from heal or drain.
pub const MAX_RESOURCE: i32 = 100;

/// Cards dealt to each participant when a session starts.
pub const STARTING_HAND_SIZE: usize = 5;

/// Turns a participant survives after first dropping to zero resource.
pub const GRACE_TURNS: i32 = 3;

/// Copies of every catalog entry put into a session's deck.
pub const COPIES_PER_CARD: usize = 4;

/// Delay between an accepted play and the turn advance.
pub const TURN_DELAY: Duration = Duration::from_secs(2);

pub const MAX_NAME_LENGTH: usize = 32;
pub const MAX_CHAT_LENGTH: usize = 280;

/// Name given to participants that join without one.
pub const DEFAULT_NAME: &str = "Player";
