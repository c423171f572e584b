//! Card-battle game core.
//!
//! Everything in here is synchronous and transport-free:
//! - Card catalog and the per-session deck
//! - Branch choices and their modifiers
//! - Per-participant player state
//! - [`GameSession`], the authoritative state machine for one match

pub mod branch;
pub mod catalog;
pub mod constants;
pub mod deck;
pub mod entities;
pub mod errors;
pub mod player;
pub mod rules;
pub mod session;
pub mod views;

pub use branch::{Branch, BranchEffects};
pub use catalog::{Card, CardKind, CardTemplate, Catalog};
pub use deck::Deck;
pub use entities::{DisplayName, Participant, ParticipantId, SessionId, Slot};
pub use errors::{SessionError, SessionResult};
pub use player::PlayerState;
pub use rules::Rules;
pub use session::{GameSession, PlayOutcome, PlayResult};
pub use views::{PlayerView, SessionSnapshot};
