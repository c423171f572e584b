//! # Math Duel
//!
//! Matchmaking and session refereeing for a two-player, turn-based card
//! battle.
//!
//! Participants join a FIFO queue and are paired two at a time. Every pair
//! gets its own session actor that owns the authoritative game state: both
//! resource pools, hands, blocks, branch modifiers, the shared deck and the
//! turn pointer. After each accepted intent the actor pushes a full state
//! snapshot to both participants.
//!
//! ## Core Modules
//!
//! - [`game`]: Cards, deck, branches and the synchronous [`GameSession`]
//! - [`session`]: One async actor per session, with a delayed turn advance
//! - [`lobby`]: Matchmaker, session registry and the [`Lobby`] coordinator
//! - [`net`]: Inbound intents, outbound events and delivery handles
//!
//! ## Example
//!
//! ```
//! use math_duel::{Lobby, ParticipantId, net::relay::DeliveryHandle};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let lobby = Lobby::default();
//! let id = ParticipantId::new();
//! let (delivery, mut events) = DeliveryHandle::channel(id);
//!
//! lobby.join_queue(id, "ada", delivery).await.unwrap();
//! assert_eq!(events.recv().await.unwrap().kind(), "waiting");
//! # }
//! ```

/// Core game logic and state.
pub mod game;
pub use game::{
    Branch, BranchEffects, Card, CardKind, CardTemplate, Catalog, DisplayName, GameSession,
    Participant, ParticipantId, SessionError, SessionId, SessionResult, SessionSnapshot, constants,
};

/// Per-session actors.
pub mod session;
pub use session::{SessionActor, SessionConfig, SessionHandle};

/// Matchmaking and session registry.
pub mod lobby;
pub use lobby::{EnqueueOutcome, Lobby};

/// Transport-neutral messaging.
pub mod net;
pub use net::{
    messages::{ClientMessage, ServerEvent},
    relay::DeliveryHandle,
};
