//! Session actors: one async task per paired match.
//!
//! Each [`SessionActor`] owns its [`GameSession`](crate::game::GameSession)
//! and receives intents over an mpsc inbox, so plays, turn advances, chat and
//! disconnects for a session never race. Callers hold a cloneable
//! [`SessionHandle`].

pub mod actor;
pub mod config;
pub mod messages;

pub use actor::{SessionActor, SessionHandle};
pub use config::SessionConfig;
pub use messages::{SessionMessage, SessionResponse};
