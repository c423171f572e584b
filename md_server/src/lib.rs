//! WebSocket relay for the math duel card battle.
//!
//! The server owns a single [`math_duel::Lobby`] and maps every socket onto a
//! participant: inbound JSON intents become lobby calls, and events queued
//! on the participant's delivery handle are written back to the socket.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
