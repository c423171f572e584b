//! Transport-neutral messaging between the game core and connected
//! participants.
//!
//! The relay that owns the actual sockets lives outside this crate. It
//! decodes [`messages::ClientMessage`]s into lobby calls and drains a
//! [`relay::DeliveryHandle`]'s receiver into the socket.

/// Inbound intents and outbound events.
pub mod messages;

/// Revocable per-participant delivery handles.
pub mod relay;
