//! Serializable snapshots of a session, sent wholesale after every mutation.

use serde::Serialize;

use super::{
    entities::{DisplayName, ParticipantId, SessionId, Slot},
    player::PlayerState,
};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: ParticipantId,
    pub name: DisplayName,
    pub slot: Slot,
    #[serde(flatten)]
    pub state: PlayerState,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub turn_index: Slot,
    /// Completed turn advances since the game started.
    pub turn_count: u32,
    pub started: bool,
    pub winner: Option<ParticipantId>,
    pub deck_size: usize,
    pub discard_size: usize,
    pub players: Vec<PlayerView>,
}

impl SessionSnapshot {
    pub fn player(&self, id: ParticipantId) -> Option<&PlayerView> {
        self.players.iter().find(|p| p.id == id)
    }
}
