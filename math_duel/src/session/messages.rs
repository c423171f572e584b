//! Messages accepted by a session actor.

use tokio::sync::oneshot;
use uuid::Uuid;

use crate::game::{
    branch::Branch,
    entities::ParticipantId,
    errors::SessionResult,
    views::SessionSnapshot,
};

/// Reply channel for intents that can be rejected.
pub type SessionResponse<T = ()> = oneshot::Sender<SessionResult<T>>;

#[derive(Debug)]
pub enum SessionMessage {
    SetBranch {
        participant_id: ParticipantId,
        branch: Branch,
        response: SessionResponse,
    },

    PlayCard {
        participant_id: ParticipantId,
        card_id: Uuid,
        response: SessionResponse,
    },

    Chat {
        participant_id: ParticipantId,
        message: String,
        response: SessionResponse,
    },

    /// The participant's connection is gone.
    Disconnect {
        participant_id: ParticipantId,
        response: SessionResponse,
    },

    GetSnapshot {
        response: oneshot::Sender<SessionSnapshot>,
    },

    /// Tear the session down without notifying anyone.
    Close {
        response: oneshot::Sender<()>,
    },
}

impl SessionMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SetBranch { .. } => "set-branch",
            Self::PlayCard { .. } => "play-card",
            Self::Chat { .. } => "chat",
            Self::Disconnect { .. } => "disconnect",
            Self::GetSnapshot { .. } => "get-snapshot",
            Self::Close { .. } => "close",
        }
    }
}
