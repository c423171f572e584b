//! Wire messages. Both directions are JSON objects tagged by `type`, with
//! kebab-case tags and camelCase fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::{
    branch::{Branch, BranchEffects},
    catalog::Card,
    entities::{DisplayName, Participant, ParticipantId, SessionId, Slot},
};

pub use crate::game::{session::PlayResult, views::SessionSnapshot};

/// An intent sent by a participant.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(
    tag = "type",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    /// Wait for an opponent, or pair with the one already waiting.
    JoinQueue { name: String },
    SetBranch { session_id: SessionId, branch: String },
    PlayCard { session_id: SessionId, card_id: Uuid },
    Chat { session_id: SessionId, message: String },
}

impl ClientMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::JoinQueue { .. } => "join-queue",
            Self::SetBranch { .. } => "set-branch",
            Self::PlayCard { .. } => "play-card",
            Self::Chat { .. } => "chat",
        }
    }
}

/// An event pushed to participants. Every state-changing event carries the
/// full session snapshot.
#[derive(Clone, Debug, Serialize)]
#[serde(
    tag = "type",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    /// Queued; no opponent yet.
    Waiting,
    Matched {
        session_id: SessionId,
        opponent_name: DisplayName,
        slot: Slot,
        participants: Vec<Participant>,
    },
    GameStarted {
        state: SessionSnapshot,
    },
    BranchSet {
        participant_id: ParticipantId,
        branch: Branch,
        effects: BranchEffects,
        state: SessionSnapshot,
    },
    CardPlayed {
        participant_id: ParticipantId,
        card: Card,
        result: PlayResult,
        state: SessionSnapshot,
    },
    TurnChanged {
        turn_index: Slot,
        active_participant_id: ParticipantId,
        state: SessionSnapshot,
    },
    GameEnded {
        winner: ParticipantId,
    },
    OpponentDisconnected,
    Chat {
        sender: DisplayName,
        message: String,
        timestamp: DateTime<Utc>,
    },
    Error {
        message: String,
    },
}

impl ServerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Matched { .. } => "matched",
            Self::GameStarted { .. } => "game-started",
            Self::BranchSet { .. } => "branch-set",
            Self::CardPlayed { .. } => "card-played",
            Self::TurnChanged { .. } => "turn-changed",
            Self::GameEnded { .. } => "game-ended",
            Self::OpponentDisconnected => "opponent-disconnected",
            Self::Chat { .. } => "chat",
            Self::Error { .. } => "error",
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_join_queue() {
        let msg: ClientMessage =
            serde_json::from_value(json!({"type": "join-queue", "name": "ada"})).unwrap();
        assert_eq!(
            msg,
            ClientMessage::JoinQueue {
                name: "ada".to_string()
            }
        );
    }

    #[test]
    fn test_parse_play_card_camel_case() {
        let session_id = Uuid::new_v4();
        let card_id = Uuid::new_v4();
        let msg: ClientMessage = serde_json::from_value(json!({
            "type": "play-card",
            "sessionId": session_id,
            "cardId": card_id,
        }))
        .unwrap();
        assert_eq!(
            msg,
            ClientMessage::PlayCard {
                session_id: session_id.into(),
                card_id,
            }
        );
        assert_eq!(msg.kind(), "play-card");
    }

    #[test]
    fn test_unknown_intent_is_rejected() {
        let result = serde_json::from_value::<ClientMessage>(json!({"type": "cheat"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_unit_events_serialize_as_tag_only() {
        let json = serde_json::to_value(ServerEvent::Waiting).unwrap();
        assert_eq!(json, json!({"type": "waiting"}));

        let json = serde_json::to_value(ServerEvent::OpponentDisconnected).unwrap();
        assert_eq!(json, json!({"type": "opponent-disconnected"}));
    }

    #[test]
    fn test_matched_fields() {
        let session_id = SessionId::new();
        let event = ServerEvent::Matched {
            session_id,
            opponent_name: DisplayName::new("bob"),
            slot: 0,
            participants: vec![],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "matched");
        assert_eq!(json["opponentName"], "bob");
        assert_eq!(json["slot"], 0);
        assert_eq!(json["sessionId"], session_id.to_string());
        assert_eq!(event.kind(), "matched");
    }
}
