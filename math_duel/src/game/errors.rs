use thiserror::Error;

/// Reasons a session rejects an intent. None of these mutate state.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum SessionError {
    #[error("already in this session")]
    AlreadyJoined,
    #[error("game already started")]
    AlreadyStarted,
    #[error("branch already chosen")]
    BranchAlreadyChosen,
    #[error("card not found in hand")]
    CardNotFound,
    #[error("game is over")]
    GameOver,
    #[error("no opponent found")]
    NoOpponent,
    #[error("need exactly 2 participants")]
    NotEnoughPlayers,
    #[error("game has not started")]
    NotStarted,
    #[error("not your turn")]
    NotYourTurn,
    #[error("session is closed")]
    SessionClosed,
    #[error("session is full")]
    SessionFull,
    #[error("turn change already pending")]
    TurnPending,
    #[error("not a participant of this session")]
    UnknownParticipant,
    #[error("session not found")]
    UnknownSession,
}

pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_client_facing_text() {
        assert_eq!(SessionError::NotYourTurn.to_string(), "not your turn");
        assert_eq!(SessionError::UnknownSession.to_string(), "session not found");
    }
}
