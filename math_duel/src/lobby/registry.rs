//! Session registry: which sessions exist and who sits in them.

use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::{
    game::{
        entities::{ParticipantId, SessionId},
        errors::{SessionError, SessionResult},
        session::SEATS,
    },
    session::SessionHandle,
};

struct Entry {
    handle: SessionHandle,
    participants: [ParticipantId; SEATS],
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<SessionId, Entry>,
    /// Reverse index; a participant maps to at most one session.
    participants: HashMap<ParticipantId, SessionId>,
}

/// Live session handles, indexed by session and by participant.
///
/// Both maps sit behind one lock so they never disagree.
#[derive(Default)]
pub struct SessionRegistry {
    inner: RwLock<Inner>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly paired session. Fails without touching anything if
    /// either participant already belongs to a session.
    pub async fn register(
        &self,
        handle: SessionHandle,
        participants: [ParticipantId; SEATS],
    ) -> SessionResult<()> {
        let mut inner = self.inner.write().await;
        if participants
            .iter()
            .any(|id| inner.participants.contains_key(id))
        {
            return Err(SessionError::AlreadyJoined);
        }

        let session_id = handle.session_id();
        for id in participants {
            inner.participants.insert(id, session_id);
        }
        inner.sessions.insert(
            session_id,
            Entry {
                handle,
                participants,
            },
        );
        Ok(())
    }

    pub async fn get(&self, session_id: SessionId) -> Option<SessionHandle> {
        self.inner
            .read()
            .await
            .sessions
            .get(&session_id)
            .map(|entry| entry.handle.clone())
    }

    pub async fn session_of(&self, participant: ParticipantId) -> Option<SessionId> {
        self.inner.read().await.participants.get(&participant).copied()
    }

    pub async fn handle_for(&self, participant: ParticipantId) -> Option<SessionHandle> {
        let inner = self.inner.read().await;
        let session_id = inner.participants.get(&participant)?;
        inner
            .sessions
            .get(session_id)
            .map(|entry| entry.handle.clone())
    }

    pub async fn contains_participant(&self, participant: ParticipantId) -> bool {
        self.inner
            .read()
            .await
            .participants
            .contains_key(&participant)
    }

    /// Drop a session and its participants from the index. Removing an
    /// unknown session is a no-op.
    pub async fn unregister(&self, session_id: SessionId) -> Option<SessionHandle> {
        let mut inner = self.inner.write().await;
        let entry = inner.sessions.remove(&session_id)?;
        for id in &entry.participants {
            if inner.participants.get(id) == Some(&session_id) {
                inner.participants.remove(id);
            }
        }
        log::debug!("Session {session_id} unregistered");
        Some(entry.handle)
    }

    pub async fn handles(&self) -> Vec<SessionHandle> {
        self.inner
            .read()
            .await
            .sessions
            .values()
            .map(|entry| entry.handle.clone())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn handle() -> SessionHandle {
        let (tx, _rx) = mpsc::channel(1);
        SessionHandle::new(tx, SessionId::new())
    }

    #[tokio::test]
    async fn test_register_indexes_participants() {
        let registry = SessionRegistry::new();
        let ids = [ParticipantId::new(), ParticipantId::new()];
        let handle = handle();
        let session_id = handle.session_id();

        registry.register(handle, ids).await.unwrap();

        assert_eq!(registry.len().await, 1);
        assert_eq!(registry.session_of(ids[0]).await, Some(session_id));
        assert_eq!(registry.session_of(ids[1]).await, Some(session_id));
        assert!(registry.handle_for(ids[1]).await.is_some());
        assert!(registry.get(session_id).await.is_some());
    }

    #[tokio::test]
    async fn test_participant_in_one_session_only() {
        let registry = SessionRegistry::new();
        let shared = ParticipantId::new();
        registry
            .register(handle(), [shared, ParticipantId::new()])
            .await
            .unwrap();

        let other = ParticipantId::new();
        let result = registry.register(handle(), [other, shared]).await;
        assert_eq!(result, Err(SessionError::AlreadyJoined));
        assert!(!registry.contains_participant(other).await);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        let registry = SessionRegistry::new();
        let ids = [ParticipantId::new(), ParticipantId::new()];
        let handle = handle();
        let session_id = handle.session_id();
        registry.register(handle, ids).await.unwrap();

        assert!(registry.unregister(session_id).await.is_some());
        assert!(registry.unregister(session_id).await.is_none());
        assert!(registry.is_empty().await);
        assert!(!registry.contains_participant(ids[0]).await);
    }
}
