//! The process-scoped coordinator: matchmaking queue plus session registry.
//!
//! [`Lobby`] is the only surface a transport talks to. It is created once at
//! startup and shared behind an `Arc`; connection tasks never touch the
//! queue or the registry directly.

pub mod matchmaker;
pub mod registry;

pub use matchmaker::{EnqueueOutcome, Matchmaker};
pub use registry::SessionRegistry;

use std::sync::Arc;
use uuid::Uuid;

use crate::{
    game::{
        branch::Branch,
        catalog::Catalog,
        entities::{DisplayName, ParticipantId, SessionId},
        errors::{SessionError, SessionResult},
        views::SessionSnapshot,
    },
    net::{messages::ClientMessage, relay::DeliveryHandle},
    session::{SessionConfig, SessionHandle},
};

pub struct Lobby {
    registry: Arc<SessionRegistry>,
    matchmaker: Matchmaker,
}

impl Default for Lobby {
    fn default() -> Self {
        Self::new(SessionConfig::default(), Arc::new(Catalog::default()))
    }
}

impl Lobby {
    pub fn new(config: SessionConfig, catalog: Arc<Catalog>) -> Self {
        let registry = Arc::new(SessionRegistry::new());
        let matchmaker = Matchmaker::new(Arc::clone(&registry), config, catalog);
        Self {
            registry,
            matchmaker,
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub async fn join_queue(
        &self,
        participant: ParticipantId,
        name: &str,
        delivery: DeliveryHandle,
    ) -> SessionResult<EnqueueOutcome> {
        self.matchmaker
            .enqueue(participant, DisplayName::new(name), delivery)
            .await
    }

    pub async fn set_branch(
        &self,
        participant: ParticipantId,
        session_id: SessionId,
        branch: &str,
    ) -> SessionResult<()> {
        self.session(participant, session_id)
            .await?
            .set_branch(participant, Branch::parse(branch))
            .await
    }

    pub async fn play_card(
        &self,
        participant: ParticipantId,
        session_id: SessionId,
        card_id: Uuid,
    ) -> SessionResult<()> {
        self.session(participant, session_id)
            .await?
            .play_card(participant, card_id)
            .await
    }

    pub async fn chat(
        &self,
        participant: ParticipantId,
        session_id: SessionId,
        message: String,
    ) -> SessionResult<()> {
        self.session(participant, session_id)
            .await?
            .chat(participant, message)
            .await
    }

    /// Dispatch a decoded intent from `participant`.
    pub async fn handle_message(
        &self,
        participant: ParticipantId,
        delivery: &DeliveryHandle,
        message: ClientMessage,
    ) -> SessionResult<()> {
        match message {
            ClientMessage::JoinQueue { name } => self
                .join_queue(participant, &name, delivery.clone())
                .await
                .map(|_| ()),
            ClientMessage::SetBranch { session_id, branch } => {
                self.set_branch(participant, session_id, &branch).await
            }
            ClientMessage::PlayCard {
                session_id,
                card_id,
            } => self.play_card(participant, session_id, card_id).await,
            ClientMessage::Chat {
                session_id,
                message,
            } => self.chat(participant, session_id, message).await,
        }
    }

    /// The participant's transport is gone: leave the queue, or leave the
    /// session (which tears it down).
    pub async fn disconnect(&self, participant: ParticipantId) {
        if self.matchmaker.remove(participant).await {
            log::debug!("{participant} left the queue");
        }

        if let Some(handle) = self.registry.handle_for(participant).await
            && let Err(e) = handle.disconnect(participant).await
        {
            log::debug!(
                "Disconnect of {} from session {}: {}",
                participant,
                handle.session_id(),
                e
            );
        }
    }

    pub async fn snapshot(&self, session_id: SessionId) -> SessionResult<SessionSnapshot> {
        self.registry
            .get(session_id)
            .await
            .ok_or(SessionError::UnknownSession)?
            .snapshot()
            .await
    }

    pub async fn session_of(&self, participant: ParticipantId) -> Option<SessionId> {
        self.registry.session_of(participant).await
    }

    pub async fn waiting_count(&self) -> usize {
        self.matchmaker.waiting_count().await
    }

    pub async fn active_sessions(&self) -> usize {
        self.registry.len().await
    }

    /// Empty the queue and close every session.
    pub async fn shutdown(&self) {
        self.matchmaker.clear().await;
        for handle in self.registry.handles().await {
            if handle.close().await.is_err() {
                self.registry.unregister(handle.session_id()).await;
            }
        }
        log::info!("Lobby shut down");
    }

    /// The session `participant` addressed, if it is really theirs.
    async fn session(
        &self,
        participant: ParticipantId,
        session_id: SessionId,
    ) -> SessionResult<SessionHandle> {
        match self.registry.session_of(participant).await {
            Some(id) if id == session_id => {}
            Some(_) => return Err(SessionError::UnknownParticipant),
            None if self.registry.get(session_id).await.is_some() => {
                return Err(SessionError::UnknownParticipant);
            }
            None => return Err(SessionError::UnknownSession),
        }
        self.registry
            .get(session_id)
            .await
            .ok_or(SessionError::UnknownSession)
    }
}
