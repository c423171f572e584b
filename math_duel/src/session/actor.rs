//! Session actor: one tokio task per paired match.

use chrono::Utc;
use std::sync::Arc;
use tokio::{
    sync::{mpsc, oneshot},
    time::{Instant, sleep_until},
};
use uuid::Uuid;

use super::{config::SessionConfig, messages::SessionMessage};
use crate::{
    game::{
        branch::Branch,
        constants::MAX_CHAT_LENGTH,
        entities::{ParticipantId, SessionId},
        errors::{SessionError, SessionResult},
        session::GameSession,
        views::SessionSnapshot,
    },
    lobby::registry::SessionRegistry,
    net::{messages::ServerEvent, relay::DeliveryHandle},
};

/// Session actor handle for sending messages
#[derive(Clone, Debug)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionMessage>,
    session_id: SessionId,
}

impl SessionHandle {
    pub fn new(sender: mpsc::Sender<SessionMessage>, session_id: SessionId) -> Self {
        Self { sender, session_id }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Whether the actor behind this handle has exited.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Send a message to the session
    pub async fn send(&self, message: SessionMessage) -> SessionResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| SessionError::SessionClosed)
    }

    async fn request<T>(
        &self,
        message: impl FnOnce(oneshot::Sender<T>) -> SessionMessage,
    ) -> SessionResult<T> {
        let (tx, rx) = oneshot::channel();
        self.send(message(tx)).await?;
        rx.await.map_err(|_| SessionError::SessionClosed)
    }

    pub async fn set_branch(
        &self,
        participant_id: ParticipantId,
        branch: Branch,
    ) -> SessionResult<()> {
        self.request(|response| SessionMessage::SetBranch {
            participant_id,
            branch,
            response,
        })
        .await?
    }

    pub async fn play_card(&self, participant_id: ParticipantId, card_id: Uuid) -> SessionResult<()> {
        self.request(|response| SessionMessage::PlayCard {
            participant_id,
            card_id,
            response,
        })
        .await?
    }

    pub async fn chat(&self, participant_id: ParticipantId, message: String) -> SessionResult<()> {
        self.request(|response| SessionMessage::Chat {
            participant_id,
            message,
            response,
        })
        .await?
    }

    pub async fn disconnect(&self, participant_id: ParticipantId) -> SessionResult<()> {
        self.request(|response| SessionMessage::Disconnect {
            participant_id,
            response,
        })
        .await?
    }

    pub async fn snapshot(&self) -> SessionResult<SessionSnapshot> {
        self.request(|response| SessionMessage::GetSnapshot { response })
            .await
    }

    /// Stop the actor. Resolves once it has left the registry.
    pub async fn close(&self) -> SessionResult<()> {
        self.request(|response| SessionMessage::Close { response })
            .await
    }
}

/// Owns a [`GameSession`] and serializes every mutation of it.
///
/// Besides its inbox the actor waits on two deadlines: the pending turn
/// advance after an accepted play, and the teardown of a finished or
/// abandoned session. Clearing a deadline cancels it; both die with the
/// actor.
pub struct SessionActor {
    id: SessionId,

    session: GameSession,

    config: SessionConfig,

    inbox: mpsc::Receiver<SessionMessage>,

    /// One per seated participant; dropped when that participant leaves.
    delivery: Vec<DeliveryHandle>,

    registry: Arc<SessionRegistry>,

    turn_deadline: Option<Instant>,

    close_deadline: Option<Instant>,

    is_closed: bool,
}

impl SessionActor {
    /// Create a new session actor
    ///
    /// # Arguments
    ///
    /// * `session` - The paired session, both participants seated
    /// * `delivery` - Delivery handles of the seated participants
    /// * `config` - Session configuration
    /// * `registry` - Registry the actor removes itself from on exit
    ///
    /// # Returns
    ///
    /// * `(SessionActor, SessionHandle)` - Actor and handle for sending messages
    pub fn new(
        session: GameSession,
        delivery: Vec<DeliveryHandle>,
        config: SessionConfig,
        registry: Arc<SessionRegistry>,
    ) -> (Self, SessionHandle) {
        let (sender, inbox) = mpsc::channel(config.inbox_capacity.max(1));
        let id = session.id();

        let actor = Self {
            id,
            session,
            config,
            inbox,
            delivery,
            registry,
            turn_deadline: None,
            close_deadline: None,
            is_closed: false,
        };

        (actor, SessionHandle::new(sender, id))
    }

    /// Run the session actor event loop
    pub async fn run(mut self) {
        log::info!(
            "Session {} starting with {} participants",
            self.id,
            self.session.participant_count()
        );

        loop {
            let turn_deadline = self.turn_deadline;
            let close_deadline = self.close_deadline;

            tokio::select! {
                message = self.inbox.recv() => match message {
                    Some(message) => self.handle_message(message).await,
                    None => self.close().await,
                },

                () = sleep_until(turn_deadline.unwrap_or_else(Instant::now)), if turn_deadline.is_some() => {
                    self.turn_deadline = None;
                    self.advance_turn();
                }

                () = sleep_until(close_deadline.unwrap_or_else(Instant::now)), if close_deadline.is_some() => {
                    self.close().await;
                }
            }

            if self.is_closed {
                break;
            }
        }

        log::info!("Session {} closed", self.id);
    }

    async fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::SetBranch {
                participant_id,
                branch,
                response,
            } => {
                let result = self.handle_set_branch(participant_id, branch);
                self.log_rejection("set-branch", participant_id, &result);
                let _ = response.send(result);
            }

            SessionMessage::PlayCard {
                participant_id,
                card_id,
                response,
            } => {
                let result = self.handle_play_card(participant_id, card_id);
                self.log_rejection("play-card", participant_id, &result);
                let _ = response.send(result);
            }

            SessionMessage::Chat {
                participant_id,
                message,
                response,
            } => {
                let result = self.handle_chat(participant_id, &message);
                let _ = response.send(result);
            }

            SessionMessage::Disconnect {
                participant_id,
                response,
            } => {
                let result = self.handle_disconnect(participant_id).await;
                let _ = response.send(result);
            }

            SessionMessage::GetSnapshot { response } => {
                let _ = response.send(self.session.snapshot());
            }

            SessionMessage::Close { response } => {
                self.close().await;
                let _ = response.send(());
            }
        }
    }

    fn handle_set_branch(&mut self, participant_id: ParticipantId, branch: Branch) -> SessionResult<()> {
        let outcome = self.session.set_branch(participant_id, branch)?;

        self.broadcast(ServerEvent::BranchSet {
            participant_id,
            branch: outcome.branch,
            effects: outcome.effects,
            state: self.session.snapshot(),
        });

        if outcome.ready_to_start {
            self.session.start()?;
            self.broadcast(ServerEvent::GameStarted {
                state: self.session.snapshot(),
            });
        }

        Ok(())
    }

    fn handle_play_card(&mut self, participant_id: ParticipantId, card_id: Uuid) -> SessionResult<()> {
        let outcome = self.session.play_card(participant_id, card_id)?;

        log::debug!(
            "Session {}: {} played {} ({})",
            self.id,
            participant_id,
            outcome.card.name,
            outcome.result.effect
        );

        self.broadcast(ServerEvent::CardPlayed {
            participant_id,
            card: outcome.card,
            result: outcome.result,
            state: self.session.snapshot(),
        });

        match outcome.winner {
            Some(winner) => self.finish(winner),
            None => self.turn_deadline = Some(Instant::now() + self.config.turn_delay),
        }

        Ok(())
    }

    /// Runs when the turn deadline fires.
    fn advance_turn(&mut self) {
        if self.session.is_finished() {
            return;
        }

        match self.session.next_turn() {
            Ok(outcome) => {
                self.broadcast(ServerEvent::TurnChanged {
                    turn_index: outcome.turn_index,
                    active_participant_id: outcome.active,
                    state: self.session.snapshot(),
                });
            }
            Err(e) => log::debug!("Session {}: turn advance skipped: {}", self.id, e),
        }
    }

    fn finish(&mut self, winner: ParticipantId) {
        self.turn_deadline = None;
        self.broadcast(ServerEvent::GameEnded { winner });
        self.close_deadline = Some(Instant::now() + self.config.finished_linger);
        log::info!(
            "Session {} finished, closing in {:?}",
            self.id,
            self.config.finished_linger
        );
    }

    fn handle_chat(&self, participant_id: ParticipantId, message: &str) -> SessionResult<()> {
        let sender = self
            .session
            .participant(participant_id)
            .ok_or(SessionError::UnknownParticipant)?
            .name
            .clone();

        let message: String = message.trim().chars().take(MAX_CHAT_LENGTH).collect();
        if message.is_empty() {
            return Ok(());
        }

        self.broadcast(ServerEvent::Chat {
            sender,
            message,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    async fn handle_disconnect(&mut self, participant_id: ParticipantId) -> SessionResult<()> {
        let participant = self
            .session
            .remove_participant(participant_id)
            .ok_or(SessionError::UnknownParticipant)?;
        self.delivery.retain(|d| d.participant() != participant_id);
        self.turn_deadline = None;

        log::info!(
            "Session {}: {} ({}) disconnected",
            self.id,
            participant.name,
            participant_id
        );
        self.broadcast(ServerEvent::OpponentDisconnected);

        let delay = self.config.disconnect_teardown_delay;
        if delay.is_zero() || self.delivery.is_empty() {
            self.close().await;
        } else {
            let deadline = Instant::now() + delay;
            self.close_deadline = Some(
                self.close_deadline
                    .map_or(deadline, |current| current.min(deadline)),
            );
        }

        Ok(())
    }

    /// Cancel everything pending and leave the registry.
    async fn close(&mut self) {
        if self.is_closed {
            return;
        }
        self.turn_deadline = None;
        self.close_deadline = None;
        self.is_closed = true;
        self.registry.unregister(self.id).await;
    }

    fn broadcast(&self, event: ServerEvent) {
        for handle in &self.delivery {
            handle.deliver(event.clone());
        }
    }

    fn log_rejection(&self, intent: &str, participant_id: ParticipantId, result: &SessionResult<()>) {
        if let Err(e) = result {
            log::debug!(
                "Session {}: rejected {} from {}: {}",
                self.id,
                intent,
                participant_id,
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{catalog::Catalog, entities::DisplayName, rules::Rules};
    use std::time::Duration;
    use tokio::sync::mpsc::Receiver;

    struct Harness {
        handle: SessionHandle,
        registry: Arc<SessionRegistry>,
        ids: [ParticipantId; 2],
        rx: [Receiver<ServerEvent>; 2],
    }

    async fn spawn_session(config: SessionConfig) -> Harness {
        let registry = Arc::new(SessionRegistry::new());
        let ids = [ParticipantId::new(), ParticipantId::new()];
        let mut session = GameSession::new(
            SessionId::new(),
            Rules::default(),
            Arc::new(Catalog::default()),
        );
        session.add_participant(ids[0], DisplayName::new("ada")).unwrap();
        session.add_participant(ids[1], DisplayName::new("bob")).unwrap();

        let (d0, rx0) = DeliveryHandle::channel(ids[0]);
        let (d1, rx1) = DeliveryHandle::channel(ids[1]);
        let (actor, handle) = SessionActor::new(session, vec![d0, d1], config, Arc::clone(&registry));
        registry.register(handle.clone(), ids).await.unwrap();
        tokio::spawn(actor.run());

        Harness {
            handle,
            registry,
            ids,
            rx: [rx0, rx1],
        }
    }

    #[tokio::test]
    async fn test_snapshot_before_start() {
        let h = spawn_session(SessionConfig::default()).await;
        let snapshot = h.handle.snapshot().await.unwrap();
        assert!(!snapshot.started);
        assert_eq!(snapshot.players.len(), 2);
    }

    #[tokio::test]
    async fn test_branches_start_game() {
        let mut h = spawn_session(SessionConfig::default()).await;
        h.handle.set_branch(h.ids[0], Branch::Algebra).await.unwrap();
        h.handle.set_branch(h.ids[1], Branch::Geometry).await.unwrap();

        let kinds: Vec<&str> = std::iter::from_fn(|| h.rx[1].try_recv().ok())
            .map(|e| e.kind())
            .collect();
        assert_eq!(kinds, vec!["branch-set", "branch-set", "game-started"]);

        let snapshot = h.handle.snapshot().await.unwrap();
        assert!(snapshot.started);
        assert_eq!(snapshot.player(h.ids[0]).unwrap().state.resource, 115);
    }

    #[tokio::test]
    async fn test_chat_is_trimmed_and_blank_dropped() {
        let mut h = spawn_session(SessionConfig::default()).await;
        h.handle.chat(h.ids[0], "   ".to_string()).await.unwrap();
        h.handle.chat(h.ids[0], "  hi  ".to_string()).await.unwrap();

        match h.rx[1].try_recv().unwrap() {
            ServerEvent::Chat {
                sender, message, ..
            } => {
                assert_eq!(sender.as_str(), "ada");
                assert_eq!(message, "hi");
            }
            other => panic!("unexpected event {}", other.kind()),
        }
        assert!(h.rx[1].try_recv().is_err());
    }

    #[tokio::test]
    async fn test_chat_from_stranger_rejected() {
        let h = spawn_session(SessionConfig::default()).await;
        let result = h.handle.chat(ParticipantId::new(), "hi".to_string()).await;
        assert_eq!(result, Err(SessionError::UnknownParticipant));
    }

    #[tokio::test]
    async fn test_disconnect_notifies_and_unregisters() {
        let mut h = spawn_session(SessionConfig::default()).await;
        h.handle.disconnect(h.ids[0]).await.unwrap();

        assert_eq!(h.rx[1].recv().await.unwrap().kind(), "opponent-disconnected");
        assert!(h.registry.get(h.handle.session_id()).await.is_none());
        assert!(!h.registry.contains_participant(h.ids[1]).await);
        assert_eq!(h.handle.snapshot().await.unwrap_err(), SessionError::SessionClosed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_teardown_after_disconnect() {
        let config = SessionConfig {
            disconnect_teardown_delay: Duration::from_secs(5),
            ..SessionConfig::default()
        };
        let h = spawn_session(config).await;
        h.handle.disconnect(h.ids[1]).await.unwrap();
        assert!(h.registry.get(h.handle.session_id()).await.is_some());

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(h.registry.get(h.handle.session_id()).await.is_none());
    }

    #[tokio::test]
    async fn test_close_is_acknowledged() {
        let h = spawn_session(SessionConfig::default()).await;
        h.handle.close().await.unwrap();
        assert!(h.registry.is_empty().await);
    }
}
