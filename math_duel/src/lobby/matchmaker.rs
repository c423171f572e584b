//! FIFO matchmaking.

use std::{collections::VecDeque, sync::Arc};
use tokio::sync::Mutex;

use super::registry::SessionRegistry;
use crate::{
    game::{
        catalog::Catalog,
        entities::{DisplayName, Participant, ParticipantId, SessionId},
        errors::SessionResult,
        session::GameSession,
    },
    net::{messages::ServerEvent, relay::DeliveryHandle},
    session::{SessionActor, SessionConfig},
};

/// What happened to a `join-queue` intent.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EnqueueOutcome {
    /// Queued behind nobody; told to wait.
    Waiting,
    /// Paired with the oldest waiting participant.
    Matched(SessionId),
    /// Already queued or already in a session.
    Ignored,
}

#[derive(Clone, Debug)]
struct QueuedParticipant {
    id: ParticipantId,
    name: DisplayName,
    delivery: DeliveryHandle,
}

/// Pairs arrivals two at a time and spawns a session actor per pair.
pub struct Matchmaker {
    queue: Mutex<VecDeque<QueuedParticipant>>,
    registry: Arc<SessionRegistry>,
    config: SessionConfig,
    catalog: Arc<Catalog>,
}

impl Matchmaker {
    pub fn new(registry: Arc<SessionRegistry>, config: SessionConfig, catalog: Arc<Catalog>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            registry,
            config,
            catalog,
        }
    }

    /// Queue a participant, or pair it with the oldest live waiter. The
    /// waiter takes slot 0.
    pub async fn enqueue(
        &self,
        id: ParticipantId,
        name: DisplayName,
        delivery: DeliveryHandle,
    ) -> SessionResult<EnqueueOutcome> {
        let mut queue = self.queue.lock().await;
        if queue.iter().any(|w| w.id == id) || self.registry.contains_participant(id).await {
            log::debug!("Ignoring join-queue from {id}: already queued or playing");
            return Ok(EnqueueOutcome::Ignored);
        }

        queue.retain(|w| {
            let live = !w.delivery.is_closed();
            if !live {
                log::debug!("Dropping stale queue entry {}", w.id);
            }
            live
        });

        let arriving = QueuedParticipant { id, name, delivery };
        let Some(waiting) = queue.pop_front() else {
            arriving.delivery.deliver(ServerEvent::Waiting);
            log::info!("{} ({}) waiting for an opponent", arriving.name, arriving.id);
            queue.push_back(arriving);
            return Ok(EnqueueOutcome::Waiting);
        };

        match self.pair(&waiting, &arriving).await {
            Ok(session_id) => Ok(EnqueueOutcome::Matched(session_id)),
            Err(e) => {
                log::warn!("Pairing {} with {} failed: {}", waiting.id, arriving.id, e);
                arriving.delivery.deliver(ServerEvent::error(e.to_string()));
                queue.push_front(waiting);
                Err(e)
            }
        }
    }

    async fn pair(&self, first: &QueuedParticipant, second: &QueuedParticipant) -> SessionResult<SessionId> {
        let session_id = SessionId::new();
        let mut session = GameSession::new(
            session_id,
            self.config.rules.clone(),
            Arc::clone(&self.catalog),
        );
        session.add_participant(first.id, first.name.clone())?;
        session.add_participant(second.id, second.name.clone())?;
        let roster: Vec<Participant> = session.participants().cloned().collect();

        let (actor, handle) = SessionActor::new(
            session,
            vec![first.delivery.clone(), second.delivery.clone()],
            self.config.clone(),
            Arc::clone(&self.registry),
        );
        self.registry.register(handle, [first.id, second.id]).await?;
        tokio::spawn(actor.run());

        for participant in &roster {
            let (me, opponent) = if participant.id == first.id {
                (first, second)
            } else {
                (second, first)
            };
            me.delivery.deliver(ServerEvent::Matched {
                session_id,
                opponent_name: opponent.name.clone(),
                slot: participant.slot,
                participants: roster.clone(),
            });
        }

        log::info!(
            "Matched {} vs {} in session {}",
            first.name,
            second.name,
            session_id
        );
        Ok(session_id)
    }

    /// Take a participant out of the queue. Returns whether it was queued.
    pub async fn remove(&self, id: ParticipantId) -> bool {
        let mut queue = self.queue.lock().await;
        let before = queue.len();
        queue.retain(|w| w.id != id);
        queue.len() != before
    }

    pub async fn waiting_count(&self) -> usize {
        self.queue.lock().await.len()
    }

    pub async fn clear(&self) {
        self.queue.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matchmaker() -> (Matchmaker, Arc<SessionRegistry>) {
        let registry = Arc::new(SessionRegistry::new());
        let matchmaker = Matchmaker::new(
            Arc::clone(&registry),
            SessionConfig::default(),
            Arc::new(Catalog::default()),
        );
        (matchmaker, registry)
    }

    #[tokio::test]
    async fn test_first_arrival_waits() {
        let (mm, _) = matchmaker();
        let id = ParticipantId::new();
        let (delivery, mut rx) = DeliveryHandle::channel(id);

        let outcome = mm.enqueue(id, "ada".into(), delivery).await.unwrap();
        assert_eq!(outcome, EnqueueOutcome::Waiting);
        assert_eq!(rx.recv().await.unwrap().kind(), "waiting");
        assert_eq!(mm.waiting_count().await, 1);
    }

    #[tokio::test]
    async fn test_requeue_is_noop() {
        let (mm, _) = matchmaker();
        let id = ParticipantId::new();
        let (delivery, _rx) = DeliveryHandle::channel(id);

        mm.enqueue(id, "ada".into(), delivery.clone()).await.unwrap();
        let outcome = mm.enqueue(id, "ada".into(), delivery).await.unwrap();
        assert_eq!(outcome, EnqueueOutcome::Ignored);
        assert_eq!(mm.waiting_count().await, 1);
    }

    #[tokio::test]
    async fn test_stale_waiter_skipped() {
        let (mm, registry) = matchmaker();
        let gone = ParticipantId::new();
        let (delivery, rx) = DeliveryHandle::channel(gone);
        mm.enqueue(gone, "gone".into(), delivery).await.unwrap();
        drop(rx);

        let id = ParticipantId::new();
        let (delivery, _rx) = DeliveryHandle::channel(id);
        let outcome = mm.enqueue(id, "ada".into(), delivery).await.unwrap();
        assert_eq!(outcome, EnqueueOutcome::Waiting);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_remove() {
        let (mm, _) = matchmaker();
        let id = ParticipantId::new();
        let (delivery, _rx) = DeliveryHandle::channel(id);
        mm.enqueue(id, "ada".into(), delivery).await.unwrap();

        assert!(mm.remove(id).await);
        assert!(!mm.remove(id).await);
        assert_eq!(mm.waiting_count().await, 0);
    }
}
