use tokio::sync::mpsc;

use super::messages::ServerEvent;

pub use crate::game::entities::{Participant, ParticipantId};

/// Default per-participant outbound buffer.
pub const DELIVERY_BUFFER: usize = 64;

/// Where events for one participant go. The transport owns the receiving
/// end; once it drops it the handle is revoked and every delivery becomes a
/// no-op.
#[derive(Clone, Debug)]
pub struct DeliveryHandle {
    participant: ParticipantId,
    sender: mpsc::Sender<ServerEvent>,
}

impl DeliveryHandle {
    pub fn new(participant: ParticipantId, sender: mpsc::Sender<ServerEvent>) -> Self {
        Self {
            participant,
            sender,
        }
    }

    /// A handle plus the receiver the transport drains.
    pub fn channel(participant: ParticipantId) -> (Self, mpsc::Receiver<ServerEvent>) {
        let (sender, receiver) = mpsc::channel(DELIVERY_BUFFER);
        (Self::new(participant, sender), receiver)
    }

    pub fn participant(&self) -> ParticipantId {
        self.participant
    }

    /// Queue an event without waiting. Returns whether it was accepted.
    pub fn deliver(&self, event: ServerEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(event)) => {
                log::warn!(
                    "Delivery buffer full for {}, dropping {}",
                    self.participant,
                    event.kind()
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                log::debug!(
                    "Participant {} gone, dropping {}",
                    self.participant,
                    event.kind()
                );
                false
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deliver_reaches_receiver() {
        let (handle, mut rx) = DeliveryHandle::channel(ParticipantId::new());
        assert!(handle.deliver(ServerEvent::Waiting));
        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind(), "waiting");
    }

    #[test]
    fn test_deliver_after_drop_is_noop() {
        let (handle, rx) = DeliveryHandle::channel(ParticipantId::new());
        drop(rx);
        assert!(handle.is_closed());
        assert!(!handle.deliver(ServerEvent::Waiting));
    }

    #[test]
    fn test_deliver_when_full_drops() {
        let (sender, _rx) = mpsc::channel(1);
        let handle = DeliveryHandle::new(ParticipantId::new(), sender);
        assert!(handle.deliver(ServerEvent::Waiting));
        assert!(!handle.deliver(ServerEvent::Waiting));
    }
}
