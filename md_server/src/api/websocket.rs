//! WebSocket transport for one participant.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws` and is assigned a fresh participant id
//! 2. Server spawns a send task draining the participant's delivery handle
//!    into the socket
//! 3. Every text frame is rate limited, decoded as a [`ClientMessage`] and
//!    handed to the lobby
//! 4. On close the participant is disconnected from the lobby, which leaves
//!    the queue or tears down the session
//!
//! Malformed frames and refused intents produce no reply; only rate limiting
//! and pairing failures answer with an `error` event.
//!
//! # Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:3001/ws');
//! ws.onopen = () => ws.send(JSON.stringify({ type: "join-queue", name: "Ada" }));
//! ws.onmessage = (event) => {
//!   const data = JSON.parse(event.data);
//!   if (data.type === "matched") {
//!     ws.send(JSON.stringify({ type: "set-branch", sessionId: data.sessionId, branch: "calculus" }));
//!   }
//! };
//! ```

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use math_duel::{ClientMessage, DeliveryHandle, ParticipantId, ServerEvent};

use super::{AppState, rate_limiter::IntentLimiter};
use crate::{logging, metrics};

pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let participant_id = ParticipantId::new();
    let (mut sender, mut receiver) = socket.split();
    let (delivery, mut events) = DeliveryHandle::channel(participant_id);

    metrics::connection_opened();
    logging::log_connection_event("opened", participant_id, None);

    let send_task = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            record_event(participant_id, &event);

            let json = match serde_json::to_string(&event) {
                Ok(j) => j,
                Err(e) => {
                    error!("Failed to serialize {} event: {}", event.kind(), e);
                    continue;
                }
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let mut limiter = IntentLimiter::new();

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if let Err(reason) = limiter.check() {
                    warn!("Rate limit exceeded for {participant_id}. Dropping intent.");
                    metrics::intent_rate_limited();
                    delivery.deliver(ServerEvent::error(reason));
                    continue;
                }

                let message = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(message) => message,
                    Err(e) => {
                        debug!("Malformed intent from {participant_id}: {e}");
                        continue;
                    }
                };

                let intent = message.kind();
                match state
                    .lobby
                    .handle_message(participant_id, &delivery, message)
                    .await
                {
                    Ok(()) if intent == "play-card" => metrics::card_played(),
                    Ok(()) => {}
                    Err(e) => logging::log_rejected_intent(intent, participant_id, &e.to_string()),
                }
            }
            Ok(Message::Close(_)) => {
                info!("WebSocket closed by {participant_id}");
                break;
            }
            Err(e) => {
                warn!("WebSocket error for {participant_id}: {e}");
                break;
            }
            _ => {}
        }
    }

    let session_id = state.lobby.session_of(participant_id).await;
    state.lobby.disconnect(participant_id).await;
    drop(delivery);
    send_task.abort();

    metrics::connection_closed();
    logging::log_connection_event("closed", participant_id, session_id);
}

fn record_event(participant_id: ParticipantId, event: &ServerEvent) {
    match event {
        ServerEvent::Matched {
            session_id, slot, ..
        } => {
            logging::log_connection_event("matched", participant_id, Some(*session_id));
            if *slot == 0 {
                metrics::match_created();
            }
        }
        ServerEvent::GameEnded { winner } if *winner == participant_id => {
            metrics::game_finished();
        }
        _ => {}
    }
}
