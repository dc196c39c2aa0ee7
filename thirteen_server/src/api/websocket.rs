//! WebSocket handler for live room updates.
//!
//! A connection is bound to one room and, optionally, one player. Every
//! room event is forwarded as it happens; phase changes and round results
//! are followed by a fresh view for the connected player. Players can also
//! act over the socket instead of the REST routes.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws/{room_id}?player=<id>` (or with the
//!    `x-player-id` header; without either it's a spectator)
//! 2. Server subscribes to the room and sends the current view
//! 3. A send task forwards events, views and command responses
//! 4. On disconnect the seat is reported disconnected, not vacated; an
//!    unsubmitted hand is forfeited at the arranging deadline
//!
//! # Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:6969/ws/1?player=alice');
//!
//! ws.send(JSON.stringify({ type: "ready" }));
//! ws.send(JSON.stringify({
//!   type: "submit",
//!   arrangement: { front: [...], middle: [...], back: [...] }
//! }));
//! ```

use axum::{
    extract::{
        Path, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use thirteen::{
    Arrangement, PlayerId, RoomError, RoomId, RoomResult, SeatIndex, Validation,
    room::{RoomEvent, RoomView},
};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::{AppState, middleware::player_from_headers, rate_limiter::RateLimiter};
use crate::metrics;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    player: Option<String>,
}

/// Commands accepted from the client
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Join,
    Ready,
    Unready,
    AddBot,
    Leave,
    Draft { arrangement: Arrangement },
    Submit { arrangement: Arrangement },
    Suggest,
    View,
}

/// Messages sent to the client
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Event { event: RoomEvent },
    View { view: RoomView },
    Success { message: String },
    Validation { validation: Validation },
    Suggestion { arrangement: Arrangement },
    Error { message: String },
}

impl ServerMessage {
    fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    fn success(message: impl Into<String>) -> Self {
        Self::Success {
            message: message.into(),
        }
    }
}

/// Upgrade to a WebSocket bound to `room_id`.
///
/// Returns `404 Not Found` without upgrading when the room doesn't exist.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(room_id): Path<RoomId>,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Response {
    if state.room_manager.get_room(room_id).await.is_none() {
        return (StatusCode::NOT_FOUND, "Room not found").into_response();
    }

    let player = query
        .player
        .map(|p| PlayerId::new(&p))
        .filter(|p| !p.as_str().is_empty())
        .or_else(|| player_from_headers(&headers));

    ws.on_upgrade(move |socket| handle_socket(socket, room_id, player, state))
}

/// The room as `player` sees it, or as a spectator
async fn view_for(
    state: &AppState,
    room_id: RoomId,
    player: Option<&PlayerId>,
) -> RoomResult<RoomView> {
    let seat = match player {
        Some(player) => state.room_manager.find_seat(room_id, player.clone()).await?,
        None => None,
    };
    state.room_manager.get_view(room_id, seat).await
}

fn encode(message: &ServerMessage) -> Option<String> {
    serde_json::to_string(message)
        .inspect_err(|e| error!("Failed to serialize server message: {}", e))
        .ok()
}

/// Handle an established WebSocket connection.
async fn handle_socket(socket: WebSocket, room_id: RoomId, player: Option<PlayerId>, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let who = player
        .as_ref()
        .map_or_else(|| "spectator".to_string(), ToString::to_string);

    info!("WebSocket connected: room={}, player={}", room_id, who);
    metrics::websocket_connection_opened();

    let mut burst_limiter = RateLimiter::burst();
    let mut sustained_limiter = RateLimiter::sustained();

    let (response_tx, mut response_rx) = mpsc::channel::<String>(32);
    let (event_tx, mut event_rx) = mpsc::channel::<RoomEvent>(32);
    let subscriber_id = Uuid::new_v4();

    if let Err(e) = state
        .room_manager
        .subscribe(room_id, subscriber_id, event_tx)
        .await
    {
        error!("Failed to subscribe to room {}: {}", room_id, e);
        metrics::websocket_connection_closed();
        return;
    }

    if let Some(player) = &player
        && let Ok(Some(seat)) = state.room_manager.find_seat(room_id, player.clone()).await
    {
        let _ = state.room_manager.reconnect(room_id, seat).await;
    }

    if let Ok(view) = view_for(&state, room_id, player.as_ref()).await
        && let Some(json) = encode(&ServerMessage::View { view })
    {
        let _ = response_tx.send(json).await;
    }

    let send_state = state.clone();
    let send_player = player.clone();
    let send_task = tokio::spawn(async move {
        loop {
            let outgoing = tokio::select! {
                event = event_rx.recv() => {
                    let Some(event) = event else {
                        // Room actor stopped
                        break;
                    };
                    let refresh = matches!(
                        event,
                        RoomEvent::RoomStateChanged { .. } | RoomEvent::RoundCompleted(_)
                    );
                    let mut batch: Vec<String> = encode(&ServerMessage::Event { event })
                        .into_iter()
                        .collect();
                    if refresh
                        && let Ok(view) = view_for(&send_state, room_id, send_player.as_ref()).await
                    {
                        batch.extend(encode(&ServerMessage::View { view }));
                    }
                    batch
                }
                response = response_rx.recv() => {
                    let Some(response) = response else {
                        break;
                    };
                    vec![response]
                }
            };

            for json in outgoing {
                if sender.send(Message::Text(json.into())).await.is_err() {
                    return;
                }
                metrics::websocket_messages_sent();
            }
        }
        let _ = sender.send(Message::Close(None)).await;
    });

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                metrics::websocket_messages_received();

                if !burst_limiter.check() || !sustained_limiter.check() {
                    warn!(
                        "Rate limit exceeded for player {} (room {}). Dropping message.",
                        who, room_id
                    );
                    if let Some(json) =
                        encode(&ServerMessage::error("Rate limit exceeded. Please slow down."))
                    {
                        let _ = response_tx.send(json).await;
                    }
                    continue;
                }

                let response = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => {
                        handle_client_message(client_msg, room_id, player.as_ref(), &state).await
                    }
                    Err(e) => {
                        warn!("Failed to parse client message: {}", e);
                        ServerMessage::error("Invalid message format")
                    }
                };

                if let Some(json) = encode(&response)
                    && response_tx.send(json).await.is_err()
                {
                    break;
                }
            }
            Ok(Message::Close(_)) => {
                info!("WebSocket closed: room={}, player={}", room_id, who);
                break;
            }
            Err(e) => {
                error!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    send_task.abort();
    state.room_manager.unsubscribe(room_id, subscriber_id).await;

    // The seat stays taken; the room forfeits the hand if the clock runs out
    if let Some(player) = &player
        && let Ok(Some(seat)) = state.room_manager.find_seat(room_id, player.clone()).await
    {
        let _ = state.room_manager.disconnect(room_id, seat).await;
    }

    metrics::websocket_connection_closed();
    info!("WebSocket disconnected: room={}, player={}", room_id, who);
}

/// Run one client command against the room.
pub async fn handle_client_message(
    msg: ClientMessage,
    room_id: RoomId,
    player: Option<&PlayerId>,
    state: &AppState,
) -> ServerMessage {
    run_command(msg, room_id, player, state)
        .await
        .unwrap_or_else(|message| message)
}

fn failed(err: RoomError) -> ServerMessage {
    ServerMessage::error(err.client_message())
}

fn acting(player: Option<&PlayerId>) -> Result<&PlayerId, ServerMessage> {
    player.ok_or_else(|| ServerMessage::error("Spectators cannot act; connect with a player id"))
}

async fn seated(
    state: &AppState,
    room_id: RoomId,
    player: Option<&PlayerId>,
) -> Result<SeatIndex, ServerMessage> {
    let player = acting(player)?;
    state
        .room_manager
        .find_seat(room_id, player.clone())
        .await
        .map_err(failed)?
        .ok_or_else(|| ServerMessage::error("Player is not seated in this room"))
}

async fn run_command(
    msg: ClientMessage,
    room_id: RoomId,
    player: Option<&PlayerId>,
    state: &AppState,
) -> Result<ServerMessage, ServerMessage> {
    let manager = &state.room_manager;
    match msg {
        ClientMessage::View => view_for(state, room_id, player)
            .await
            .map(|view| ServerMessage::View { view })
            .map_err(failed),
        ClientMessage::Join => {
            let player = acting(player)?;
            manager
                .join(room_id, player.clone())
                .await
                .map(|seat| ServerMessage::success(format!("Joined seat {seat}")))
                .map_err(failed)
        }
        ClientMessage::Ready => {
            let seat = seated(state, room_id, player).await?;
            manager
                .submit_ready(room_id, seat)
                .await
                .map(|()| ServerMessage::success("Ready"))
                .map_err(failed)
        }
        ClientMessage::Unready => {
            let seat = seated(state, room_id, player).await?;
            manager
                .submit_unready(room_id, seat)
                .await
                .map(|()| ServerMessage::success("Not ready"))
                .map_err(failed)
        }
        ClientMessage::AddBot => {
            seated(state, room_id, player).await?;
            manager
                .add_bot(room_id)
                .await
                .map(|seat| ServerMessage::success(format!("Bot joined seat {seat}")))
                .map_err(failed)
        }
        ClientMessage::Leave => {
            let seat = seated(state, room_id, player).await?;
            manager
                .leave(room_id, seat)
                .await
                .map(|()| ServerMessage::success("Left room"))
                .map_err(failed)
        }
        ClientMessage::Draft { arrangement } => {
            let seat = seated(state, room_id, player).await?;
            manager
                .save_draft(room_id, seat, arrangement)
                .await
                .map(|()| ServerMessage::success("Draft saved"))
                .map_err(failed)
        }
        ClientMessage::Submit { arrangement } => {
            let seat = seated(state, room_id, player).await?;
            manager
                .submit_arrangement(room_id, seat, arrangement)
                .await
                .map(|validation| ServerMessage::Validation { validation })
                .map_err(failed)
        }
        ClientMessage::Suggest => {
            let seat = seated(state, room_id, player).await?;
            manager
                .suggest(room_id, seat)
                .await
                .map(|arrangement| ServerMessage::Suggestion { arrangement })
                .map_err(failed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use thirteen::{RoomConfig, RoomManager, room::PhaseName};

    async fn state_with_room() -> (AppState, RoomId) {
        let manager = Arc::new(RoomManager::new());
        let room_id = manager
            .create_room(RoomConfig {
                seats: 2,
                deck_seed: Some(1),
                ..RoomConfig::default()
            })
            .await
            .unwrap();
        let state = AppState {
            room_manager: manager,
            room_defaults: Arc::new(RoomConfig::default()),
        };
        (state, room_id)
    }

    #[test]
    fn test_client_message_parsing() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type": "ready"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Ready));

        let msg: ClientMessage = serde_json::from_str(r#"{"type": "unready"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Unready));

        let msg: ClientMessage = serde_json::from_str(r#"{"type": "add_bot"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::AddBot));

        let msg: ClientMessage = serde_json::from_str(
            r#"{"type": "draft", "arrangement": {"front": ["ace_of_spades"], "middle": [], "back": []}}"#,
        )
        .unwrap();
        assert!(matches!(msg, ClientMessage::Draft { arrangement } if arrangement.len() == 1));
    }

    #[tokio::test]
    async fn test_spectator_cannot_act() {
        let (state, room_id) = state_with_room().await;
        let response = handle_client_message(ClientMessage::Ready, room_id, None, &state).await;
        assert!(matches!(response, ServerMessage::Error { .. }));
    }

    #[tokio::test]
    async fn test_join_ready_and_deal_over_socket_commands() {
        let (state, room_id) = state_with_room().await;
        for name in ["alice", "bob"] {
            let player = PlayerId::new(name);
            let joined =
                handle_client_message(ClientMessage::Join, room_id, Some(&player), &state).await;
            assert!(matches!(joined, ServerMessage::Success { .. }));
            let ready =
                handle_client_message(ClientMessage::Ready, room_id, Some(&player), &state).await;
            assert!(matches!(ready, ServerMessage::Success { .. }));
        }

        let alice = PlayerId::new("alice");
        let view = handle_client_message(ClientMessage::View, room_id, Some(&alice), &state).await;
        let ServerMessage::View { view } = view else {
            panic!("expected a view");
        };
        assert_eq!(view.phase, PhaseName::Arranging);
        assert_eq!(view.your_seat, Some(0));

        let suggestion =
            handle_client_message(ClientMessage::Suggest, room_id, Some(&alice), &state).await;
        let ServerMessage::Suggestion { arrangement } = suggestion else {
            panic!("expected a suggestion");
        };
        let submitted = handle_client_message(
            ClientMessage::Submit { arrangement },
            room_id,
            Some(&alice),
            &state,
        )
        .await;
        assert!(matches!(
            submitted,
            ServerMessage::Validation { validation } if !validation.is_foul()
        ));
    }

    #[tokio::test]
    async fn test_bot_opponent_and_unready_over_socket_commands() {
        let (state, room_id) = state_with_room().await;
        let alice = PlayerId::new("alice");
        handle_client_message(ClientMessage::Join, room_id, Some(&alice), &state).await;
        let bot = handle_client_message(ClientMessage::AddBot, room_id, Some(&alice), &state).await;
        assert!(matches!(bot, ServerMessage::Success { message } if message.contains("seat 1")));

        handle_client_message(ClientMessage::Ready, room_id, Some(&alice), &state).await;
        let view = state.room_manager.get_view(room_id, Some(0)).await.unwrap();
        assert_eq!(view.phase, PhaseName::Arranging);
        assert!(view.seats[1].bot);
        assert!(view.seats[1].submitted);

        let late =
            handle_client_message(ClientMessage::Unready, room_id, Some(&alice), &state).await;
        assert!(matches!(late, ServerMessage::Error { .. }));
    }

    #[tokio::test]
    async fn test_unseated_player_is_told_so() {
        let (state, room_id) = state_with_room().await;
        let carol = PlayerId::new("carol");
        let response =
            handle_client_message(ClientMessage::Suggest, room_id, Some(&carol), &state).await;
        assert!(matches!(
            response,
            ServerMessage::Error { message } if message.contains("not seated")
        ));
    }
}
