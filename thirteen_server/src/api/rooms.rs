//! Room API handlers.
//!
//! REST endpoints for every room operation: directory listing, creation,
//! seating, readiness, drafts, submissions, suggestions and history. Seat
//! operations resolve the caller's seat from the `x-player-id` header.
//!
//! # Examples
//!
//! List all rooms:
//! ```bash
//! curl http://localhost:6969/api/v1/rooms
//! ```
//!
//! Submit an arrangement:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/rooms/1/arrangement \
//!   -H "x-player-id: alice" \
//!   -H "Content-Type: application/json" \
//!   -d '{"front": ["2_of_spades", ...], "middle": [...], "back": [...]}'
//! ```

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use thirteen::{
    Arrangement, PlayerId, RoomConfig, RoomError, RoomId, ScoringRules, SeatIndex, Validation,
    room::{RoomSpeed, RoomSummary, RoomView, RoundResult},
};

use super::{
    AppState,
    middleware::{MaybePlayer, Player},
};
use crate::metrics;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handler result with the JSON error body
pub type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

/// Settings a client may choose when creating a room. Anything left out
/// falls back to the server's room defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateRoomRequest {
    pub name: Option<String>,
    pub seats: Option<usize>,
    pub rounds: Option<u32>,
    pub stake_unit: Option<i64>,
    pub speed: Option<RoomSpeed>,
    pub arrange_timeout_secs: Option<u64>,
    pub deck_seed: Option<u64>,
    pub bots: Option<usize>,
    pub scoring: Option<ScoringRules>,
}

impl CreateRoomRequest {
    fn into_config(self, defaults: &RoomConfig) -> RoomConfig {
        let defaults = defaults.clone();
        RoomConfig {
            name: self.name.unwrap_or(defaults.name),
            seats: self.seats.unwrap_or(defaults.seats),
            rounds: self.rounds.unwrap_or(defaults.rounds),
            stake_unit: self.stake_unit.unwrap_or(defaults.stake_unit),
            speed: self.speed.unwrap_or(defaults.speed),
            arrange_timeout_secs: self.arrange_timeout_secs.or(defaults.arrange_timeout_secs),
            deck_seed: self.deck_seed.or(defaults.deck_seed),
            bots: self.bots.unwrap_or(defaults.bots),
            scoring: self.scoring.unwrap_or(defaults.scoring),
            ..defaults
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateRoomResponse {
    pub id: RoomId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SeatResponse {
    pub seat: SeatIndex,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub message: String,
}

impl SuccessResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

/// HTTP status for a room error
pub fn status_for(err: &RoomError) -> StatusCode {
    match err {
        RoomError::Malformed(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RoomError::InvalidStateTransition(_)
        | RoomError::RoomFull
        | RoomError::AlreadySeated(_)
        | RoomError::AlreadySubmitted(_)
        | RoomError::EmptySeat(_) => StatusCode::CONFLICT,
        RoomError::InvalidConfig(_) | RoomError::InsufficientCards(_) => StatusCode::BAD_REQUEST,
        RoomError::RoomNotFound(_) => StatusCode::NOT_FOUND,
        RoomError::RoomClosed(_) => StatusCode::GONE,
    }
}

/// Map a room error to a status and client-safe JSON body
pub fn error_response(err: RoomError) -> (StatusCode, Json<ErrorResponse>) {
    (
        status_for(&err),
        Json(ErrorResponse {
            error: err.client_message(),
        }),
    )
}

/// The caller's seat in a room, or `403 Forbidden` when unseated
pub async fn seat_of(
    state: &AppState,
    room_id: RoomId,
    player: PlayerId,
) -> Result<SeatIndex, (StatusCode, Json<ErrorResponse>)> {
    state
        .room_manager
        .find_seat(room_id, player)
        .await
        .map_err(error_response)?
        .ok_or((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "Player is not seated in this room".to_string(),
            }),
        ))
}

/// List all live rooms.
///
/// # Response
///
/// Returns `200 OK` with an array of room summaries:
/// ```json
/// [
///   {
///     "id": 1,
///     "name": "Room 1",
///     "seats_taken": 2,
///     "seats": 4,
///     "phase": "waiting",
///     "round": 0,
///     "rounds": 8,
///     "speed": "normal"
///   }
/// ]
/// ```
pub async fn list_rooms(State(state): State<AppState>) -> Json<Vec<RoomSummary>> {
    Json(state.room_manager.list_rooms().await)
}

/// Create a room.
///
/// # Errors
///
/// - `400 Bad Request`: The resulting configuration is invalid
pub async fn create_room(
    State(state): State<AppState>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<CreateRoomResponse>), (StatusCode, Json<ErrorResponse>)> {
    let config = request.into_config(&state.room_defaults);
    let id = state
        .room_manager
        .create_room(config)
        .await
        .map_err(error_response)?;

    metrics::rooms_created_total();
    tokio::spawn(metrics::observe_room(state.room_manager.clone(), id));

    Ok((StatusCode::CREATED, Json(CreateRoomResponse { id })))
}

/// Get a room as the caller sees it.
///
/// Seated callers see their own cards, draft and submission; anyone else
/// gets the spectator view.
///
/// # Errors
///
/// - `404 Not Found`: Room doesn't exist
pub async fn get_room(
    State(state): State<AppState>,
    MaybePlayer(player): MaybePlayer,
    Path(room_id): Path<RoomId>,
) -> ApiResult<RoomView> {
    let seat = match player {
        Some(player) => state
            .room_manager
            .find_seat(room_id, player)
            .await
            .map_err(error_response)?,
        None => None,
    };
    state
        .room_manager
        .get_view(room_id, seat)
        .await
        .map(Json)
        .map_err(error_response)
}

/// Close a room.
pub async fn close_room(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
) -> ApiResult<SuccessResponse> {
    state
        .room_manager
        .close_room(room_id)
        .await
        .map_err(error_response)?;
    Ok(SuccessResponse::new("Room closed"))
}

/// Take the first free seat.
///
/// # Errors
///
/// - `401 Unauthorized`: No player identity
/// - `404 Not Found`: Room doesn't exist
/// - `409 Conflict`: Room full, player already seated, or play under way
pub async fn join_room(
    State(state): State<AppState>,
    Player(player): Player,
    Path(room_id): Path<RoomId>,
) -> ApiResult<SeatResponse> {
    state
        .room_manager
        .join(room_id, player)
        .await
        .map(|seat| Json(SeatResponse { seat }))
        .map_err(error_response)
}

/// Give up the caller's seat.
pub async fn leave_room(
    State(state): State<AppState>,
    Player(player): Player,
    Path(room_id): Path<RoomId>,
) -> ApiResult<SuccessResponse> {
    let seat = seat_of(&state, room_id, player).await?;
    state
        .room_manager
        .leave(room_id, seat)
        .await
        .map_err(error_response)?;
    Ok(SuccessResponse::new("Left room"))
}

/// Mark the caller ready.
pub async fn ready(
    State(state): State<AppState>,
    Player(player): Player,
    Path(room_id): Path<RoomId>,
) -> ApiResult<SuccessResponse> {
    let seat = seat_of(&state, room_id, player).await?;
    state
        .room_manager
        .submit_ready(room_id, seat)
        .await
        .map_err(error_response)?;
    Ok(SuccessResponse::new("Ready"))
}

/// Take back the caller's ready flag.
///
/// # Errors
///
/// - `409 Conflict`: The round has already been dealt
pub async fn unready(
    State(state): State<AppState>,
    Player(player): Player,
    Path(room_id): Path<RoomId>,
) -> ApiResult<SuccessResponse> {
    let seat = seat_of(&state, room_id, player).await?;
    state
        .room_manager
        .submit_unready(room_id, seat)
        .await
        .map_err(error_response)?;
    Ok(SuccessResponse::new("Not ready"))
}

/// Seat a bot next to the caller.
///
/// # Errors
///
/// - `403 Forbidden`: Caller isn't seated in the room
/// - `409 Conflict`: Room full or play under way
pub async fn add_bot(
    State(state): State<AppState>,
    Player(player): Player,
    Path(room_id): Path<RoomId>,
) -> ApiResult<SeatResponse> {
    seat_of(&state, room_id, player).await?;
    state
        .room_manager
        .add_bot(room_id)
        .await
        .map(|seat| Json(SeatResponse { seat }))
        .map_err(error_response)
}

/// Lock in the caller's arrangement.
///
/// A fouled arrangement is accepted and reported in the validation.
///
/// # Errors
///
/// - `409 Conflict`: Not arranging, or already submitted
/// - `422 Unprocessable Entity`: Wrong lane sizes, duplicate or foreign cards
pub async fn submit_arrangement(
    State(state): State<AppState>,
    Player(player): Player,
    Path(room_id): Path<RoomId>,
    Json(arrangement): Json<Arrangement>,
) -> ApiResult<Validation> {
    let seat = seat_of(&state, room_id, player).await?;
    state
        .room_manager
        .submit_arrangement(room_id, seat, arrangement)
        .await
        .map(Json)
        .map_err(error_response)
}

/// Save the caller's draft.
pub async fn save_draft(
    State(state): State<AppState>,
    Player(player): Player,
    Path(room_id): Path<RoomId>,
    Json(arrangement): Json<Arrangement>,
) -> ApiResult<SuccessResponse> {
    let seat = seat_of(&state, room_id, player).await?;
    state
        .room_manager
        .save_draft(room_id, seat, arrangement)
        .await
        .map_err(error_response)?;
    Ok(SuccessResponse::new("Draft saved"))
}

/// Suggested arrangement of the caller's cards.
pub async fn suggestion(
    State(state): State<AppState>,
    Player(player): Player,
    Path(room_id): Path<RoomId>,
) -> ApiResult<Arrangement> {
    let seat = seat_of(&state, room_id, player).await?;
    state
        .room_manager
        .suggest(room_id, seat)
        .await
        .map(Json)
        .map_err(error_response)
}

/// Every completed round in a room.
pub async fn history(
    State(state): State<AppState>,
    Path(room_id): Path<RoomId>,
) -> ApiResult<Vec<RoundResult>> {
    state
        .room_manager
        .history(room_id)
        .await
        .map(Json)
        .map_err(error_response)
}
