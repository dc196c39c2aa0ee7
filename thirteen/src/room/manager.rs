//! Room manager for spawning and managing multiple room actors.

use super::{
    actor::{RoomActor, RoomHandle},
    config::RoomConfig,
    errors::{RoomError, RoomId, RoomResult},
    messages::{RoomEvent, RoomMessage, RoomSummary, RoomView},
    state_machine::RoundResult,
};
use crate::game::{
    arrangement::Validation,
    entities::{Arrangement, PlayerId, SeatIndex},
};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{RwLock, mpsc, oneshot};
use uuid::Uuid;

/// Room manager for managing multiple room instances
#[derive(Clone)]
pub struct RoomManager {
    /// Active room handles
    rooms: Arc<RwLock<HashMap<RoomId, RoomHandle>>>,

    /// Next room ID
    next_room_id: Arc<RwLock<RoomId>>,
}

impl RoomManager {
    /// Create a new room manager
    pub fn new() -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            next_room_id: Arc::new(RwLock::new(1)),
        }
    }

    /// Create and spawn a new room
    ///
    /// # Arguments
    ///
    /// * `config` - Room configuration
    ///
    /// # Returns
    ///
    /// * `RoomResult<RoomId>` - Room ID, or the configuration error
    pub async fn create_room(&self, config: RoomConfig) -> RoomResult<RoomId> {
        config.validate()?;

        let mut next_id = self.next_room_id.write().await;
        let room_id = *next_id;
        *next_id += 1;
        drop(next_id);

        let (actor, handle) = RoomActor::new(room_id, config)?;

        let mut rooms = self.rooms.write().await;
        rooms.insert(room_id, handle);
        drop(rooms);

        tokio::spawn(async move {
            actor.run().await;
        });

        log::info!("Created and spawned room {}", room_id);

        Ok(room_id)
    }

    /// Get a room handle
    pub async fn get_room(&self, room_id: RoomId) -> Option<RoomHandle> {
        let rooms = self.rooms.read().await;
        rooms.get(&room_id).cloned()
    }

    /// Send a request to a room and wait for its answer
    async fn request<T>(
        &self,
        room_id: RoomId,
        message: impl FnOnce(oneshot::Sender<T>) -> RoomMessage,
    ) -> RoomResult<T> {
        let handle = self
            .get_room(room_id)
            .await
            .ok_or(RoomError::RoomNotFound(room_id))?;

        let (tx, rx) = oneshot::channel();
        handle.send(message(tx)).await?;

        rx.await.map_err(|_| RoomError::RoomClosed(room_id))
    }

    /// Take the first free seat in a room
    ///
    /// # Returns
    ///
    /// * `RoomResult<SeatIndex>` - The seat taken
    pub async fn join(&self, room_id: RoomId, player: PlayerId) -> RoomResult<SeatIndex> {
        self.request(room_id, |response| RoomMessage::Join { player, response })
            .await?
    }

    /// Give up a seat
    pub async fn leave(&self, room_id: RoomId, seat: SeatIndex) -> RoomResult<()> {
        self.request(room_id, |response| RoomMessage::Leave { seat, response })
            .await?
    }

    /// Mark a seat ready to start
    pub async fn submit_ready(&self, room_id: RoomId, seat: SeatIndex) -> RoomResult<()> {
        self.request(room_id, |response| RoomMessage::Ready { seat, response })
            .await?
    }

    /// Take back a ready flag. Rejected once the round is dealt.
    pub async fn submit_unready(&self, room_id: RoomId, seat: SeatIndex) -> RoomResult<()> {
        self.request(room_id, |response| RoomMessage::Unready { seat, response })
            .await?
    }

    /// Seat a bot that plays the suggested arrangement every round
    pub async fn add_bot(&self, room_id: RoomId) -> RoomResult<SeatIndex> {
        self.request(room_id, |response| RoomMessage::AddBot { response })
            .await?
    }

    /// Lock in an arrangement for the current round
    ///
    /// A fouled arrangement is accepted; the returned validation says so.
    /// Structurally invalid arrangements are rejected and leave the room
    /// unchanged.
    pub async fn submit_arrangement(
        &self,
        room_id: RoomId,
        seat: SeatIndex,
        arrangement: Arrangement,
    ) -> RoomResult<Validation> {
        self.request(room_id, |response| RoomMessage::SubmitArrangement {
            seat,
            arrangement,
            response,
        })
        .await?
    }

    /// Save a work-in-progress arrangement
    pub async fn save_draft(
        &self,
        room_id: RoomId,
        seat: SeatIndex,
        arrangement: Arrangement,
    ) -> RoomResult<()> {
        self.request(room_id, |response| RoomMessage::SaveDraft {
            seat,
            arrangement,
            response,
        })
        .await?
    }

    /// Report a dropped transport; fire and forget
    pub async fn disconnect(&self, room_id: RoomId, seat: SeatIndex) -> RoomResult<()> {
        let handle = self
            .get_room(room_id)
            .await
            .ok_or(RoomError::RoomNotFound(room_id))?;
        handle.send(RoomMessage::Disconnect { seat }).await
    }

    /// Report a restored transport
    pub async fn reconnect(&self, room_id: RoomId, seat: SeatIndex) -> RoomResult<()> {
        self.request(room_id, |response| RoomMessage::Reconnect { seat, response })
            .await?
    }

    /// Which seat a player holds, if any
    pub async fn find_seat(
        &self,
        room_id: RoomId,
        player: PlayerId,
    ) -> RoomResult<Option<SeatIndex>> {
        self.request(room_id, |response| RoomMessage::FindSeat { player, response })
            .await
    }

    /// Room view from a seat's point of view, or a spectator's with `None`
    pub async fn get_view(&self, room_id: RoomId, seat: Option<SeatIndex>) -> RoomResult<RoomView> {
        self.request(room_id, |response| RoomMessage::GetView { seat, response })
            .await
    }

    /// Suggested arrangement for a seat's dealt cards
    pub async fn suggest(&self, room_id: RoomId, seat: SeatIndex) -> RoomResult<Arrangement> {
        self.request(room_id, |response| RoomMessage::Suggest { seat, response })
            .await?
    }

    /// Every completed round in a room
    pub async fn history(&self, room_id: RoomId) -> RoomResult<Vec<RoundResult>> {
        self.request(room_id, |response| RoomMessage::GetHistory { response })
            .await
    }

    /// Subscribe to a room's events
    pub async fn subscribe(
        &self,
        room_id: RoomId,
        subscriber_id: Uuid,
        sender: mpsc::Sender<RoomEvent>,
    ) -> RoomResult<()> {
        let handle = self
            .get_room(room_id)
            .await
            .ok_or(RoomError::RoomNotFound(room_id))?;
        handle
            .send(RoomMessage::Subscribe {
                subscriber_id,
                sender,
            })
            .await
    }

    /// Unsubscribe from a room's events. A room that's already gone is fine.
    pub async fn unsubscribe(&self, room_id: RoomId, subscriber_id: Uuid) {
        if let Some(handle) = self.get_room(room_id).await {
            let _ = handle
                .send(RoomMessage::Unsubscribe { subscriber_id })
                .await;
        }
    }

    /// List all live rooms, ordered by ID
    pub async fn list_rooms(&self) -> Vec<RoomSummary> {
        let handles: Vec<RoomHandle> = {
            let rooms = self.rooms.read().await;
            rooms.values().cloned().collect()
        };

        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            let (tx, rx) = oneshot::channel();
            if handle
                .send(RoomMessage::GetSummary { response: tx })
                .await
                .is_err()
            {
                continue;
            }
            if let Ok(summary) = rx.await {
                summaries.push(summary);
            }
        }
        summaries.sort_by_key(|summary| summary.id);
        summaries
    }

    /// Close a room
    pub async fn close_room(&self, room_id: RoomId) -> RoomResult<()> {
        let handle = self
            .get_room(room_id)
            .await
            .ok_or(RoomError::RoomNotFound(room_id))?;

        let (tx, rx) = oneshot::channel();
        // An actor that already stopped counts as closed
        if handle.send(RoomMessage::Close { response: tx }).await.is_ok() {
            let _ = rx.await;
        }

        let mut rooms = self.rooms.write().await;
        rooms.remove(&room_id);
        drop(rooms);

        log::info!("Closed room {}", room_id);

        Ok(())
    }

    /// Drop handles of rooms whose actor has stopped
    ///
    /// # Returns
    ///
    /// * `usize` - Number of rooms reclaimed
    pub async fn reap_closed(&self) -> usize {
        let mut rooms = self.rooms.write().await;
        let before = rooms.len();
        rooms.retain(|_, handle| !handle.is_closed());
        let reaped = before - rooms.len();
        drop(rooms);

        if reaped > 0 {
            log::info!("Reclaimed {} closed rooms", reaped);
        }
        reaped
    }

    /// Get active room count
    pub async fn active_room_count(&self) -> usize {
        let rooms = self.rooms.read().await;
        rooms.len()
    }
}

impl Default for RoomManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_room_assigns_sequential_ids() {
        let manager = RoomManager::new();
        let first = manager.create_room(RoomConfig::default()).await.unwrap();
        let second = manager.create_room(RoomConfig::default()).await.unwrap();
        assert_eq!(second, first + 1);
        assert_eq!(manager.active_room_count().await, 2);
    }

    #[tokio::test]
    async fn test_rejected_config_creates_nothing() {
        let manager = RoomManager::new();
        let config = RoomConfig {
            rounds: 0,
            ..RoomConfig::default()
        };
        assert!(matches!(
            manager.create_room(config).await,
            Err(RoomError::InvalidConfig(_))
        ));
        assert_eq!(manager.active_room_count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_room() {
        let manager = RoomManager::new();
        assert_eq!(
            manager.join(404, PlayerId::new("alice")).await,
            Err(RoomError::RoomNotFound(404))
        );
    }

    #[tokio::test]
    async fn test_close_and_reap() {
        let manager = RoomManager::new();
        let room_id = manager.create_room(RoomConfig::default()).await.unwrap();
        manager.close_room(room_id).await.unwrap();
        assert!(manager.get_room(room_id).await.is_none());
        assert_eq!(manager.reap_closed().await, 0);
    }

    #[tokio::test]
    async fn test_list_rooms() {
        let manager = RoomManager::new();
        let room_id = manager
            .create_room(RoomConfig {
                name: "Lobby".to_string(),
                seats: 3,
                ..RoomConfig::default()
            })
            .await
            .unwrap();
        manager.join(room_id, PlayerId::new("alice")).await.unwrap();

        let rooms = manager.list_rooms().await;
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].name, "Lobby");
        assert_eq!(rooms[0].seats_taken, 1);
        assert_eq!(rooms[0].seats, 3);
    }
}
