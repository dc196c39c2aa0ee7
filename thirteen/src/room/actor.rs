//! Room actor implementation with async message handling.

use super::{
    config::RoomConfig,
    errors::{RoomError, RoomId, RoomResult},
    messages::{RoomEvent, RoomMessage},
    state_machine::Room,
};
use std::collections::HashMap;
use tokio::{
    sync::mpsc,
    time::{Duration, Instant, MissedTickBehavior, interval},
};
use uuid::Uuid;

/// How often deadlines are re-checked.
pub const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Inbox capacity per room.
const INBOX_CAPACITY: usize = 100;

/// Room actor handle for sending messages
#[derive(Clone, Debug)]
pub struct RoomHandle {
    sender: mpsc::Sender<RoomMessage>,
    room_id: RoomId,
}

impl RoomHandle {
    /// Create a new room handle
    pub fn new(sender: mpsc::Sender<RoomMessage>, room_id: RoomId) -> Self {
        Self { sender, room_id }
    }

    /// Get room ID
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Whether the actor behind this handle has stopped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Send a message to the room
    pub async fn send(&self, message: RoomMessage) -> RoomResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| RoomError::RoomClosed(self.room_id))
    }
}

/// Room actor owning a single room
pub struct RoomActor {
    /// Room ID
    id: RoomId,

    /// Room state machine
    room: Room,

    /// Message inbox
    inbox: mpsc::Receiver<RoomMessage>,

    /// Event subscribers (WebSocket sessions)
    subscribers: HashMap<Uuid, mpsc::Sender<RoomEvent>>,

    /// Is room closed
    is_closed: bool,
}

impl RoomActor {
    /// Create a new room actor
    ///
    /// # Arguments
    ///
    /// * `id` - Room ID
    /// * `config` - Room configuration
    ///
    /// # Returns
    ///
    /// * `(RoomActor, RoomHandle)` - Actor and handle for sending messages,
    ///   or the configuration error
    pub fn new(id: RoomId, config: RoomConfig) -> RoomResult<(Self, RoomHandle)> {
        let room = Room::new(id, config)?;
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);

        let actor = Self {
            id,
            room,
            inbox,
            subscribers: HashMap::new(),
            is_closed: false,
        };

        Ok((actor, RoomHandle::new(sender, id)))
    }

    /// Run the room actor event loop
    pub async fn run(mut self) {
        log::info!("Room {} '{}' starting", self.id, self.room.config().name);

        let mut tick_interval = interval(TICK_INTERVAL);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                message = self.inbox.recv() => {
                    let Some(message) = message else {
                        log::debug!("Room {}: every handle dropped", self.id);
                        break;
                    };
                    self.handle_message(message);
                }

                _ = tick_interval.tick() => {}
            }

            let now = Instant::now();
            self.room.settle(now);
            self.publish_events();

            if self.is_closed {
                break;
            }
            if self.room.is_reclaimable(now) {
                log::info!("Room {}: retention window over, reclaiming", self.id);
                break;
            }
            if self.room.is_abandoned() {
                log::info!("Room {}: every player left, closing", self.id);
                break;
            }
        }

        log::info!("Room {} '{}' closed", self.id, self.room.config().name);
    }

    /// Handle a room message
    fn handle_message(&mut self, message: RoomMessage) {
        let now = Instant::now();
        match message {
            RoomMessage::Join { player, response } => {
                let result = self.room.join(player, now);
                let _ = response.send(result);
            }

            RoomMessage::Leave { seat, response } => {
                let result = self.room.leave(seat, now);
                let _ = response.send(result);
            }

            RoomMessage::Ready { seat, response } => {
                let result = self.room.set_ready(seat);
                let _ = response.send(result);
            }

            RoomMessage::Unready { seat, response } => {
                let result = self.room.set_unready(seat);
                let _ = response.send(result);
            }

            RoomMessage::AddBot { response } => {
                let result = self.room.add_bot(now);
                let _ = response.send(result);
            }

            RoomMessage::SubmitArrangement {
                seat,
                arrangement,
                response,
            } => {
                let result = self.room.submit_arrangement(seat, arrangement);
                let _ = response.send(result);
            }

            RoomMessage::SaveDraft {
                seat,
                arrangement,
                response,
            } => {
                let result = self.room.save_draft(seat, arrangement);
                let _ = response.send(result);
            }

            RoomMessage::Disconnect { seat } => {
                if let Err(e) = self.room.disconnect(seat) {
                    log::debug!("Room {}: disconnect ignored: {}", self.id, e);
                }
            }

            RoomMessage::Reconnect { seat, response } => {
                let result = self.room.reconnect(seat);
                let _ = response.send(result);
            }

            RoomMessage::FindSeat { player, response } => {
                let _ = response.send(self.room.seat_of(&player));
            }

            RoomMessage::GetView { seat, response } => {
                let _ = response.send(self.room.view(seat, now));
            }

            RoomMessage::GetSummary { response } => {
                let _ = response.send(self.room.summary());
            }

            RoomMessage::Suggest { seat, response } => {
                let result = self.room.suggest(seat);
                let _ = response.send(result);
            }

            RoomMessage::GetHistory { response } => {
                let _ = response.send(self.room.history().to_vec());
            }

            RoomMessage::Close { response } => {
                self.is_closed = true;
                let _ = response.send(());
            }

            RoomMessage::Subscribe {
                subscriber_id,
                sender,
            } => {
                self.subscribers.insert(subscriber_id, sender);
                log::debug!(
                    "Subscriber {} attached to room {}",
                    subscriber_id,
                    self.id
                );
            }

            RoomMessage::Unsubscribe { subscriber_id } => {
                self.subscribers.remove(&subscriber_id);
                log::debug!(
                    "Subscriber {} detached from room {}",
                    subscriber_id,
                    self.id
                );
            }
        }
    }

    /// Broadcast pending room events to all subscribers
    fn publish_events(&mut self) {
        let events = self.room.drain_events();
        if events.is_empty() {
            return;
        }
        for event in events {
            self.subscribers
                .retain(|subscriber_id, sender| match sender.try_send(event.clone()) {
                    Ok(()) => true,
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        log::warn!(
                            "Subscriber {} channel full, dropping event",
                            subscriber_id
                        );
                        true
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        log::debug!("Subscriber {} disconnected, removing", subscriber_id);
                        false
                    }
                });
        }
    }
}
