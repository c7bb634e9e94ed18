//! A live room: one session plus the channels of everyone connected to it.
//!
//! The session sits behind a mutex that is only held for the mutation itself.
//! Sockets are told something changed through a broadcast channel and each
//! builds its own personalized snapshot, so no lock is held across a send.

use crate::protocol::ServerMessage;
use crate::session::Session;
use crate::types::*;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::sync::{broadcast, Mutex, RwLock};

#[derive(Debug, Clone)]
pub enum RoomEvent {
    /// Session changed; recipients should refresh their snapshot
    StateChanged { message: Option<String> },
    /// Room closed for everyone
    Terminated { message: String },
}

pub struct Room {
    pub code: RoomCode,
    pub session: Mutex<Session>,
    /// Live channel count per player
    presence: RwLock<HashMap<PlayerId, usize>>,
    events: broadcast::Sender<RoomEvent>,
    pub dictionary_size: usize,
    pub challenge_timeout: Duration,
}

impl Room {
    pub fn new(session: Session, dictionary_size: usize, challenge_timeout: Duration) -> Self {
        let (tx, _rx) = broadcast::channel(64);
        Self {
            code: session.room_code.clone(),
            session: Mutex::new(session),
            presence: RwLock::new(HashMap::new()),
            events: tx,
            dictionary_size,
            challenge_timeout,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RoomEvent> {
        self.events.subscribe()
    }

    /// Ask every connected socket to push a fresh snapshot
    pub fn notify(&self, message: Option<String>) {
        // No receivers connected is fine
        let _ = self.events.send(RoomEvent::StateChanged { message });
    }

    pub fn terminate(&self, message: String) {
        let _ = self.events.send(RoomEvent::Terminated { message });
    }

    pub async fn connect(&self, player_id: &str) {
        *self
            .presence
            .write()
            .await
            .entry(player_id.to_string())
            .or_insert(0) += 1;
    }

    /// Drop one channel for the player. Returns whether they still have another.
    pub async fn disconnect(&self, player_id: &str) -> bool {
        let mut presence = self.presence.write().await;
        match presence.get_mut(player_id) {
            Some(count) if *count > 1 => {
                *count -= 1;
                true
            }
            Some(_) => {
                presence.remove(player_id);
                false
            }
            None => false,
        }
    }

    pub async fn connected_players(&self) -> HashSet<PlayerId> {
        self.presence.read().await.keys().cloned().collect()
    }

    /// Personalized snapshot for one recipient
    pub async fn snapshot_for(&self, player_id: &str, message: Option<String>) -> ServerMessage {
        let connected = self.connected_players().await;
        let session = self.session.lock().await;
        ServerMessage::GameState(session.snapshot_for(
            player_id,
            &connected,
            self.dictionary_size,
            message,
        ))
    }
}
