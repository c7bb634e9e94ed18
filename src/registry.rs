use crate::dictionary::Dictionary;
use crate::room::Room;
use crate::session::Session;
use crate::types::RoomCode;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Generate a random 4-digit room code
fn generate_room_code() -> RoomCode {
    rand::rng().random_range(1000..=9999).to_string()
}

/// Owns every open room, keyed by room code
pub struct RoomRegistry {
    rooms: RwLock<HashMap<RoomCode, Arc<Room>>>,
    dictionary: Arc<Dictionary>,
    challenge_timeout: Duration,
}

impl RoomRegistry {
    pub fn new(dictionary: Arc<Dictionary>, challenge_timeout: Duration) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            dictionary,
            challenge_timeout,
        }
    }

    /// Open a room with a fresh waiting session under an unused code
    pub async fn create_room(&self) -> Arc<Room> {
        let mut rooms = self.rooms.write().await;
        let code = loop {
            let code = generate_room_code();
            if !rooms.contains_key(&code) {
                break code;
            }
        };

        let room = Arc::new(Room::new(
            Session::new(code.clone()),
            self.dictionary.len(),
            self.challenge_timeout,
        ));
        rooms.insert(code.clone(), room.clone());
        tracing::info!("Created room {}", code);
        room
    }

    pub async fn get(&self, code: &str) -> Option<Arc<Room>> {
        self.rooms.read().await.get(code).cloned()
    }

    /// Tear down a room
    pub async fn remove(&self, code: &str) -> Option<Arc<Room>> {
        let removed = self.rooms.write().await.remove(code);
        if removed.is_some() {
            tracing::info!("Closed room {}", code);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rooms.read().await.is_empty()
    }
}
