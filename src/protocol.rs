use crate::error::GameError;
use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Host only
    StartGame,
    PlayWord {
        word: String,
        /// None lets the server pick a card
        #[serde(default)]
        card_index: Option<usize>,
    },
    Approve,
    Reject,
    Exchange {
        card_index: usize,
    },
    Reroll,
    SetPriority {
        priority: Vec<CardKind>,
    },
    ViewHand {
        target_id: PlayerId,
    },
    /// Leave the lobby before the game starts
    Leave,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        player_id: PlayerId,
        room_code: RoomCode,
        reconnected: bool,
        server_now: String,
    },
    /// Full room snapshot, personalized for the recipient
    GameState(GameStateView),
    ViewHand {
        target_id: PlayerId,
        target_name: String,
        hand: Vec<Card>,
    },
    /// Request refused; only ever sent to the requester
    Rejected {
        valid: bool,
        reason_code: String,
        message: String,
    },
    /// Room torn down (host left)
    ReturnToTitle {
        message: String,
    },
    Error {
        code: String,
        msg: String,
    },
}

impl From<GameError> for ServerMessage {
    fn from(err: GameError) -> Self {
        ServerMessage::Rejected {
            valid: false,
            reason_code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Public per-player summary (hand contents stay private)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerSummary {
    pub player_id: PlayerId,
    pub name: String,
    pub hand_count: usize,
    pub is_host: bool,
    pub rank: Option<u32>,
    pub is_connected: bool,
}

/// Snapshot pushed after every accepted mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStateView {
    // Shared portion
    pub room_code: RoomCode,
    pub status: SessionStatus,
    pub current_word: String,
    pub target_char: Option<char>,
    pub deck_count: usize,
    pub discard_count: usize,
    pub dictionary_size: usize,
    pub message: Option<String>,
    pub game_over: bool,
    /// Name of the rank 1 player
    pub winner: Option<String>,
    /// Ranked players in rank order
    pub ranks: Vec<PlayerSummary>,
    pub approval_votes: usize,
    pub rejection_votes: usize,
    pub active_players: usize,
    pub active_voting_players: usize,
    pub finishing_player_id: Option<PlayerId>,
    pub players_info: Vec<PlayerSummary>,

    // Recipient-only portion
    pub my_player_id: PlayerId,
    pub my_hand: Vec<Card>,
    pub is_host: bool,
    pub my_priority: [CardKind; 3],
    pub has_voted: bool,
}
