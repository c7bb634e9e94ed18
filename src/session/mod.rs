mod challenge;
mod hand;
mod moves;
mod view;

pub use challenge::{FinishOutcome, Resolution, VoteOutcome};
pub use hand::ExchangeOutcome;
pub use moves::{auto_select, card_matches, MoveOutcome};

use crate::deck::Deck;
use crate::error::{GameError, GameResult};
use crate::kana::{effective_last_char, OPENING_KANA};
use crate::types::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Prefix of the table word written when a game starts
pub const START_MARKER: &str = "ゲーム開始_";

/// Prefix of the table word written after a hand exchange
pub const EXCHANGE_MARKER: &str = "リロード_";

/// Result of a join request
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOutcome {
    pub player_id: PlayerId,
    pub name: String,
    pub reconnected: bool,
}

/// Game state for a single room
#[derive(Debug)]
pub struct Session {
    pub room_code: RoomCode,
    pub status: SessionStatus,
    /// Players in join order
    pub players: Vec<Player>,
    pub deck: Deck,
    pub discard: Vec<Card>,
    pub current_word: String,
    /// Player IDs in rank order
    pub finished_players: Vec<PlayerId>,
    pub pending_challenge: Option<ChallengeState>,
    challenge_seq: u64,
    rng: StdRng,
}

impl Session {
    pub fn new(room_code: RoomCode) -> Self {
        Self::with_rng(room_code, StdRng::from_os_rng())
    }

    /// Session with reproducible shuffles and random picks
    pub fn with_seed(room_code: RoomCode, seed: u64) -> Self {
        Self::with_rng(room_code, StdRng::seed_from_u64(seed))
    }

    fn with_rng(room_code: RoomCode, rng: StdRng) -> Self {
        Self {
            room_code,
            status: SessionStatus::Waiting,
            players: Vec::new(),
            deck: Deck::default(),
            discard: Vec::new(),
            current_word: String::new(),
            finished_players: Vec::new(),
            pending_challenge: None,
            challenge_seq: 0,
            rng,
        }
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn player_mut(&mut self, player_id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == player_id)
    }

    fn player_index(&self, player_id: &str) -> GameResult<usize> {
        self.players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(GameError::PlayerNotFound)
    }

    /// Join as a new player, or resume an existing one when the ID is known
    pub fn join(&mut self, requested_id: Option<&str>, name: &str) -> JoinOutcome {
        if let Some(player) = requested_id.and_then(|id| self.player(id)) {
            return JoinOutcome {
                player_id: player.id.clone(),
                name: player.name.clone(),
                reconnected: true,
            };
        }

        let is_host = self.players.is_empty();
        let player = Player::new(ulid::Ulid::new().to_string(), name.to_string(), is_host);
        tracing::info!(
            "Room {}: {} joined (host: {})",
            self.room_code,
            player.name,
            is_host
        );

        let outcome = JoinOutcome {
            player_id: player.id.clone(),
            name: player.name.clone(),
            reconnected: false,
        };
        self.players.push(player);
        outcome
    }

    /// Remove a player from the lobby. Host passes to the earliest remaining joiner.
    pub fn remove_player(&mut self, player_id: &str) -> GameResult<Player> {
        if self.status != SessionStatus::Waiting {
            return Err(GameError::GameInProgress);
        }
        let idx = self.player_index(player_id)?;
        let player = self.players.remove(idx);

        if player.is_host {
            if let Some(next) = self.players.first_mut() {
                next.is_host = true;
                tracing::info!("Room {}: host passed to {}", self.room_code, next.name);
            }
        }

        Ok(player)
    }

    pub fn ensure_host(&self, player_id: &str) -> GameResult<()> {
        match self.player(player_id) {
            Some(p) if p.is_host => Ok(()),
            Some(_) => Err(GameError::NotHost),
            None => Err(GameError::PlayerNotFound),
        }
    }

    /// Deal a fresh game: new shuffled deck, full hands, random opening target
    pub fn start(&mut self) -> GameResult<()> {
        if !matches!(
            self.status,
            SessionStatus::Waiting | SessionStatus::Finished
        ) {
            return Err(GameError::GameInProgress);
        }

        let mut deck = Deck::standard();
        let needed = self.players.len() * HAND_SIZE;
        if needed > deck.len() {
            return Err(GameError::DeckShortage {
                needed,
                available: deck.len(),
            });
        }

        deck.shuffle(&mut self.rng);
        for player in self.players.iter_mut() {
            player.hand = deck.draw(HAND_SIZE)?;
            player.rank = None;
        }

        let opening: Vec<char> = OPENING_KANA.chars().collect();
        let start_char = opening[self.rng.random_range(0..opening.len())];

        self.deck = deck;
        self.discard.clear();
        self.current_word = format!("{}{}", START_MARKER, start_char);
        self.finished_players.clear();
        self.pending_challenge = None;
        self.set_status(SessionStatus::Playing);

        tracing::info!(
            "Room {}: game started with {} players, opening target {}",
            self.room_code,
            self.players.len(),
            start_char
        );
        Ok(())
    }

    fn set_status(&mut self, to: SessionStatus) {
        debug_assert!(
            self.status.can_transition_to(to),
            "invalid status transition {:?} -> {:?}",
            self.status,
            to
        );
        self.status = to;
    }

    /// Character the next word must start with
    pub fn target_char(&self) -> Option<char> {
        effective_last_char(&self.current_word)
    }

    pub fn unranked_count(&self) -> usize {
        self.players.iter().filter(|p| p.rank.is_none()).count()
    }

    /// Every card of the current game, wherever it sits
    pub fn card_total(&self) -> usize {
        let in_hands: usize = self.players.iter().map(|p| p.hand.len()).sum();
        let pending = usize::from(self.pending_challenge.is_some());
        in_hands + self.deck.len() + self.discard.len() + pending
    }
}
