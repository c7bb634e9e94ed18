use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Opaque ID types for readability
pub type PlayerId = String;
pub type RoomCode = String;

/// Cards dealt to each player at game start
pub const HAND_SIZE: usize = 7;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Waiting,
    Playing,
    FinishingCheck,
    Finished,
}

impl SessionStatus {
    /// Check if a status transition is valid
    pub fn can_transition_to(self, to: SessionStatus) -> bool {
        use SessionStatus::*;

        matches!(
            (self, to),
            (Waiting, Playing)
                | (Finished, Playing)
                | (Playing, FinishingCheck)
                | (FinishingCheck, Playing)
                | (FinishingCheck, Finished)
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    Char,
    Row,
    Length,
}

/// Default order in which auto-select looks at card kinds
pub const DEFAULT_PRIORITY: [CardKind; 3] = [CardKind::Char, CardKind::Row, CardKind::Length];

/// A hand card. `value` is the matched kana, the row's kana string, or the
/// required word length (7 meaning "7 or more").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    #[serde(rename = "type")]
    pub kind: CardKind,
    pub value: String,
    pub display: String,
}

impl Card {
    pub fn char(c: char) -> Self {
        Self {
            kind: CardKind::Char,
            value: c.to_string(),
            display: c.to_string(),
        }
    }

    pub fn row(label: &str, members: &str) -> Self {
        Self {
            kind: CardKind::Row,
            value: members.to_string(),
            display: label.to_string(),
        }
    }

    pub fn length(len: usize) -> Self {
        let display = if len < 7 {
            format!("{}文字", len)
        } else {
            "7文字以上".to_string()
        };
        Self {
            kind: CardKind::Length,
            value: len.to_string(),
            display,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub hand: Vec<Card>,
    pub is_host: bool,
    pub card_priority: [CardKind; 3],
    pub rank: Option<u32>,
}

impl Player {
    pub fn new(id: PlayerId, name: String, is_host: bool) -> Self {
        Self {
            id,
            name,
            hand: Vec::new(),
            is_host,
            card_priority: DEFAULT_PRIORITY,
            rank: None,
        }
    }
}

/// Pending challenge opened by a hand-emptying move
#[derive(Debug, Clone)]
pub struct ChallengeState {
    /// Serial number, so a stale timer cannot resolve a later challenge
    pub id: u64,
    pub finishing_player_id: PlayerId,
    pub previous_word: String,
    pub returned_card: Card,
    pub previous_rank: Option<u32>,
    pub approvals: HashSet<PlayerId>,
    pub rejections: HashSet<PlayerId>,
}

impl ChallengeState {
    pub fn has_voted(&self, voter_id: &str) -> bool {
        self.approvals.contains(voter_id) || self.rejections.contains(voter_id)
    }

    pub fn total_votes(&self) -> usize {
        self.approvals.len() + self.rejections.len()
    }

    /// Approve wins ties
    pub fn approval_carries(&self) -> bool {
        self.approvals.len() * 2 >= self.total_votes()
    }
}
