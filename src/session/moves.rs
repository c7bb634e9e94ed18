use super::Session;
use crate::error::{GameError, GameResult};
use crate::kana::{effective_last_char, normalize, same_kana, LONG_VOWEL, MORAIC_N};
use crate::types::*;

/// What an accepted move did to the table
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// Card discarded, game continues
    Played { word: String, card: Card },
    /// The move emptied the hand and opened a challenge
    FinishingCheck {
        word: String,
        card: Card,
        challenge_id: u64,
    },
}

/// Check a card's constraint against a word, with a specific rejection
fn check_card(card: &Card, word: &str) -> GameResult<()> {
    let Some(trailing) = effective_last_char(word) else {
        return Err(GameError::EmptyWord);
    };

    match card.kind {
        CardKind::Char => {
            let matches = card
                .value
                .chars()
                .next()
                .is_some_and(|v| same_kana(trailing, v));
            if matches {
                Ok(())
            } else {
                Err(GameError::CharMismatch(card.value.clone()))
            }
        }
        CardKind::Row => {
            let trailing = normalize(trailing);
            if card.value.chars().any(|m| m == trailing) {
                Ok(())
            } else {
                Err(GameError::RowMismatch(card.display.clone()))
            }
        }
        CardKind::Length => {
            let len = word.chars().count();
            let required: usize = card
                .value
                .parse()
                .map_err(|_| GameError::LengthMismatch(card.display.clone()))?;
            let ok = if required >= 7 {
                len >= 7
            } else {
                len == required
            };
            if ok {
                Ok(())
            } else {
                Err(GameError::LengthMismatch(card.display.clone()))
            }
        }
    }
}

/// Whether a card's constraint is satisfied by a word
pub fn card_matches(card: &Card, word: &str) -> bool {
    check_card(card, word).is_ok()
}

/// Pick the card a word should consume.
///
/// Walks card kinds in priority order and returns the lowest hand index of the
/// first kind with any match.
pub fn auto_select(hand: &[Card], priority: &[CardKind; 3], word: &str) -> Option<usize> {
    let word = word.trim();
    if word.is_empty() {
        return None;
    }

    priority.iter().find_map(|kind| {
        hand.iter()
            .position(|card| card.kind == *kind && card_matches(card, word))
    })
}

impl Session {
    /// Run the move preconditions without touching state. Returns the trimmed word.
    pub fn validate_move(
        &self,
        player_id: &str,
        word: &str,
        card_index: usize,
    ) -> GameResult<String> {
        if self.status != SessionStatus::Playing {
            return Err(GameError::NotPlaying);
        }

        let player = self.player(player_id).ok_or(GameError::PlayerNotFound)?;
        if player.rank.is_some() {
            return Err(GameError::AlreadyFinished);
        }
        let card = player
            .hand
            .get(card_index)
            .ok_or(GameError::InvalidCardIndex)?;

        let word = word.trim();
        let first = word.chars().next().ok_or(GameError::EmptyWord)?;

        let mut tail = word.chars().rev();
        if tail.next() == Some(LONG_VOWEL) && tail.next() == Some(LONG_VOWEL) {
            return Err(GameError::DoubleLongVowel);
        }

        if let Some(target) = self.target_char() {
            if !same_kana(first, target) {
                return Err(GameError::WrongStart(target));
            }
        }

        if word.ends_with(MORAIC_N) {
            return Err(GameError::EndsWithN);
        }

        let min_len = if player.hand.len() == 1 { 4 } else { 3 };
        if word.chars().count() < min_len {
            return Err(GameError::TooShort(min_len));
        }

        check_card(card, word)?;
        Ok(word.to_string())
    }

    /// Validate and apply a move. A move that empties the hand opens a challenge
    /// instead of ranking the player.
    pub fn check_move(
        &mut self,
        player_id: &str,
        word: &str,
        card_index: usize,
    ) -> GameResult<MoveOutcome> {
        let word = self.validate_move(player_id, word, card_index)?;

        let idx = self.player_index(player_id)?;
        let card = self.players[idx].hand.remove(card_index);
        let previous_word = std::mem::replace(&mut self.current_word, word.clone());

        if self.players[idx].hand.is_empty() {
            let challenge_id = self.open_challenge(player_id, previous_word, card.clone());
            return Ok(MoveOutcome::FinishingCheck {
                word,
                card,
                challenge_id,
            });
        }

        self.discard.push(card.clone());
        Ok(MoveOutcome::Played { word, card })
    }

    /// Index of the card auto-select would play for this word
    pub fn auto_select_card(&self, player_id: &str, word: &str) -> Option<usize> {
        let player = self.player(player_id)?;
        auto_select(&player.hand, &player.card_priority, word)
    }

    /// Play a word with an explicit card, or let auto-select pick one
    pub fn play_word(
        &mut self,
        player_id: &str,
        word: &str,
        card_index: Option<usize>,
    ) -> GameResult<MoveOutcome> {
        let card_index = match card_index {
            Some(i) => i,
            None => {
                if self.status != SessionStatus::Playing {
                    return Err(GameError::NotPlaying);
                }
                let player = self.player(player_id).ok_or(GameError::PlayerNotFound)?;
                if player.rank.is_some() {
                    return Err(GameError::AlreadyFinished);
                }
                self.auto_select_card(player_id, word)
                    .ok_or(GameError::NoMatchingCard)?
            }
        };
        self.check_move(player_id, word, card_index)
    }
}
