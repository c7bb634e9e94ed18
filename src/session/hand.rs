use super::{Session, EXCHANGE_MARKER};
use crate::error::{GameError, GameResult};
use crate::types::*;
use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeOutcome {
    pub exchanged: Card,
    /// New target character, if it changed
    pub target: Option<char>,
    pub hand_size: usize,
}

impl Session {
    fn playing_player_index(&self, player_id: &str) -> GameResult<usize> {
        if self.status != SessionStatus::Playing {
            return Err(GameError::NotPlaying);
        }
        let idx = self.player_index(player_id)?;
        if self.players[idx].rank.is_some() {
            return Err(GameError::AlreadyFinished);
        }
        Ok(idx)
    }

    /// Trade one card for a fresh hand and reset the table target from it.
    ///
    /// The chosen card is discarded; the rest of the hand is shuffled back into
    /// the deck and the player draws one more card than they held, or whatever
    /// the deck has left.
    pub fn exchange(&mut self, player_id: &str, card_index: usize) -> GameResult<ExchangeOutcome> {
        let idx = self.playing_player_index(player_id)?;
        if card_index >= self.players[idx].hand.len() {
            return Err(GameError::InvalidCardIndex);
        }
        // Trading the last card away needs at least one card to draw back
        if self.players[idx].hand.len() == 1 && self.deck.is_empty() {
            return Err(GameError::DeckEmpty);
        }

        let current_target = self.target_char();
        let player = &mut self.players[idx];
        let original_size = player.hand.len();
        let card = player.hand.remove(card_index);

        let target = match card.kind {
            CardKind::Char => card.value.chars().next(),
            CardKind::Row => {
                let members: Vec<char> = card.value.chars().collect();
                if members.is_empty() {
                    current_target
                } else {
                    Some(members[self.rng.random_range(0..members.len())])
                }
            }
            CardKind::Length => current_target,
        };

        self.deck.return_cards(player.hand.drain(..));
        self.deck.shuffle(&mut self.rng);
        player.hand = self.deck.draw_up_to(original_size + 1);
        let hand_size = player.hand.len();

        self.discard.push(card.clone());
        if let Some(t) = target {
            self.current_word = format!("{}{}", EXCHANGE_MARKER, t);
        }

        tracing::info!(
            "Room {}: {} exchanged {} (target {:?}, hand {})",
            self.room_code,
            player_id,
            card.display,
            target,
            hand_size
        );

        Ok(ExchangeOutcome {
            exchanged: card,
            target,
            hand_size,
        })
    }

    /// Shuffle the hand back into the deck and draw one card more.
    ///
    /// Refused, without side effects, when the deck cannot cover the new hand.
    pub fn reroll(&mut self, player_id: &str) -> GameResult<usize> {
        let idx = self.playing_player_index(player_id)?;
        if self.deck.is_empty() {
            return Err(GameError::DeckEmpty);
        }

        let new_size = self.players[idx].hand.len() + 1;
        if self.deck.len() < new_size {
            return Err(GameError::DeckShortage {
                needed: new_size,
                available: self.deck.len(),
            });
        }

        let player = &mut self.players[idx];
        self.deck.return_cards(player.hand.drain(..));
        self.deck.shuffle(&mut self.rng);
        player.hand = self.deck.draw(new_size)?;

        tracing::info!(
            "Room {}: {} rerolled to {} cards",
            self.room_code,
            player_id,
            new_size
        );
        Ok(new_size)
    }

    /// Set the order auto-select tries card kinds in. Must name each kind once.
    pub fn set_priority(&mut self, player_id: &str, priority: &[CardKind]) -> GameResult<()> {
        let order: [CardKind; 3] = priority
            .try_into()
            .map_err(|_| GameError::InvalidPriority)?;
        let complete = [CardKind::Char, CardKind::Row, CardKind::Length]
            .iter()
            .all(|kind| order.contains(kind));
        if !complete {
            return Err(GameError::InvalidPriority);
        }

        let player = self.player_mut(player_id).ok_or(GameError::PlayerNotFound)?;
        player.card_priority = order;
        Ok(())
    }

    /// Name and hand of another player
    pub fn opponent_hand(&self, target_id: &str) -> GameResult<(String, Vec<Card>)> {
        let target = self.player(target_id).ok_or(GameError::PlayerNotFound)?;
        Ok((target.name.clone(), target.hand.clone()))
    }
}
