//! Draw pile for a single game.

use crate::error::{GameError, GameResult};
use crate::kana::{HIRAGANA, ROWS};
use crate::types::Card;
use rand::seq::SliceRandom;
use rand::Rng;

/// Length cards per required length
const LENGTH_COPIES: usize = 3;
const LENGTHS: [usize; 3] = [5, 6, 7];

/// Cards in a freshly built deck
pub const DECK_SIZE: usize = 45 + ROWS.len() + LENGTHS.len() * LENGTH_COPIES;

/// A stack of cards; the top of the pile is the end of the vector.
#[derive(Debug, Clone, Default)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Build the standard unshuffled deck
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        cards.extend(HIRAGANA.chars().map(Card::char));
        cards.extend(ROWS.iter().map(|(label, members)| Card::row(label, members)));
        for len in LENGTHS {
            for _ in 0..LENGTH_COPIES {
                cards.push(Card::length(len));
            }
        }
        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Draw exactly `count` cards, or nothing at all if the pile is too small
    pub fn draw(&mut self, count: usize) -> GameResult<Vec<Card>> {
        if count > self.cards.len() {
            return Err(GameError::DeckShortage {
                needed: count,
                available: self.cards.len(),
            });
        }
        let split = self.cards.len() - count;
        let mut drawn = self.cards.split_off(split);
        drawn.reverse();
        Ok(drawn)
    }

    /// Draw up to `count` cards, taking whatever is left when short
    pub fn draw_up_to(&mut self, count: usize) -> Vec<Card> {
        let count = count.min(self.cards.len());
        let split = self.cards.len() - count;
        let mut drawn = self.cards.split_off(split);
        drawn.reverse();
        drawn
    }

    /// Put cards back on the pile
    pub fn return_cards(&mut self, cards: impl IntoIterator<Item = Card>) {
        self.cards.extend(cards);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CardKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_standard_composition() {
        let deck = Deck::standard();
        assert_eq!(deck.len(), DECK_SIZE);
        assert_eq!(DECK_SIZE, 64);

        let count = |kind: CardKind| deck.cards.iter().filter(|c| c.kind == kind).count();
        assert_eq!(count(CardKind::Char), 45);
        assert_eq!(count(CardKind::Row), 10);
        assert_eq!(count(CardKind::Length), 9);

        let sevens = deck
            .cards
            .iter()
            .filter(|c| c.kind == CardKind::Length && c.value == "7")
            .count();
        assert_eq!(sevens, 3);
    }

    #[test]
    fn test_draw_fails_without_partial_draw() {
        let mut deck = Deck::standard();
        let result = deck.draw(DECK_SIZE + 1);

        assert_eq!(
            result,
            Err(GameError::DeckShortage {
                needed: DECK_SIZE + 1,
                available: DECK_SIZE
            })
        );
        assert_eq!(deck.len(), DECK_SIZE);
    }

    #[test]
    fn test_draw_takes_from_top() {
        let mut deck = Deck::default();
        deck.return_cards(vec![Card::char('あ'), Card::char('い'), Card::char('う')]);

        let drawn = deck.draw(2).unwrap();
        assert_eq!(drawn, vec![Card::char('う'), Card::char('い')]);
        assert_eq!(deck.len(), 1);
    }

    #[test]
    fn test_draw_up_to_caps_at_available() {
        let mut deck = Deck::default();
        deck.return_cards(vec![Card::char('あ'), Card::char('い')]);

        let drawn = deck.draw_up_to(5);
        assert_eq!(drawn.len(), 2);
        assert!(deck.is_empty());
    }

    #[test]
    fn test_shuffle_keeps_cards() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut deck = Deck::standard();
        deck.shuffle(&mut rng);

        assert_eq!(deck.len(), DECK_SIZE);
        let chars = deck.cards.iter().filter(|c| c.kind == CardKind::Char).count();
        assert_eq!(chars, 45);
    }
}
