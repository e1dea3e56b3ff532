use rand::seq::SliceRandom;
use std::collections::VecDeque;

use super::card::{ATTRIBUTE_VALUES, Card};

/// Total number of cards in a deck (3^4 attribute combinations).
pub const DECK_SIZE: usize = 81;

/// Cards waiting to be drawn, consumed front to back.
#[derive(Clone, Debug, Default)]
pub struct Deck {
    cards: VecDeque<Card>,
}

impl Deck {
    /// Every attribute combination, in attribute order.
    #[must_use]
    pub fn ordered() -> Self {
        let mut cards = VecDeque::with_capacity(DECK_SIZE);
        for color in 0..ATTRIBUTE_VALUES {
            for shape in 0..ATTRIBUTE_VALUES {
                for fill in 0..ATTRIBUTE_VALUES {
                    for number in 0..ATTRIBUTE_VALUES {
                        if let Ok(card) = Card::new(color, shape, fill, number) {
                            cards.push_back(card);
                        }
                    }
                }
            }
        }
        Self { cards }
    }

    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop_front()
    }

    /// Remaining cards in draw order.
    pub fn cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.cards.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl From<Vec<Card>> for Deck {
    fn from(cards: Vec<Card>) -> Self {
        Self {
            cards: cards.into(),
        }
    }
}

/// Source of a fresh deck at the start of every round.
pub trait DeckBuilder: Send + Sync {
    fn build(&self) -> Deck;
}

/// Uniformly shuffled full deck.
#[derive(Clone, Copy, Debug, Default)]
pub struct ShuffledDeckBuilder;

impl DeckBuilder for ShuffledDeckBuilder {
    fn build(&self) -> Deck {
        let mut cards: Vec<Card> = Deck::ordered().cards.into();
        cards.shuffle(&mut rand::rng());
        cards.into()
    }
}

/// Always deals the same sequence. Useful for tests and for replaying a
/// recorded game.
#[derive(Clone, Debug)]
pub struct FixedDeckBuilder {
    cards: Vec<Card>,
}

impl FixedDeckBuilder {
    #[must_use]
    pub fn new(cards: Vec<Card>) -> Self {
        Self { cards }
    }
}

impl DeckBuilder for FixedDeckBuilder {
    fn build(&self) -> Deck {
        self.cards.clone().into()
    }
}
