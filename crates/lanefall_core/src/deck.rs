//! Deck, draw queue and hand.
//!
//! A [`Deck`] is the fixed multiset of card types a player brings. The
//! [`DrawQueue`] deals it out as shuffled cycles: every card exactly once
//! per cycle, with a fresh shuffle when the queue runs dry. Drawn cards go
//! to the [`Hand`], whose visible slots are bounded; anything drawn past
//! capacity lands in an overflow area and drifts to the discard point.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::data::TemplateRegistry;
use crate::error::{GameError, Result};
use crate::math::{fixed_decimal, Fixed, Vec2Fixed};

/// Number of cards in every deck.
pub const DECK_SIZE: usize = 8;

/// A validated deck of card types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<String>,
}

impl Deck {
    /// Build a deck, checking its size and that every card exists.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DeckSizeMismatch`] if the deck does not hold
    /// exactly [`DECK_SIZE`] cards, or [`GameError::UnknownCard`] for a
    /// card type the registry does not know.
    pub fn new(cards: Vec<String>, templates: &TemplateRegistry) -> Result<Self> {
        if cards.len() != DECK_SIZE {
            return Err(GameError::DeckSizeMismatch {
                expected: DECK_SIZE,
                found: cards.len(),
            });
        }
        for card in &cards {
            templates.card_by_type(card)?;
        }
        Ok(Self { cards })
    }

    /// Card types in authored order.
    #[must_use]
    pub fn cards(&self) -> &[String] {
        &self.cards
    }
}

/// Shuffle-and-drain dealer over a deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawQueue {
    deck: Vec<String>,
    queue: VecDeque<String>,
    cycles: u32,
}

impl DrawQueue {
    /// Create an empty queue over a deck. The first draw shuffles.
    #[must_use]
    pub fn new(deck: &Deck) -> Self {
        Self {
            deck: deck.cards.clone(),
            queue: VecDeque::new(),
            cycles: 0,
        }
    }

    /// Draw the next card, reshuffling the full deck when the queue is empty.
    ///
    /// Returns `None` only for an empty deck.
    pub fn draw(&mut self, rng: &mut ChaCha8Rng) -> Option<String> {
        if self.queue.is_empty() {
            if self.deck.is_empty() {
                return None;
            }
            let mut order = self.deck.clone();
            order.shuffle(rng);
            self.queue = order.into();
            self.cycles += 1;
            tracing::trace!(cycle = self.cycles, "draw queue reshuffled");
        }
        self.queue.pop_front()
    }

    /// Cards left before the next reshuffle.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Number of shuffles performed so far.
    #[must_use]
    pub const fn cycles(&self) -> u32 {
        self.cycles
    }
}

/// Layout and discard behavior of the hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandSettings {
    /// Number of visible card slots.
    pub capacity: usize,
    /// Where overflow cards appear.
    #[serde(with = "fixed_decimal::vec2")]
    pub overflow_origin: Vec2Fixed,
    /// Where overflow cards are discarded.
    #[serde(with = "fixed_decimal::vec2")]
    pub discard_point: Vec2Fixed,
    /// Travel speed of overflow cards in units per second.
    #[serde(with = "fixed_decimal")]
    pub discard_speed: Fixed,
    /// Distance from the discard point at which a card is discarded.
    #[serde(with = "fixed_decimal")]
    pub discard_threshold: Fixed,
}

impl Default for HandSettings {
    fn default() -> Self {
        Self {
            capacity: 4,
            overflow_origin: Vec2Fixed::from_ints(0, -8),
            discard_point: Vec2Fixed::from_ints(6, -8),
            discard_speed: Fixed::from_num(4),
            discard_threshold: Fixed::from_num(0.25),
        }
    }
}

impl HandSettings {
    /// Check the settings for values that would stall the hand.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.capacity == 0 {
            errors.push("Hand capacity must be at least 1".to_string());
        }
        if self.discard_speed <= Fixed::ZERO {
            errors.push("Hand discard_speed must be > 0".to_string());
        }
        if self.discard_threshold < Fixed::ZERO {
            errors.push("Hand discard_threshold must be >= 0".to_string());
        }
        errors
    }
}

/// A card held by the player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandCard {
    /// Unique instance id within the match.
    pub instance: u32,
    /// Card type.
    pub card_type: String,
}

/// A card drawn past capacity, on its way to the discard point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverflowCard {
    /// The card.
    pub card: HandCard,
    /// Current position.
    pub position: Vec2Fixed,
}

/// The player's hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    settings: HandSettings,
    cards: Vec<HandCard>,
    overflow: Vec<OverflowCard>,
    next_instance: u32,
}

impl Hand {
    /// Create an empty hand.
    #[must_use]
    pub fn new(settings: HandSettings) -> Self {
        Self {
            settings,
            cards: Vec::new(),
            overflow: Vec::new(),
            next_instance: 1,
        }
    }

    /// Add a drawn card. Returns the new card and whether it overflowed.
    pub fn receive(&mut self, card_type: String) -> (HandCard, bool) {
        let card = HandCard {
            instance: self.next_instance,
            card_type,
        };
        self.next_instance += 1;

        if self.is_full() {
            self.overflow.push(OverflowCard {
                card: card.clone(),
                position: self.settings.overflow_origin,
            });
            (card, true)
        } else {
            self.cards.push(card.clone());
            (card, false)
        }
    }

    /// Remove a visible card by instance id.
    pub fn take(&mut self, instance: u32) -> Option<HandCard> {
        let index = self.cards.iter().position(|c| c.instance == instance)?;
        Some(self.cards.remove(index))
    }

    /// Find a visible card by instance id.
    #[must_use]
    pub fn get(&self, instance: u32) -> Option<&HandCard> {
        self.cards.iter().find(|c| c.instance == instance)
    }

    /// Visible cards in draw order.
    #[must_use]
    pub fn cards(&self) -> &[HandCard] {
        &self.cards
    }

    /// Cards in the overflow area.
    #[must_use]
    pub fn overflow(&self) -> &[OverflowCard] {
        &self.overflow
    }

    /// Whether every visible slot is taken.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.cards.len() >= self.settings.capacity
    }

    /// Move overflow cards toward the discard point and discard arrivals.
    pub fn advance_overflow(&mut self, delta: Fixed) -> Vec<HandCard> {
        let target = self.settings.discard_point;
        let threshold = self.settings.discard_threshold;
        let step = self.settings.discard_speed.saturating_mul(delta);

        for pending in &mut self.overflow {
            let remaining = pending.position.distance(target);
            pending.position = if step >= remaining {
                target
            } else {
                pending.position + (target - pending.position).normalize().scale(step)
            };
        }

        let (discarded, kept): (Vec<_>, Vec<_>) = self
            .overflow
            .drain(..)
            .partition(|pending| pending.position.within(target, threshold));
        self.overflow = kept;
        discarded.into_iter().map(|pending| pending.card).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rand::SeedableRng;

    use super::*;

    fn raw_deck() -> Vec<String> {
        (0..DECK_SIZE).map(|i| format!("card_{i}")).collect()
    }

    fn queue() -> DrawQueue {
        DrawQueue {
            deck: raw_deck(),
            queue: VecDeque::new(),
            cycles: 0,
        }
    }

    #[test]
    fn test_cycle_draws_each_card_once() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut draws = queue();

        let mut seen: BTreeMap<String, u32> = BTreeMap::new();
        for _ in 0..DECK_SIZE {
            *seen.entry(draws.draw(&mut rng).unwrap()).or_default() += 1;
        }
        assert_eq!(seen.len(), DECK_SIZE);
        assert!(seen.values().all(|&n| n == 1));
        assert_eq!(draws.remaining(), 0);
        assert_eq!(draws.cycles(), 1);

        draws.draw(&mut rng);
        assert_eq!(draws.cycles(), 2);
        assert_eq!(draws.remaining(), DECK_SIZE - 1);
    }

    #[test]
    fn test_hand_overflow_and_discard() {
        let mut hand = Hand::new(HandSettings {
            capacity: 2,
            ..HandSettings::default()
        });
        assert!(!hand.receive("a".to_string()).1);
        assert!(!hand.receive("b".to_string()).1);
        let (extra, overflowed) = hand.receive("c".to_string());
        assert!(overflowed);
        assert_eq!(hand.cards().len(), 2);
        assert_eq!(hand.overflow().len(), 1);

        // 6 units at 4/s: still travelling after one second.
        assert!(hand.advance_overflow(Fixed::ONE).is_empty());
        let discarded = hand.advance_overflow(Fixed::ONE);
        assert_eq!(discarded, vec![extra]);
        assert!(hand.overflow().is_empty());
    }

    #[test]
    fn test_take_frees_a_slot() {
        let mut hand = Hand::new(HandSettings {
            capacity: 1,
            ..HandSettings::default()
        });
        let (card, _) = hand.receive("a".to_string());
        assert!(hand.is_full());
        assert_eq!(hand.take(card.instance), Some(card));
        assert!(!hand.is_full());
        assert_eq!(hand.take(99), None);
    }
}
