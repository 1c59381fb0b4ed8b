//! Player placement boundary.
//!
//! Player input arrives as summon submissions: a card from the hand and a
//! point on the field. Submissions are validated immediately and queued;
//! they resolve (spend, spawn or cast) at the next tick, before the spawn
//! safe point. A queued submission can be cancelled until then.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::Vec2Fixed;

/// Handle for a queued summon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SummonTicket(pub u32);

/// Why a summon was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum SummonRejection {
    /// The pool cannot cover the card's cost.
    #[error("Insufficient mana: need {required}, have {available}")]
    InsufficientMana {
        /// Card cost.
        required: i32,
        /// Balance at the time of the check.
        available: i32,
    },
    /// A unit card was placed outside the player's zone.
    #[error("Placement is outside the player zone")]
    OutsidePlacementZone,
    /// The card instance is not in the visible hand.
    #[error("Card {0} is not in hand")]
    CardNotInHand(u32),
    /// The card instance is already waiting to resolve.
    #[error("Card {0} is already being played")]
    CardAlreadyPending(u32),
    /// The card type has no template.
    #[error("Unknown card type: {0}")]
    UnknownCard(String),
    /// No queued summon has this ticket.
    #[error("Unknown summon ticket {0:?}")]
    UnknownTicket(SummonTicket),
    /// The match has already been decided.
    #[error("The match is over")]
    MatchOver,
}

/// A validated summon waiting for the next tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSummon {
    /// Ticket returned to the caller.
    pub ticket: SummonTicket,
    /// Hand instance being played.
    pub instance: u32,
    /// Card type being played.
    pub card_type: String,
    /// Target point.
    pub point: Vec2Fixed,
}

/// Queue of submitted summons in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementQueue {
    pending: Vec<PendingSummon>,
    next_ticket: u32,
}

impl PlacementQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a summon and hand out its ticket.
    pub fn submit(&mut self, instance: u32, card_type: String, point: Vec2Fixed) -> SummonTicket {
        self.next_ticket += 1;
        let ticket = SummonTicket(self.next_ticket);
        self.pending.push(PendingSummon {
            ticket,
            instance,
            card_type,
            point,
        });
        ticket
    }

    /// Withdraw a queued summon. Nothing was spent, so nothing is refunded.
    ///
    /// # Errors
    ///
    /// Returns [`SummonRejection::UnknownTicket`] if the ticket already
    /// resolved or never existed.
    pub fn cancel(&mut self, ticket: SummonTicket) -> Result<PendingSummon, SummonRejection> {
        let index = self
            .pending
            .iter()
            .position(|p| p.ticket == ticket)
            .ok_or(SummonRejection::UnknownTicket(ticket))?;
        Ok(self.pending.remove(index))
    }

    /// Whether a hand instance already has a queued summon.
    #[must_use]
    pub fn is_pending(&self, instance: u32) -> bool {
        self.pending.iter().any(|p| p.instance == instance)
    }

    /// Queued summons in submission order.
    #[must_use]
    pub fn pending(&self) -> &[PendingSummon] {
        &self.pending
    }

    /// Take every queued summon for resolution.
    pub fn drain(&mut self) -> Vec<PendingSummon> {
        std::mem::take(&mut self.pending)
    }
}
