//! Notifications emitted by the simulation.
//!
//! The presentation layer (effects, sounds, UI) consumes these after each
//! tick. The core never waits on them.

use serde::{Deserialize, Serialize};

use crate::math::Vec2Fixed;
use crate::placement::{SummonRejection, SummonTicket};
use crate::registry::EntityId;
use crate::side::Side;

/// A single notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// An entity acquired (`Some`) or lost (`None`) its target.
    EnemyDetected {
        /// The observing entity.
        entity: EntityId,
        /// The detected opponent, or `None` when detection was lost.
        target: Option<EntityId>,
    },
    /// An entity's target entered (`Some`) or left (`None`) attack range.
    EnemyInRange {
        /// The attacking entity.
        entity: EntityId,
        /// The target now in range, or `None`.
        target: Option<EntityId>,
    },
    /// An attack swing fired.
    AttackFired {
        /// Attacker.
        attacker: EntityId,
        /// Target.
        target: EntityId,
    },
    /// Damage landed at a position.
    DamageApplied {
        /// Entity that took the damage.
        target: EntityId,
        /// Hit points removed.
        amount: u32,
        /// Where the damage landed.
        position: Vec2Fixed,
    },
    /// Hit points restored.
    Healed {
        /// Entity that was healed.
        target: EntityId,
        /// Hit points restored.
        amount: u32,
    },
    /// An entity's health reached zero.
    Death {
        /// The entity that died.
        entity: EntityId,
    },
    /// An entity joined the registry.
    Spawned {
        /// New entity id.
        entity: EntityId,
        /// Its side.
        side: Side,
        /// Template it was built from.
        template: String,
        /// Spawn position.
        position: Vec2Fixed,
    },
    /// An entity left the registry.
    Despawned {
        /// Removed entity id.
        entity: EntityId,
    },
    /// An entity was frozen.
    Frozen {
        /// The frozen entity.
        entity: EntityId,
    },
    /// An entity's freeze ended.
    Unfrozen {
        /// The thawed entity.
        entity: EntityId,
    },
    /// Mana was spent.
    ManaSpent {
        /// Spending side.
        side: Side,
        /// Amount spent.
        amount: i32,
    },
    /// A player summon resolved.
    SummonResolved {
        /// Ticket of the resolved summon.
        ticket: SummonTicket,
        /// Card that was played.
        card_type: String,
    },
    /// A player summon was rejected at resolution time.
    SummonRejected {
        /// Ticket of the rejected summon.
        ticket: SummonTicket,
        /// Why it was rejected.
        reason: SummonRejection,
    },
    /// The opponent chose its next summon event.
    SummonEventChosen {
        /// Event name.
        name: String,
        /// Mana the event will cost.
        cost: i32,
    },
    /// A card entered the hand or the overflow area.
    CardDrawn {
        /// Hand instance id.
        instance: u32,
        /// Card type.
        card_type: String,
        /// True if it went straight to overflow.
        overflow: bool,
    },
    /// An overflow card reached the discard point.
    CardDiscarded {
        /// Hand instance id.
        instance: u32,
        /// Card type.
        card_type: String,
    },
    /// An HQ fell and the match is decided.
    MatchOver {
        /// Winning side.
        winner: Side,
    },
}

/// Events generated during a simulation tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickEvents {
    /// Events in the order they happened.
    pub events: Vec<GameEvent>,
}

impl TickEvents {
    /// Record an event.
    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Whether nothing happened this tick.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Entities that died this tick.
    #[must_use]
    pub fn deaths(&self) -> Vec<EntityId> {
        self.events
            .iter()
            .filter_map(|event| match event {
                GameEvent::Death { entity } => Some(*entity),
                _ => None,
            })
            .collect()
    }

    /// Entities that joined the registry this tick.
    #[must_use]
    pub fn spawned(&self) -> Vec<EntityId> {
        self.events
            .iter()
            .filter_map(|event| match event {
                GameEvent::Spawned { entity, .. } => Some(*entity),
                _ => None,
            })
            .collect()
    }

    /// Total damage dealt to `target` this tick.
    #[must_use]
    pub fn damage_to(&self, target: EntityId) -> u32 {
        self.events
            .iter()
            .map(|event| match event {
                GameEvent::DamageApplied {
                    target: hit,
                    amount,
                    ..
                } if *hit == target => *amount,
                _ => 0,
            })
            .sum()
    }
}

impl IntoIterator for TickEvents {
    type Item = GameEvent;
    type IntoIter = std::vec::IntoIter<GameEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}
