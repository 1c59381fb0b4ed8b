//! # Lanefall Core
//!
//! Deterministic match simulation for the Lanefall lane card battler.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness (one seeded RNG per match)
//! - No floating-point math (uses fixed-point)
//!
//! Presentation (effects, sounds, UI) consumes the [`events::GameEvent`]s
//! each tick returns and never feeds back into the simulation except
//! through player commands.
//!
//! ## Crate Structure
//!
//! - [`economy`] - Mana pools and accrual
//! - [`entity`], [`health`] - Combat units and hit points
//! - [`registry`], [`systems`] - Entity storage and engagement resolution
//! - [`director`] - Opponent AI summon decisions
//! - [`deck`] - Draw queue and hand
//! - [`placement`], [`spells`] - Player card plays
//! - [`data`] - Authored templates and match configuration
//! - [`simulation`] - Core match loop
//! - [`replay`] - Command recording and verified playback
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod data;
pub mod deck;
pub mod director;
pub mod economy;
pub mod entity;
pub mod error;
pub mod events;
pub mod health;
pub mod math;
pub mod placement;
pub mod registry;
pub mod replay;
pub mod side;
pub mod simulation;
pub mod spells;
pub mod systems;
pub mod timer;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::data::{
        CardEffect, CardTemplate, HqPlacement, MatchConfig, SpellEffect, SummonEvent,
        TemplateRegistry, UnitTemplate,
    };
    pub use crate::deck::{Deck, DrawQueue, Hand, HandCard, DECK_SIZE};
    pub use crate::director::{Director, DirectorPhase, DirectorSettings};
    pub use crate::economy::{EconomyError, ManaPool, ManaSettings};
    pub use crate::entity::{AttackProfile, CombatEntity, EngagementState, EntitySpawnParams};
    pub use crate::error::{GameError, Result};
    pub use crate::events::{GameEvent, TickEvents};
    pub use crate::health::Health;
    pub use crate::math::{Fixed, Rect, Vec2Fixed};
    pub use crate::placement::{SummonRejection, SummonTicket};
    pub use crate::registry::{EntityId, EntityRegistry};
    pub use crate::replay::{PlayerCommand, Replay, ReplayPlayer};
    pub use crate::side::Side;
    pub use crate::simulation::Simulation;
}
