//! Authored match data.
//!
//! Pure data structures for units, cards, opponent summon events and the
//! match configuration that bundles them. Everything deserializes from
//! RON with decimal fixed-point values.
//!
//! **Note:** This module contains no IO. Reading files is left to the
//! caller (see `lanefall_tools`).

mod card_data;
mod match_data;
mod summon_data;
mod template_registry;
mod unit_data;

pub use card_data::{CardEffect, CardTemplate, SpellEffect, MAX_SUMMON_COUNT};
pub use match_data::{HqPlacement, MatchConfig};
pub use summon_data::{SummonEvent, ENRAGE_MAX};
pub use template_registry::TemplateRegistry;
pub use unit_data::{AttackData, UnitTemplate};
