//! Card definitions.

use serde::{Deserialize, Serialize};

use crate::math::{fixed_decimal, Fixed};

/// Effect of an area spell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpellEffect {
    /// Damage every opposing unit in the radius.
    Damage(u32),
    /// Heal every friendly unit in the radius.
    Heal(u32),
    /// Freeze every opposing non-HQ unit in the radius.
    Freeze {
        /// Hard-stun seconds.
        #[serde(with = "fixed_decimal")]
        shock: Fixed,
        /// Trailing seconds after the shock.
        #[serde(with = "fixed_decimal")]
        after_effect: Fixed,
    },
}

/// What playing a card does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardEffect {
    /// Summon one or more units at the placement point.
    Summon {
        /// Unit template name.
        unit: String,
        /// Number of units.
        #[serde(default = "default_count")]
        count: u32,
        /// Distance between units along Y.
        #[serde(default, with = "fixed_decimal")]
        spacing: Fixed,
    },
    /// Cast an area spell centered on the placement point.
    Spell {
        /// Radius of the area.
        #[serde(with = "fixed_decimal")]
        radius: Fixed,
        /// Effect applied to every unit hit.
        effect: SpellEffect,
    },
}

/// Most units a single summon card may place.
pub const MAX_SUMMON_COUNT: u32 = 16;

const fn default_count() -> u32 {
    1
}

/// A playable card.
///
/// # Example RON
///
/// ```ron
/// CardTemplate(
///     card_type: "archers",
///     cost: 4,
///     effect: Summon(unit: "archer", count: 2, spacing: 1.0),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardTemplate {
    /// Unique card type.
    pub card_type: String,
    /// Mana cost.
    pub cost: i32,
    /// Effect on play.
    pub effect: CardEffect,
}

impl CardTemplate {
    /// Whether this card summons units (and so must respect the placement zone).
    #[must_use]
    pub const fn is_summon(&self) -> bool {
        matches!(self.effect, CardEffect::Summon { .. })
    }

    /// Unit template referenced by a summon card.
    #[must_use]
    pub fn summoned_unit(&self) -> Option<&str> {
        match &self.effect {
            CardEffect::Summon { unit, .. } => Some(unit),
            CardEffect::Spell { .. } => None,
        }
    }

    /// Check the card for authoring mistakes that need no other data.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.cost < 0 {
            errors.push(format!("Card '{}' has negative cost", self.card_type));
        }
        match &self.effect {
            CardEffect::Summon { count, spacing, .. } => {
                if *count == 0 {
                    errors.push(format!("Card '{}' summons zero units", self.card_type));
                }
                if *count > MAX_SUMMON_COUNT {
                    errors.push(format!(
                        "Card '{}' summons {count} units (max {MAX_SUMMON_COUNT})",
                        self.card_type
                    ));
                }
                if *spacing < Fixed::ZERO {
                    errors.push(format!("Card '{}' has negative spacing", self.card_type));
                }
            }
            CardEffect::Spell { radius, effect } => {
                if *radius < Fixed::ZERO {
                    errors.push(format!("Card '{}' has negative radius", self.card_type));
                }
                if let SpellEffect::Freeze {
                    shock,
                    after_effect,
                } = effect
                {
                    if *shock < Fixed::ZERO || *after_effect < Fixed::ZERO {
                        errors.push(format!(
                            "Card '{}' has a negative freeze duration",
                            self.card_type
                        ));
                    }
                }
            }
        }
        errors
    }
}
