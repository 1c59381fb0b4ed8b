//! Unit templates for data-driven unit definitions.

use serde::{Deserialize, Serialize};

use crate::entity::{AttackProfile, EntitySpawnParams};
use crate::health::Health;
use crate::math::{fixed_decimal, Fixed, Rect, Vec2Fixed};
use crate::side::Side;

/// Attack statistics for a unit template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackData {
    /// Radius within which opponents are noticed.
    #[serde(with = "fixed_decimal")]
    pub detection_range: Fixed,
    /// Radius within which the target can be hit.
    #[serde(with = "fixed_decimal")]
    pub attack_range: Fixed,
    /// Damage per hit.
    pub damage: u32,
    /// Seconds between hits.
    #[serde(with = "fixed_decimal")]
    pub attack_delay: Fixed,
}

impl From<AttackData> for AttackProfile {
    fn from(data: AttackData) -> Self {
        Self::new(
            data.detection_range,
            data.attack_range,
            data.damage,
            data.attack_delay,
        )
    }
}

/// Data-driven unit definition.
///
/// # Example RON
///
/// ```ron
/// UnitTemplate(
///     name: "knight",
///     health: 100,
///     move_speed: 1.5,
///     attack: Some(AttackData(
///         detection_range: 4.0,
///         attack_range: 1.5,
///         damage: 12,
///         attack_delay: 1.0,
///     )),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitTemplate {
    /// Unique template name, referenced by cards and summon events.
    pub name: String,

    /// Maximum health points.
    pub health: u32,

    /// Seconds of damage immunity after each hit.
    #[serde(default, with = "fixed_decimal::option")]
    pub invulnerability_delay: Option<Fixed>,

    /// Movement speed in units per second.
    #[serde(default, with = "fixed_decimal")]
    pub move_speed: Fixed,

    /// Offset from position to the point used for range checks.
    #[serde(default, with = "fixed_decimal::vec2")]
    pub center_offset: Vec2Fixed,

    /// Movement box, centered relative to the spawn point. Mobile units
    /// without one are confined to the match lane.
    #[serde(default, with = "fixed_decimal::rect::option")]
    pub bounds: Option<Rect>,

    /// Attack statistics (`None` only for HQs).
    #[serde(default)]
    pub attack: Option<AttackData>,

    /// Stationary base unit whose death ends the match.
    #[serde(default)]
    pub hq: bool,
}

impl UnitTemplate {
    /// Build spawn parameters for this template.
    ///
    /// Mobile units are confined to their authored `bounds`, or to `lane`
    /// when none is given. HQs never move, so their bounds collapse onto
    /// the spawn point.
    #[must_use]
    pub fn spawn_params(&self, side: Side, position: Vec2Fixed, lane: Rect) -> EntitySpawnParams {
        let (bounds_offset, bounds_size) = match self.bounds {
            _ if self.hq => (Vec2Fixed::ZERO, Vec2Fixed::ZERO),
            Some(bounds) => (bounds.center, bounds.size),
            None => (lane.center - position, lane.size),
        };

        let mut health = Health::new(self.health);
        if let Some(delay) = self.invulnerability_delay {
            health = health.with_invulnerability_delay(delay);
        }

        EntitySpawnParams {
            side: Some(side),
            position,
            center_offset: self.center_offset,
            health: Some(health),
            attack: self.attack.map(AttackProfile::from),
            move_speed: self.move_speed,
            bounds_offset,
            bounds_size,
            hq: self.hq,
            template: self.name.clone(),
        }
    }

    /// Check the template for authoring mistakes.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.health == 0 {
            errors.push(format!("Unit '{}' has zero health", self.name));
        }
        if self.move_speed < Fixed::ZERO {
            errors.push(format!("Unit '{}' has negative move_speed", self.name));
        }
        if self
            .bounds
            .is_some_and(|b| b.size.x < Fixed::ZERO || b.size.y < Fixed::ZERO)
        {
            errors.push(format!("Unit '{}' has negative bounds size", self.name));
        }
        if self.invulnerability_delay.is_some_and(|d| d < Fixed::ZERO) {
            errors.push(format!(
                "Unit '{}' has negative invulnerability_delay",
                self.name
            ));
        }

        match &self.attack {
            None if !self.hq => {
                errors.push(format!("Unit '{}' has no attack and is not an HQ", self.name));
            }
            Some(attack) => {
                for (field, value) in [
                    ("detection_range", attack.detection_range),
                    ("attack_range", attack.attack_range),
                    ("attack_delay", attack.attack_delay),
                ] {
                    if value < Fixed::ZERO {
                        errors.push(format!("Unit '{}' has negative {field}", self.name));
                    }
                }
            }
            None => {}
        }

        errors
    }
}
