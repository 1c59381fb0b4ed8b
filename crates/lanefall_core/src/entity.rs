//! Combat entity definition.
//!
//! A [`CombatEntity`] is composed once, at spawn, from its position,
//! side, [`Health`] and [`AttackProfile`]. There is no runtime component
//! lookup: a unit that would need a health or attack part it does not
//! have is rejected when it is built.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::health::Health;
use crate::math::{fixed_serde, Fixed, Rect, Vec2Fixed};
use crate::registry::EntityId;
use crate::side::Side;
use crate::timer::Countdown;

/// Engagement state of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EngagementState {
    /// No target; walking along the side heading.
    #[default]
    Idle,
    /// Has a target that is out of attack range.
    Approaching,
    /// Target is within attack range.
    Attacking,
    /// Suspended by a freeze effect.
    Frozen,
    /// Health reached zero.
    Dead,
}

/// Attack parameters of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackProfile {
    /// Radius within which opponents are noticed.
    #[serde(with = "fixed_serde")]
    pub detection_range: Fixed,
    /// Radius within which the target can be hit.
    #[serde(with = "fixed_serde")]
    pub attack_range: Fixed,
    /// Damage per hit.
    pub damage: u32,
    /// Seconds between hits.
    #[serde(with = "fixed_serde")]
    pub attack_delay: Fixed,
}

impl AttackProfile {
    /// Create an attack profile.
    #[must_use]
    pub const fn new(
        detection_range: Fixed,
        attack_range: Fixed,
        damage: u32,
        attack_delay: Fixed,
    ) -> Self {
        Self {
            detection_range,
            attack_range,
            damage,
            attack_delay,
        }
    }

    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("detection_range", self.detection_range),
            ("attack_range", self.attack_range),
            ("attack_delay", self.attack_delay),
        ] {
            if value < Fixed::ZERO {
                return Err(GameError::InvalidValue {
                    field: field.to_string(),
                    message: format!("must be >= 0, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Phase of an active freeze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FreezePhase {
    /// Initial hard-stun portion.
    Shock,
    /// Trailing portion while the effect wears off.
    AfterEffect,
}

/// An active freeze: two back-to-back countdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Freeze {
    /// Current phase.
    pub phase: FreezePhase,
    shock: Countdown,
    after_effect: Countdown,
}

impl Freeze {
    /// Start a freeze with the given phase lengths in seconds.
    #[must_use]
    pub fn new(shock: Fixed, after_effect: Fixed) -> Self {
        Self {
            phase: FreezePhase::Shock,
            shock: Countdown::start(shock),
            after_effect: Countdown::start(after_effect),
        }
    }

    /// Total seconds left across both phases.
    #[must_use]
    pub fn remaining(&self) -> Fixed {
        match self.phase {
            FreezePhase::Shock => self.shock.remaining() + self.after_effect.remaining(),
            FreezePhase::AfterEffect => self.after_effect.remaining(),
        }
    }

    /// Advance the freeze. Returns true once both phases have run out.
    pub fn advance(&mut self, delta: Fixed) -> bool {
        let mut delta = delta;
        if self.phase == FreezePhase::Shock {
            let leftover = (delta - self.shock.remaining()).max(Fixed::ZERO);
            self.shock.advance(delta);
            if !self.shock.is_elapsed() {
                return false;
            }
            self.phase = FreezePhase::AfterEffect;
            delta = leftover;
        }
        self.after_effect.advance(delta);
        self.after_effect.is_elapsed()
    }
}

/// Parameters for spawning a new combat entity.
///
/// Health is always required; an attack profile is required for every
/// unit except HQs.
#[derive(Debug, Clone, Default)]
pub struct EntitySpawnParams {
    /// Side the unit fights for.
    pub side: Option<Side>,
    /// Spawn position in world space.
    pub position: Vec2Fixed,
    /// Offset from position to the unit's visual center.
    pub center_offset: Vec2Fixed,
    /// Health collaborator.
    pub health: Option<Health>,
    /// Attack collaborator.
    pub attack: Option<AttackProfile>,
    /// Movement speed in units per second.
    pub move_speed: Fixed,
    /// Offset of the movement box center from the spawn position.
    pub bounds_offset: Vec2Fixed,
    /// Full size of the movement box.
    pub bounds_size: Vec2Fixed,
    /// Stationary base unit, exempt from engagement logic.
    pub hq: bool,
    /// Template the unit was built from.
    pub template: String,
}

/// A unit on the battlefield.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatEntity {
    /// Registry id, assigned when the entity enters the registry.
    pub id: EntityId,
    /// Template name.
    pub template: String,
    /// Side affiliation.
    pub side: Side,
    /// World position.
    pub position: Vec2Fixed,
    /// Offset from position to the center used for range checks.
    pub center_offset: Vec2Fixed,
    /// Hit points.
    pub health: Health,
    /// Attack parameters (absent only for HQs).
    pub attack: Option<AttackProfile>,
    /// Movement speed in units per second.
    #[serde(with = "fixed_serde")]
    pub move_speed: Fixed,
    /// Current walking direction (not necessarily normalized).
    pub move_direction: Vec2Fixed,
    /// Box the unit may never leave.
    pub bounds: Rect,
    /// Current target, looked up by id each tick.
    pub target: Option<EntityId>,
    /// Seconds until the next attack may fire; never negative.
    #[serde(with = "fixed_serde")]
    pub cooldown: Fixed,
    /// Engagement state.
    pub state: EngagementState,
    /// Active freeze, if any.
    pub freeze: Option<Freeze>,
    /// HQ flag.
    pub hq: bool,
}

impl CombatEntity {
    /// Build an entity from spawn parameters, validating its composition.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::MissingComponent`] when the side, health, or
    /// (for non-HQ units) attack profile is absent, and
    /// [`GameError::InvalidValue`] for negative ranges or speeds.
    pub fn new(params: EntitySpawnParams) -> Result<Self> {
        let side = params.side.ok_or(GameError::MissingComponent("side"))?;
        let health = params.health.ok_or(GameError::MissingComponent("health"))?;
        if !params.hq && params.attack.is_none() {
            return Err(GameError::MissingComponent("attack"));
        }
        if let Some(attack) = &params.attack {
            attack.validate()?;
        }
        if params.move_speed < Fixed::ZERO {
            return Err(GameError::InvalidValue {
                field: "move_speed".to_string(),
                message: format!("must be >= 0, got {}", params.move_speed),
            });
        }

        let bounds = Rect::new(params.position + params.bounds_offset, params.bounds_size);

        Ok(Self {
            id: 0,
            template: params.template,
            side,
            position: bounds.clamp(params.position),
            center_offset: params.center_offset,
            health,
            attack: params.attack,
            move_speed: params.move_speed,
            move_direction: side.default_heading(),
            bounds,
            target: None,
            cooldown: Fixed::ZERO,
            state: EngagementState::Idle,
            freeze: None,
            hq: params.hq,
        })
    }

    /// Point used for detection and attack range checks.
    #[must_use]
    pub fn center(&self) -> Vec2Fixed {
        self.position + self.center_offset
    }

    /// Whether the unit is alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.health.is_dead()
    }

    /// Whether a freeze is active.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        self.freeze.is_some()
    }

    /// Move along the current direction for `delta` seconds, then clamp into bounds.
    pub fn step_movement(&mut self, delta: Fixed) {
        let step = self
            .move_direction
            .normalize()
            .scale(self.move_speed.saturating_mul(delta));
        let moved = Vec2Fixed::new(
            self.position.x.saturating_add(step.x),
            self.position.y.saturating_add(step.y),
        );
        self.position = self.bounds.clamp(moved);
    }

    /// Suspend attacking and movement for `shock + after_effect` seconds.
    ///
    /// A freeze already in progress is extended if the new one would last
    /// longer; otherwise it is left alone. Returns false for HQs and dead
    /// units, which cannot be frozen.
    pub fn freeze(&mut self, shock: Fixed, after_effect: Fixed) -> bool {
        if self.hq || !self.is_alive() {
            return false;
        }
        let incoming = Freeze::new(shock, after_effect);
        match self.freeze {
            Some(current) if current.remaining() >= incoming.remaining() => {}
            _ => self.freeze = Some(incoming),
        }
        self.state = EngagementState::Frozen;
        true
    }

    /// Advance an active freeze. Returns true on the tick the unit thaws.
    ///
    /// Thawing always returns the unit to `Idle`; a target still held is
    /// re-evaluated by the next range check.
    pub fn advance_freeze(&mut self, delta: Fixed) -> bool {
        let Some(freeze) = self.freeze.as_mut() else {
            return false;
        };
        if freeze.advance(delta) {
            self.freeze = None;
            self.state = EngagementState::Idle;
            true
        } else {
            false
        }
    }

    /// Drop the current target and walk the default heading again.
    pub fn clear_target(&mut self) {
        self.target = None;
        self.move_direction = self.side.default_heading();
        self.state = EngagementState::Idle;
    }
}
