//! Hit points for combat entities.
//!
//! Health is only ever changed through [`Health::apply_damage`] and
//! [`Health::heal`]. Both clamp into `0..=max`, and the transition to zero
//! is reported exactly once.

use serde::{Deserialize, Serialize};

use crate::math::{option_fixed_serde, Fixed};
use crate::timer::Countdown;

/// Result of a damage call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DamageOutcome {
    /// Hit points actually removed.
    pub applied: u32,
    /// True only on the call that took health to zero.
    pub died: bool,
}

/// Health component for damageable entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    current: u32,
    max: u32,
    /// Whether damage is currently accepted.
    can_be_damaged: bool,
    /// Immunity window opened after each successful hit, if any.
    #[serde(with = "option_fixed_serde")]
    invulnerability_delay: Option<Fixed>,
    invulnerability: Countdown,
    dead: bool,
}

impl Health {
    /// Create new health at full hit points.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self {
            current: max,
            max,
            can_be_damaged: true,
            invulnerability_delay: None,
            invulnerability: Countdown::ELAPSED,
            dead: max == 0,
        }
    }

    /// Builder method to open an immunity window after every hit.
    #[must_use]
    pub fn with_invulnerability_delay(mut self, delay: Fixed) -> Self {
        self.invulnerability_delay = (delay > Fixed::ZERO).then_some(delay);
        self
    }

    /// Current hit points.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Maximum hit points.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Whether the entity has died. Dead health never changes again.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.dead
    }

    /// Whether a hit landing now would do anything.
    #[must_use]
    pub const fn can_be_damaged(&self) -> bool {
        self.can_be_damaged && !self.dead
    }

    /// Toggle damage immunity from outside (spell shields, spawn protection).
    pub fn set_can_be_damaged(&mut self, value: bool) {
        self.can_be_damaged = value;
    }

    /// Apply damage, clamping at zero.
    ///
    /// Ignored while dead or immune. Starts the post-hit immunity window
    /// when one is configured.
    pub fn apply_damage(&mut self, amount: u32) -> DamageOutcome {
        if !self.can_be_damaged() || amount == 0 {
            return DamageOutcome::default();
        }

        let applied = amount.min(self.current);
        self.current -= applied;

        if let Some(delay) = self.invulnerability_delay {
            self.can_be_damaged = false;
            self.invulnerability = Countdown::start(delay);
        }

        let died = self.current == 0;
        if died {
            self.dead = true;
        }
        self.check_invariants();

        DamageOutcome { applied, died }
    }

    /// Heal, clamping at max. Returns the amount actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        if self.dead {
            return 0;
        }
        let headroom = self.max - self.current;
        let actual = amount.min(headroom);
        self.current += actual;
        self.check_invariants();
        actual
    }

    /// Advance the post-hit immunity window.
    pub fn tick(&mut self, delta: Fixed) {
        if self.invulnerability.advance(delta) {
            self.can_be_damaged = true;
        }
    }

    /// Get health as a percentage (0-100).
    #[must_use]
    pub fn percentage(&self) -> u32 {
        if self.max == 0 {
            0
        } else {
            let percent = u64::from(self.current) * 100 / u64::from(self.max);
            u32::try_from(percent).unwrap_or(100)
        }
    }

    fn check_invariants(&mut self) {
        if self.current > self.max {
            tracing::warn!(current = self.current, max = self.max, "health above max, clamping");
            self.current = self.max;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_clamps_and_dies_once() {
        let mut health = Health::new(10);
        let first = health.apply_damage(25);
        assert_eq!(first, DamageOutcome { applied: 10, died: true });
        assert_eq!(health.current(), 0);

        let second = health.apply_damage(5);
        assert_eq!(second, DamageOutcome::default());
        assert!(health.is_dead());
    }

    #[test]
    fn test_heal_clamps_to_max() {
        let mut health = Health::new(100);
        health.apply_damage(30);
        assert_eq!(health.heal(50), 30);
        assert_eq!(health.current(), 100);
    }

    #[test]
    fn test_dead_cannot_heal() {
        let mut health = Health::new(5);
        health.apply_damage(5);
        assert_eq!(health.heal(5), 0);
        assert_eq!(health.current(), 0);
    }

    #[test]
    fn test_invulnerability_window() {
        let mut health = Health::new(100).with_invulnerability_delay(Fixed::from_num(0.5));
        assert_eq!(health.apply_damage(10).applied, 10);
        assert!(!health.can_be_damaged());
        assert_eq!(health.apply_damage(10).applied, 0);

        health.tick(Fixed::from_num(0.25));
        assert!(!health.can_be_damaged());
        health.tick(Fixed::from_num(0.25));
        assert!(health.can_be_damaged());
        assert_eq!(health.apply_damage(10).applied, 10);
        assert_eq!(health.current(), 80);
    }

    #[test]
    fn test_external_immunity_flag() {
        let mut health = Health::new(50);
        health.set_can_be_damaged(false);
        assert_eq!(health.apply_damage(20).applied, 0);
        health.set_can_be_damaged(true);
        assert_eq!(health.apply_damage(20).applied, 20);
    }

    #[test]
    fn test_percentage() {
        let mut health = Health::new(200);
        health.apply_damage(50);
        assert_eq!(health.percentage(), 75);
    }

    #[test]
    fn test_percentage_with_huge_pool() {
        let mut health = Health::new(u32::MAX);
        assert_eq!(health.percentage(), 100);
        health.apply_damage(u32::MAX / 2 + 1);
        assert_eq!(health.percentage(), 49);
    }
}
