//! Per-entity countdowns.
//!
//! Every delayed behavior in the simulation (attack cooldowns, freeze
//! phases, post-damage invulnerability, staged summons) is a countdown
//! advanced by the scaled tick delta. Nothing blocks; a countdown simply
//! reports when it has run out.

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed};

/// A countdown toward zero with a remembered duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Countdown {
    #[serde(with = "fixed_serde")]
    remaining: Fixed,
    #[serde(with = "fixed_serde")]
    duration: Fixed,
}

impl Countdown {
    /// A countdown that has already elapsed.
    pub const ELAPSED: Self = Self {
        remaining: Fixed::ZERO,
        duration: Fixed::ZERO,
    };

    /// Start a countdown of `duration` seconds. Negative durations start elapsed.
    #[must_use]
    pub fn start(duration: Fixed) -> Self {
        let duration = duration.max(Fixed::ZERO);
        Self {
            remaining: duration,
            duration,
        }
    }

    /// Advance by `delta` seconds. Returns true if this call finished the countdown.
    pub fn advance(&mut self, delta: Fixed) -> bool {
        if self.is_elapsed() {
            return false;
        }
        self.remaining = (self.remaining - delta).max(Fixed::ZERO);
        self.is_elapsed()
    }

    /// Seconds left before the countdown elapses.
    #[must_use]
    pub const fn remaining(&self) -> Fixed {
        self.remaining
    }

    /// Seconds since the countdown started.
    #[must_use]
    pub fn elapsed(&self) -> Fixed {
        self.duration - self.remaining
    }

    /// Whether the countdown has reached zero.
    #[must_use]
    pub fn is_elapsed(&self) -> bool {
        self.remaining <= Fixed::ZERO
    }
}
