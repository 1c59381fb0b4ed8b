//! Mana economy.
//!
//! Each side owns one [`ManaPool`]. Mana trickles in on a fixed cadence:
//! the ramp fills over `interval` seconds, and every time it fills the pool
//! gains `tick_amount` and the ramp restarts from zero. Any external grant
//! also restarts the ramp.
//!
//! The ramp is kept as elapsed seconds and compared against `interval`
//! directly, so any exact chunking of an interval fills it.
//!
//! All amounts are integers; only the ramp itself is fixed-point.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::{fixed_decimal, fixed_serde, Fixed};

/// Errors from mana operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EconomyError {
    /// Not enough mana for the requested spend.
    #[error("Insufficient mana: need {required}, have {available}")]
    InsufficientResource {
        /// Amount required.
        required: i32,
        /// Amount available.
        available: i32,
    },
    /// Spend and grant amounts must not be negative.
    #[error("Mana amounts must be non-negative, got {0}")]
    NegativeAmount(i32),
}

/// Accrual settings for one side, as authored in match data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaSettings {
    /// Mana at match start.
    #[serde(default)]
    pub starting: i32,
    /// Mana gained each time the ramp fills.
    pub tick_amount: i32,
    /// Seconds for the ramp to fill.
    #[serde(with = "fixed_decimal")]
    pub interval: Fixed,
}

impl Default for ManaSettings {
    fn default() -> Self {
        Self {
            starting: 5,
            tick_amount: 1,
            interval: Fixed::ONE,
        }
    }
}

/// Plain serializable view of a pool for save/resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaSnapshot {
    /// Current balance.
    pub current: i32,
    /// Seconds accumulated toward the next accrual.
    #[serde(with = "fixed_serde")]
    pub elapsed: Fixed,
}

/// A side's mana balance and accrual ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaPool {
    current: i32,
    tick_amount: i32,
    #[serde(with = "fixed_serde")]
    interval: Fixed,
    #[serde(with = "fixed_serde")]
    elapsed: Fixed,
}

impl ManaPool {
    /// Create a pool from authored settings.
    #[must_use]
    pub fn new(settings: ManaSettings) -> Self {
        Self {
            current: settings.starting.max(0),
            tick_amount: settings.tick_amount,
            interval: settings.interval,
            elapsed: Fixed::ZERO,
        }
    }

    /// Current balance.
    #[must_use]
    pub const fn current(&self) -> i32 {
        self.current
    }

    /// Progress toward the next accrual, in `[0, 1)`.
    #[must_use]
    pub fn progress(&self) -> Fixed {
        if self.interval <= Fixed::ZERO {
            return Fixed::ZERO;
        }
        (self.elapsed / self.interval).min(Fixed::ONE)
    }

    /// Seconds accumulated toward the next accrual.
    #[must_use]
    pub const fn elapsed(&self) -> Fixed {
        self.elapsed
    }

    /// Advance the accrual ramp by `delta` seconds.
    ///
    /// Returns the amount of mana gained (zero or `tick_amount`). A single
    /// call gains at most one tick; leftover progress is discarded by the
    /// reset.
    pub fn accrue(&mut self, delta: Fixed) -> i32 {
        if self.interval <= Fixed::ZERO || delta <= Fixed::ZERO {
            return 0;
        }

        self.elapsed = self.elapsed.saturating_add(delta);
        if self.elapsed >= self.interval {
            self.elapsed = Fixed::ZERO;
            self.current = self.current.saturating_add(self.tick_amount);
            tracing::trace!(current = self.current, "mana accrued");
            self.tick_amount
        } else {
            0
        }
    }

    /// Check if the pool can cover a cost. A zero cost is always affordable.
    #[must_use]
    pub const fn can_afford(&self, cost: i32) -> bool {
        self.current >= cost
    }

    /// Spend mana if available; the balance is untouched on failure.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InsufficientResource`] if the balance is too
    /// low, or [`EconomyError::NegativeAmount`] for a negative cost.
    pub fn spend(&mut self, cost: i32) -> Result<(), EconomyError> {
        if cost < 0 {
            return Err(EconomyError::NegativeAmount(cost));
        }
        if !self.can_afford(cost) {
            return Err(EconomyError::InsufficientResource {
                required: cost,
                available: self.current,
            });
        }
        self.current -= cost;
        self.check_invariants();
        Ok(())
    }

    /// Add bonus mana and restart the accrual ramp.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::NegativeAmount`] for a negative grant.
    pub fn grant(&mut self, amount: i32) -> Result<(), EconomyError> {
        if amount < 0 {
            return Err(EconomyError::NegativeAmount(amount));
        }
        self.current = self.current.saturating_add(amount);
        self.elapsed = Fixed::ZERO;
        Ok(())
    }

    /// Capture the transient state for persistence.
    #[must_use]
    pub const fn snapshot(&self) -> ManaSnapshot {
        ManaSnapshot {
            current: self.current,
            elapsed: self.elapsed,
        }
    }

    /// Restore transient state captured by [`snapshot`](Self::snapshot).
    pub fn restore(&mut self, snapshot: ManaSnapshot) {
        self.current = snapshot.current;
        self.elapsed = snapshot.elapsed.max(Fixed::ZERO);
        self.check_invariants();
    }

    fn check_invariants(&mut self) {
        if self.current < 0 {
            tracing::warn!(current = self.current, "negative mana balance, clamping");
            self.current = 0;
        }
    }
}
