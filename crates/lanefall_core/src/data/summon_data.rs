//! Opponent summon events.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::math::{fixed_decimal, Fixed};

/// Upper end of the enrage scale.
pub const ENRAGE_MAX: Fixed = Fixed::from_bits(100 << 32);

/// A group of units the opponent can summon together.
///
/// # Example RON
///
/// ```ron
/// SummonEvent(
///     name: "warband",
///     units: ["brute", "knight"],
///     cost: 8,
///     cost_variance: 1,
///     enrage_min: 30.0,
///     enrage_max: 100.0,
///     weight: 2.0,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummonEvent {
    /// Event name, used in logs and notifications.
    pub name: String,
    /// Unit templates spawned in order.
    pub units: Vec<String>,
    /// Base mana cost.
    pub cost: i32,
    /// Maximum random deviation applied to the cost when the event is picked.
    #[serde(default)]
    pub cost_variance: i32,
    /// Lowest enrage at which the event is eligible.
    #[serde(default, with = "fixed_decimal")]
    pub enrage_min: Fixed,
    /// Highest enrage at which the event is eligible.
    #[serde(default = "default_enrage_max", with = "fixed_decimal")]
    pub enrage_max: Fixed,
    /// Relative pick weight; must be positive.
    #[serde(with = "fixed_decimal")]
    pub weight: Fixed,
}

const fn default_enrage_max() -> Fixed {
    ENRAGE_MAX
}

impl SummonEvent {
    /// Whether the event may be picked at the given enrage level.
    #[must_use]
    pub fn is_eligible(&self, enrage: Fixed) -> bool {
        self.enrage_min <= enrage && enrage <= self.enrage_max
    }

    /// Check weight, enrage window and cost.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidWeight`] for a weight ≤ 0,
    /// [`GameError::InvalidEnrageRange`] for an inverted window or one
    /// outside `[0, 100]`, and [`GameError::InvalidValue`] for negative
    /// costs or an empty unit list.
    pub fn validate(&self) -> Result<()> {
        if self.weight <= Fixed::ZERO {
            return Err(GameError::InvalidWeight(self.name.clone()));
        }
        if self.enrage_min < Fixed::ZERO
            || self.enrage_max > ENRAGE_MAX
            || self.enrage_min > self.enrage_max
        {
            return Err(GameError::InvalidEnrageRange {
                name: self.name.clone(),
                min: self.enrage_min.to_string(),
                max: self.enrage_max.to_string(),
            });
        }
        if self.cost < 0 || self.cost_variance < 0 {
            return Err(GameError::InvalidValue {
                field: format!("{}.cost", self.name),
                message: "cost and cost_variance must be >= 0".to_string(),
            });
        }
        if self.units.is_empty() {
            return Err(GameError::InvalidValue {
                field: format!("{}.units", self.name),
                message: "must name at least one unit".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(weight: f64, min: f64, max: f64) -> SummonEvent {
        SummonEvent {
            name: "test".to_string(),
            units: vec!["knight".to_string()],
            cost: 3,
            cost_variance: 0,
            enrage_min: Fixed::from_num(min),
            enrage_max: Fixed::from_num(max),
            weight: Fixed::from_num(weight),
        }
    }

    #[test]
    fn test_enrage_max_constant() {
        assert_eq!(ENRAGE_MAX, Fixed::from_num(100));
    }

    #[test]
    fn test_eligibility_is_inclusive() {
        let e = event(1.0, 30.0, 60.0);
        assert!(e.is_eligible(Fixed::from_num(30)));
        assert!(e.is_eligible(Fixed::from_num(60)));
        assert!(!e.is_eligible(Fixed::from_num(61)));
    }

    #[test]
    fn test_zero_weight_rejected() {
        assert!(matches!(
            event(0.0, 0.0, 100.0).validate(),
            Err(GameError::InvalidWeight(_))
        ));
    }

    #[test]
    fn test_bad_enrage_windows_rejected() {
        assert!(matches!(
            event(1.0, 50.0, 20.0).validate(),
            Err(GameError::InvalidEnrageRange { .. })
        ));
        assert!(matches!(
            event(1.0, 0.0, 120.0).validate(),
            Err(GameError::InvalidEnrageRange { .. })
        ));
        assert!(event(1.0, 0.0, 100.0).validate().is_ok());
    }

    #[test]
    fn test_enrage_max_defaults_to_full_scale() {
        let parsed: SummonEvent = ron::from_str(
            r#"SummonEvent(name: "scouts", units: ["knight"], cost: 3, weight: 1.0)"#,
        )
        .unwrap();
        assert_eq!(parsed.enrage_min, Fixed::ZERO);
        assert_eq!(parsed.enrage_max, ENRAGE_MAX);
    }
}
