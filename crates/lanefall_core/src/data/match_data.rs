//! Match configuration bundling every authored input of a match.

use serde::{Deserialize, Serialize};

use super::card_data::{CardEffect, CardTemplate, SpellEffect};
use super::summon_data::{SummonEvent, ENRAGE_MAX};
use super::template_registry::TemplateRegistry;
use super::unit_data::{AttackData, UnitTemplate};
use crate::deck::{Deck, HandSettings};
use crate::director::DirectorSettings;
use crate::economy::ManaSettings;
use crate::error::{GameError, Result};
use crate::math::{fixed_decimal, Fixed, Rect, Vec2Fixed};
use crate::side::Side;

/// Where a side's HQ stands at match start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HqPlacement {
    /// Owning side.
    pub side: Side,
    /// HQ unit template.
    pub template: String,
    /// Position on the field.
    #[serde(with = "fixed_decimal::vec2")]
    pub position: Vec2Fixed,
}

/// Complete match definition.
///
/// # Example RON
///
/// ```ron
/// MatchConfig(
///     units: [...],
///     cards: [...],
///     deck: ["knight", "knight", "archers", ...],
///     summon_events: [...],
///     lane: (center: (0.0, 0.0), size: (40.0, 6.0)),
///     placement_zone: (center: (-10.0, 0.0), size: (16.0, 6.0)),
///     headquarters: [
///         HqPlacement(side: Player, template: "hq", position: (-18.0, 0.0)),
///         HqPlacement(side: Enemy, template: "hq", position: (18.0, 0.0)),
///     ],
///     seed: 42,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Every unit template in the match.
    pub units: Vec<UnitTemplate>,
    /// Every card in the match.
    pub cards: Vec<CardTemplate>,
    /// The player's deck, by card type.
    pub deck: Vec<String>,
    /// The opponent's summon event table.
    pub summon_events: Vec<SummonEvent>,
    /// Player mana accrual.
    #[serde(default)]
    pub player_mana: ManaSettings,
    /// Opponent mana accrual.
    #[serde(default)]
    pub enemy_mana: ManaSettings,
    /// Opponent director tuning.
    #[serde(default)]
    pub director: DirectorSettings,
    /// Hand layout.
    #[serde(default)]
    pub hand: HandSettings,
    /// Rectangle every mobile unit is confined to.
    #[serde(with = "fixed_decimal::rect")]
    pub lane: Rect,
    /// Rectangle player unit cards must be placed in.
    #[serde(with = "fixed_decimal::rect")]
    pub placement_zone: Rect,
    /// HQs spawned at match start.
    #[serde(default)]
    pub headquarters: Vec<HqPlacement>,
    /// Seed of the match RNG.
    #[serde(default)]
    pub seed: u64,
    /// Initial time scale.
    #[serde(default = "default_time_scale", with = "fixed_decimal")]
    pub time_scale: Fixed,
}

const fn default_time_scale() -> Fixed {
    Fixed::ONE
}

impl MatchConfig {
    /// Parse a configuration from RON text. Does not validate.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DataParseError`] if the text is not a valid
    /// `MatchConfig`.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| GameError::DataParseError(e.to_string()))
    }

    /// Render the configuration as pretty RON.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DataParseError`] if serialization fails.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| GameError::DataParseError(e.to_string()))
    }

    /// Build the template registry for this configuration.
    ///
    /// # Errors
    ///
    /// Propagates duplicate and dangling-reference errors from
    /// [`TemplateRegistry::new`].
    pub fn templates(&self) -> Result<TemplateRegistry> {
        TemplateRegistry::new(&self.units, &self.cards)
    }

    /// Check the whole configuration.
    ///
    /// Every problem is collected. A single problem is returned as its own
    /// error; several are folded into [`GameError::InvalidConfig`].
    ///
    /// # Errors
    ///
    /// Returns the problem(s) found, if any.
    pub fn validate(&self) -> Result<()> {
        let mut problems: Vec<GameError> = Vec::new();
        let mut lines: Vec<String> = Vec::new();

        for unit in &self.units {
            lines.extend(unit.validate());
        }
        for card in &self.cards {
            lines.extend(card.validate());
        }
        lines.extend(self.director.validate());
        lines.extend(self.hand.validate());
        for (side, mana) in [(Side::Player, &self.player_mana), (Side::Enemy, &self.enemy_mana)] {
            if mana.interval <= Fixed::ZERO {
                lines.push(format!("{side} mana interval must be > 0"));
            }
            if mana.tick_amount < 0 || mana.starting < 0 {
                lines.push(format!("{side} mana amounts must be >= 0"));
            }
        }
        if self.time_scale < Fixed::ZERO {
            lines.push("time_scale must be >= 0".to_string());
        }
        for (name, rect) in [("lane", self.lane), ("placement_zone", self.placement_zone)] {
            if rect.size.x < Fixed::ZERO || rect.size.y < Fixed::ZERO {
                lines.push(format!("{name} size must be >= 0"));
            }
        }

        for event in &self.summon_events {
            if let Err(e) = event.validate() {
                problems.push(e);
            }
        }

        match self.templates() {
            Ok(templates) => {
                if let Err(e) = Deck::new(self.deck.clone(), &templates) {
                    problems.push(e);
                }
                for event in &self.summon_events {
                    for unit in &event.units {
                        if let Err(e) = templates.template_by_name(unit) {
                            problems.push(e);
                        }
                    }
                }
                for hq in &self.headquarters {
                    match templates.template_by_name(&hq.template) {
                        Ok(template) if !template.hq => lines.push(format!(
                            "HQ placement uses non-HQ template '{}'",
                            hq.template
                        )),
                        Ok(_) => {}
                        Err(e) => problems.push(e),
                    }
                }
            }
            Err(e) => problems.push(e),
        }

        if !lines.is_empty() {
            problems.push(GameError::InvalidConfig(lines));
        }

        match problems.len() {
            0 => Ok(()),
            1 => Err(problems.remove(0)),
            _ => {
                for problem in &problems {
                    tracing::warn!(%problem, "match config rejected");
                }
                Err(GameError::InvalidConfig(
                    problems.iter().map(ToString::to_string).collect(),
                ))
            }
        }
    }
}

impl Default for MatchConfig {
    /// A small playable match: three unit types, eight cards, four
    /// opponent events, one HQ per side.
    fn default() -> Self {
        let attack = |detection: f64, range: f64, damage: u32, delay: f64| {
            Some(AttackData {
                detection_range: Fixed::from_num(detection),
                attack_range: Fixed::from_num(range),
                damage,
                attack_delay: Fixed::from_num(delay),
            })
        };
        let unit = |name: &str, health: u32, speed: f64, attack: Option<AttackData>| UnitTemplate {
            name: name.to_string(),
            health,
            invulnerability_delay: None,
            move_speed: Fixed::from_num(speed),
            center_offset: Vec2Fixed::ZERO,
            bounds: None,
            attack,
            hq: false,
        };
        let summon = |card_type: &str, cost: i32, unit: &str, count: u32| CardTemplate {
            card_type: card_type.to_string(),
            cost,
            effect: CardEffect::Summon {
                unit: unit.to_string(),
                count,
                spacing: Fixed::ONE,
            },
        };
        let spell = |card_type: &str, cost: i32, radius: f64, effect: SpellEffect| CardTemplate {
            card_type: card_type.to_string(),
            cost,
            effect: CardEffect::Spell {
                radius: Fixed::from_num(radius),
                effect,
            },
        };
        let event = |name: &str, units: &[&str], cost: i32, variance: i32, enrage: (i32, i32), weight: i32| {
            SummonEvent {
                name: name.to_string(),
                units: units.iter().map(ToString::to_string).collect(),
                cost,
                cost_variance: variance,
                enrage_min: Fixed::from_num(enrage.0),
                enrage_max: Fixed::from_num(enrage.1),
                weight: Fixed::from_num(weight),
            }
        };

        let mut hq = unit("hq", 500, 0.0, None);
        hq.hq = true;

        Self {
            units: vec![
                unit("knight", 100, 1.5, attack(4.0, 1.5, 12, 1.0)),
                unit("archer", 60, 1.25, attack(5.0, 4.0, 8, 1.25)),
                unit("brute", 180, 1.0, attack(3.0, 1.25, 20, 1.75)),
                hq,
            ],
            cards: vec![
                summon("knight", 3, "knight", 1),
                summon("archers", 4, "archer", 2),
                summon("brute", 5, "brute", 1),
                spell("fireball", 4, 2.0, SpellEffect::Damage(40)),
                spell(
                    "frost",
                    3,
                    2.5,
                    SpellEffect::Freeze {
                        shock: Fixed::from_num(1.5),
                        after_effect: Fixed::ONE,
                    },
                ),
                spell("mend", 2, 3.0, SpellEffect::Heal(30)),
            ],
            deck: ["knight", "knight", "archers", "archers", "brute", "fireball", "frost", "mend"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            summon_events: vec![
                event("scouts", &["knight"], 3, 1, (0, 60), 3),
                event("volley", &["archer", "archer"], 5, 0, (0, 100), 2),
                event("warband", &["brute", "knight"], 8, 1, (30, 100), 2),
                event("siege", &["brute", "brute", "brute"], 12, 0, (70, 100), 1),
            ],
            player_mana: ManaSettings::default(),
            enemy_mana: ManaSettings::default(),
            director: DirectorSettings::default(),
            hand: HandSettings::default(),
            lane: Rect::new(Vec2Fixed::ZERO, Vec2Fixed::from_ints(40, 6)),
            placement_zone: Rect::new(Vec2Fixed::from_ints(-10, 0), Vec2Fixed::from_ints(16, 6)),
            headquarters: vec![
                HqPlacement {
                    side: Side::Player,
                    template: "hq".to_string(),
                    position: Vec2Fixed::from_ints(-18, 0),
                },
                HqPlacement {
                    side: Side::Enemy,
                    template: "hq".to_string(),
                    position: Vec2Fixed::from_ints(18, 0),
                },
            ],
            seed: 0,
            time_scale: Fixed::ONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(MatchConfig::default().validate().is_ok());
        assert!(MatchConfig::default().summon_events.iter().all(|e| e.enrage_max <= ENRAGE_MAX));
    }

    #[test]
    fn test_ron_roundtrip_of_default() {
        let config = MatchConfig::default();
        let text = config.to_ron_string().unwrap();
        let parsed = MatchConfig::from_ron_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_single_problem_keeps_its_type() {
        let mut config = MatchConfig::default();
        config.deck.pop();
        assert!(matches!(
            config.validate(),
            Err(GameError::DeckSizeMismatch {
                expected: 8,
                found: 7
            })
        ));
    }

    #[test]
    fn test_several_problems_are_collected() {
        let mut config = MatchConfig::default();
        config.deck.pop();
        config.summon_events[0].weight = Fixed::ZERO;
        config.summon_events[1].units.push("dragon".to_string());

        let Err(GameError::InvalidConfig(lines)) = config.validate() else {
            panic!("expected a collected config error");
        };
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_parse_error_is_reported() {
        assert!(matches!(
            MatchConfig::from_ron_str("MatchConfig("),
            Err(GameError::DataParseError(_))
        ));
    }
}
