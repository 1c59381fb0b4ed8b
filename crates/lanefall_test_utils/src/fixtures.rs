//! Test fixtures and helpers.
//!
//! Template builders, small arenas and a scripted player for consistent
//! testing.

use fixed::types::I32F32;
use lanefall_core::data::{
    AttackData, CardEffect, CardTemplate, HqPlacement, MatchConfig, SummonEvent, UnitTemplate,
    ENRAGE_MAX,
};
use lanefall_core::entity::CombatEntity;
use lanefall_core::math::{Fixed, Rect, Vec2Fixed};
use lanefall_core::registry::{EntityId, EntityRegistry};
use lanefall_core::replay::PlayerCommand;
use lanefall_core::side::Side;
use lanefall_core::simulation::Simulation;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// A lane wide enough that no fixture unit ever touches its edges.
#[must_use]
pub fn open_lane() -> Rect {
    Rect::new(Vec2Fixed::ZERO, Vec2Fixed::from_ints(1000, 1000))
}

/// Melee unit template.
#[must_use]
pub fn unit(name: &str, health: u32, move_speed: Fixed, attack: AttackData) -> UnitTemplate {
    UnitTemplate {
        name: name.to_string(),
        health,
        invulnerability_delay: None,
        move_speed,
        center_offset: Vec2Fixed::ZERO,
        bounds: None,
        attack: Some(attack),
        hq: false,
    }
}

/// Attack statistics with whole-number ranges.
#[must_use]
pub fn attack(detection: i32, range: i32, damage: u32, delay: Fixed) -> AttackData {
    AttackData {
        detection_range: fixed(detection),
        attack_range: fixed(range),
        damage,
        attack_delay: delay,
    }
}

/// Stationary HQ template.
#[must_use]
pub fn hq(name: &str, health: u32) -> UnitTemplate {
    UnitTemplate {
        name: name.to_string(),
        health,
        invulnerability_delay: None,
        move_speed: Fixed::ZERO,
        center_offset: Vec2Fixed::ZERO,
        bounds: None,
        attack: None,
        hq: true,
    }
}

/// Card that summons a single unit.
#[must_use]
pub fn summon_card(card_type: &str, cost: i32, unit: &str) -> CardTemplate {
    CardTemplate {
        card_type: card_type.to_string(),
        cost,
        effect: CardEffect::Summon {
            unit: unit.to_string(),
            count: 1,
            spacing: Fixed::ZERO,
        },
    }
}

/// Summon event eligible at every enrage level.
#[must_use]
pub fn summon_event(name: &str, units: &[&str], cost: i32, weight: i32) -> SummonEvent {
    SummonEvent {
        name: name.to_string(),
        units: units.iter().map(ToString::to_string).collect(),
        cost,
        cost_variance: 0,
        enrage_min: Fixed::ZERO,
        enrage_max: ENRAGE_MAX,
        weight: fixed(weight),
    }
}

/// A quiet match: one knight card, no HQs, no opponent events, and a
/// placement zone covering the whole lane.
///
/// Tests add exactly the pieces they exercise.
#[must_use]
pub fn bare_config() -> MatchConfig {
    MatchConfig {
        units: vec![unit(
            "knight",
            100,
            fixed(1),
            attack(4, 1, 10, Fixed::ONE),
        )],
        cards: vec![summon_card("knight", 3, "knight")],
        deck: vec!["knight".to_string(); lanefall_core::deck::DECK_SIZE],
        summon_events: Vec::new(),
        headquarters: Vec::new(),
        lane: open_lane(),
        placement_zone: open_lane(),
        ..MatchConfig::default()
    }
}

/// [`bare_config`] with an HQ at each end of the lane.
#[must_use]
pub fn duel_config(hq_health: u32) -> MatchConfig {
    let mut config = bare_config();
    config.units.push(hq("hq", hq_health));
    config.headquarters = vec![
        HqPlacement {
            side: Side::Player,
            template: "hq".to_string(),
            position: Vec2Fixed::from_ints(-20, 0),
        },
        HqPlacement {
            side: Side::Enemy,
            template: "hq".to_string(),
            position: Vec2Fixed::from_ints(20, 0),
        },
    ];
    config
}

/// Build a unit from `template` and add it to the registry immediately.
///
/// # Panics
///
/// Panics if the template produces an invalid entity.
pub fn spawn(
    registry: &mut EntityRegistry,
    template: &UnitTemplate,
    side: Side,
    position: Vec2Fixed,
) -> EntityId {
    let entity = CombatEntity::new(template.spawn_params(side, position, open_lane()))
        .expect("fixture template should build");
    let id = registry.queue_spawn(entity);
    registry.flush_spawns();
    id
}

/// A simple scripted player: plays the first affordable hand card at the
/// center of the placement zone, one card at a time.
#[must_use]
pub fn scripted_commands(sim: &Simulation) -> Vec<PlayerCommand> {
    if !sim.pending_summons().is_empty() || sim.is_over() {
        return Vec::new();
    }
    let available = sim.mana(Side::Player).current();
    sim.hand()
        .cards()
        .iter()
        .find(|card| {
            sim.templates()
                .card_by_type(&card.card_type)
                .is_ok_and(|template| template.cost <= available)
        })
        .map(|card| {
            vec![PlayerCommand::Summon {
                instance: card.instance,
                point: sim.config().placement_zone.center,
            }]
        })
        .unwrap_or_default()
}

/// Serialize to RON and back.
///
/// # Panics
///
/// Panics if either direction fails.
pub fn ron_roundtrip<T: Serialize + DeserializeOwned>(value: &T) -> T {
    let text = ron::ser::to_string(value).expect("value should serialize to RON");
    ron::from_str(&text).expect("RON should deserialize")
}
