//! Opponent AI director.
//!
//! The director is a three-phase state machine evaluated once per tick:
//!
//! - **Choosing**: pick a summon event by weight among those eligible at
//!   the current enrage level. Nothing eligible means idle, not an error.
//! - **`AwaitingMana`**: hold the chosen event until the opponent's pool can
//!   pay for it, then spend and spawn the first unit immediately.
//! - **Spawning**: spawn the remaining units one every `inter_unit_delay`
//!   seconds, each at its own jittered point around the anchor.
//!
//! All randomness comes from the match RNG passed in by the caller.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::data::{SummonEvent, ENRAGE_MAX};
use crate::economy::ManaPool;
use crate::events::{GameEvent, TickEvents};
use crate::math::{fixed_decimal, fixed_serde, Fixed, Vec2Fixed};
use crate::side::Side;
use crate::timer::Countdown;

/// Director tuning, as authored in match data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorSettings {
    /// Center of the opponent's summon area.
    #[serde(with = "fixed_decimal::vec2")]
    pub anchor: Vec2Fixed,
    /// Half-extent of the jitter applied on each axis.
    #[serde(with = "fixed_decimal::vec2")]
    pub summon_area: Vec2Fixed,
    /// Seconds between units of one event.
    #[serde(with = "fixed_decimal")]
    pub inter_unit_delay: Fixed,
    /// Enrage at match start.
    #[serde(default, with = "fixed_decimal")]
    pub starting_enrage: Fixed,
    /// Enrage gained per second of match time.
    #[serde(default, with = "fixed_decimal")]
    pub enrage_per_second: Fixed,
}

impl Default for DirectorSettings {
    fn default() -> Self {
        Self {
            anchor: Vec2Fixed::from_ints(14, 0),
            summon_area: Vec2Fixed::from_ints(1, 2),
            inter_unit_delay: Fixed::from_num(0.5),
            starting_enrage: Fixed::ZERO,
            enrage_per_second: Fixed::ONE,
        }
    }
}

impl DirectorSettings {
    /// Check the settings for out-of-range values.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.summon_area.x < Fixed::ZERO || self.summon_area.y < Fixed::ZERO {
            errors.push("Director summon_area must be >= 0 on both axes".to_string());
        }
        if self.inter_unit_delay < Fixed::ZERO {
            errors.push("Director inter_unit_delay must be >= 0".to_string());
        }
        if self.starting_enrage < Fixed::ZERO || self.starting_enrage > ENRAGE_MAX {
            errors.push("Director starting_enrage must lie in [0, 100]".to_string());
        }
        errors
    }
}

/// A unit the director wants placed this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRequest {
    /// Unit template name.
    pub template: String,
    /// Jittered spawn point.
    pub position: Vec2Fixed,
}

/// Where the director is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirectorPhase {
    /// No event chosen yet.
    Choosing,
    /// Event chosen, waiting for mana.
    AwaitingMana {
        /// Index into the summon event table.
        event: usize,
        /// Cost rolled at pick time.
        cost: i32,
    },
    /// Paid for; spawning units in sequence.
    Spawning {
        /// Index into the summon event table.
        event: usize,
        /// Next unit to spawn.
        next_unit: usize,
        /// Time until the next unit.
        delay: Countdown,
    },
}

/// Pick an event by weight using a pre-drawn `r` in `[0, weight_sum)`.
///
/// Returns the first eligible entry whose running weight reaches `r`, so an
/// exact boundary favors the earlier-declared entry.
#[must_use]
pub fn pick_weighted(events: &[SummonEvent], enrage: Fixed, r: Fixed) -> Option<usize> {
    let mut running = Fixed::ZERO;
    let mut last = None;
    for (index, event) in events.iter().enumerate() {
        if !event.is_eligible(enrage) {
            continue;
        }
        running = running.saturating_add(event.weight);
        if running >= r {
            return Some(index);
        }
        last = Some(index);
    }
    last
}

/// Sum of the weights of events eligible at `enrage`.
#[must_use]
pub fn eligible_weight(events: &[SummonEvent], enrage: Fixed) -> Fixed {
    events
        .iter()
        .filter(|event| event.is_eligible(enrage))
        .fold(Fixed::ZERO, |sum, event| sum.saturating_add(event.weight))
}

/// Weighted random pick among events eligible at `enrage`.
///
/// Draws `r` uniformly from the raw fixed-point range `[0, weight_sum)`,
/// so the pick is bit-identical on every platform for a given RNG state.
/// Returns `None` when nothing is eligible.
pub fn pick_next_summon_event(
    events: &[SummonEvent],
    enrage: Fixed,
    rng: &mut ChaCha8Rng,
) -> Option<usize> {
    let sum = eligible_weight(events, enrage);
    if sum <= Fixed::ZERO {
        return None;
    }
    let r = Fixed::from_bits(rng.gen_range(0..sum.to_bits()));
    pick_weighted(events, enrage, r)
}

/// Uniform value in `[-extent, extent]`, or zero for a zero extent.
fn jitter(extent: Fixed, rng: &mut ChaCha8Rng) -> Fixed {
    let bits = extent.to_bits();
    if bits <= 0 {
        return Fixed::ZERO;
    }
    Fixed::from_bits(rng.gen_range(-bits..=bits))
}

/// The opponent's decision maker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Director {
    settings: DirectorSettings,
    #[serde(with = "fixed_serde")]
    enrage: Fixed,
    phase: DirectorPhase,
}

impl Director {
    /// Create a director in the choosing phase.
    #[must_use]
    pub fn new(settings: DirectorSettings) -> Self {
        Self {
            settings,
            enrage: settings.starting_enrage.clamp(Fixed::ZERO, ENRAGE_MAX),
            phase: DirectorPhase::Choosing,
        }
    }

    /// Current enrage level in `[0, 100]`.
    #[must_use]
    pub const fn enrage(&self) -> Fixed {
        self.enrage
    }

    /// Override the enrage level; the value is clamped to `[0, 100]`.
    pub fn set_enrage(&mut self, enrage: Fixed) {
        self.enrage = enrage.clamp(Fixed::ZERO, ENRAGE_MAX);
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> DirectorPhase {
        self.phase
    }

    /// Run one evaluation.
    ///
    /// Mana has already accrued for this tick. Returns the units to spawn
    /// this tick, in order.
    pub fn tick(
        &mut self,
        delta: Fixed,
        table: &[SummonEvent],
        mana: &mut ManaPool,
        rng: &mut ChaCha8Rng,
        events: &mut TickEvents,
    ) -> Vec<SpawnRequest> {
        self.enrage = self
            .enrage
            .saturating_add(self.settings.enrage_per_second.saturating_mul(delta))
            .clamp(Fixed::ZERO, ENRAGE_MAX);

        let mut requests = Vec::new();

        if self.phase == DirectorPhase::Choosing {
            self.choose(table, rng, events);
        }

        if let DirectorPhase::AwaitingMana { event, cost } = self.phase {
            if mana.spend(cost).is_err() {
                return requests;
            }
            tracing::debug!(event = event, cost, "opponent summon paid");
            events.push(GameEvent::ManaSpent {
                side: Side::Enemy,
                amount: cost,
            });
            self.phase = DirectorPhase::Spawning {
                event,
                next_unit: 0,
                delay: Countdown::ELAPSED,
            };
        } else if let DirectorPhase::Spawning { delay, .. } = &mut self.phase {
            delay.advance(delta);
        }

        while let DirectorPhase::Spawning {
            event,
            next_unit,
            delay,
        } = self.phase
        {
            if !delay.is_elapsed() {
                break;
            }
            let Some(summon) = table.get(event) else {
                self.phase = DirectorPhase::Choosing;
                break;
            };
            let Some(template) = summon.units.get(next_unit) else {
                self.phase = DirectorPhase::Choosing;
                break;
            };

            requests.push(SpawnRequest {
                template: template.clone(),
                position: self.spawn_point(rng),
            });

            let next_unit = next_unit + 1;
            self.phase = if next_unit >= summon.units.len() {
                tracing::debug!(event = %summon.name, "opponent summon complete");
                DirectorPhase::Choosing
            } else {
                DirectorPhase::Spawning {
                    event,
                    next_unit,
                    delay: Countdown::start(self.settings.inter_unit_delay),
                }
            };
        }

        requests
    }

    fn choose(&mut self, table: &[SummonEvent], rng: &mut ChaCha8Rng, events: &mut TickEvents) {
        let Some(index) = pick_next_summon_event(table, self.enrage, rng) else {
            tracing::trace!(enrage = %self.enrage, "no eligible summon event");
            return;
        };
        let Some(event) = table.get(index) else {
            return;
        };

        let variance = event.cost_variance.max(0);
        let roll = if variance > 0 {
            rng.gen_range(-variance..=variance)
        } else {
            0
        };
        let cost = event.cost.saturating_add(roll).max(0);

        tracing::debug!(event = %event.name, cost, enrage = %self.enrage, "opponent chose summon event");
        events.push(GameEvent::SummonEventChosen {
            name: event.name.clone(),
            cost,
        });
        self.phase = DirectorPhase::AwaitingMana {
            event: index,
            cost,
        };
    }

    fn spawn_point(&self, rng: &mut ChaCha8Rng) -> Vec2Fixed {
        let dx = jitter(self.settings.summon_area.x, rng);
        let dy = jitter(self.settings.summon_area.y, rng);
        self.settings.anchor + Vec2Fixed::new(dx, dy)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::economy::ManaSettings;

    fn event(name: &str, units: &[&str], cost: i32, weight: i32) -> SummonEvent {
        SummonEvent {
            name: name.to_string(),
            units: units.iter().map(ToString::to_string).collect(),
            cost,
            cost_variance: 0,
            enrage_min: Fixed::ZERO,
            enrage_max: ENRAGE_MAX,
            weight: Fixed::from_num(weight),
        }
    }

    fn still_settings() -> DirectorSettings {
        DirectorSettings {
            anchor: Vec2Fixed::from_ints(10, 0),
            summon_area: Vec2Fixed::ZERO,
            inter_unit_delay: Fixed::ONE,
            starting_enrage: Fixed::ZERO,
            enrage_per_second: Fixed::ZERO,
        }
    }

    #[test]
    fn test_pick_weighted_boundaries() {
        let table = vec![event("a", &["x"], 0, 1), event("b", &["x"], 0, 3)];
        assert_eq!(pick_weighted(&table, Fixed::ZERO, Fixed::ZERO), Some(0));
        // Exact boundary goes to the earlier entry.
        assert_eq!(pick_weighted(&table, Fixed::ZERO, Fixed::ONE), Some(0));
        assert_eq!(pick_weighted(&table, Fixed::ZERO, Fixed::from_num(1.5)), Some(1));
    }

    #[test]
    fn test_nothing_eligible_idles() {
        let mut late = event("late", &["x"], 0, 1);
        late.enrage_min = Fixed::from_num(50);
        let table = vec![late];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(pick_next_summon_event(&table, Fixed::ZERO, &mut rng), None);

        let mut director = Director::new(still_settings());
        let mut mana = ManaPool::new(ManaSettings::default());
        let mut events = TickEvents::default();
        let spawned = director.tick(Fixed::ONE, &table, &mut mana, &mut rng, &mut events);
        assert!(spawned.is_empty());
        assert_eq!(director.phase(), DirectorPhase::Choosing);
    }

    #[test]
    fn test_units_spawn_one_per_delay() {
        let table = vec![event("pair", &["a", "b"], 0, 1)];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut director = Director::new(still_settings());
        let mut mana = ManaPool::new(ManaSettings::default());
        let mut events = TickEvents::default();
        let half = Fixed::from_num(0.5);

        let first = director.tick(half, &table, &mut mana, &mut rng, &mut events);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].template, "a");
        assert_eq!(first[0].position, Vec2Fixed::from_ints(10, 0));

        assert!(director
            .tick(half, &table, &mut mana, &mut rng, &mut events)
            .is_empty());
        let second = director.tick(half, &table, &mut mana, &mut rng, &mut events);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].template, "b");
        assert_eq!(director.phase(), DirectorPhase::Choosing);
    }

    #[test]
    fn test_jitter_stays_in_area() {
        let mut settings = still_settings();
        settings.summon_area = Vec2Fixed::from_ints(1, 2);
        settings.inter_unit_delay = Fixed::ZERO;
        let table = vec![event("horde", &["a"; 16], 0, 1)];
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut director = Director::new(settings);
        let mut mana = ManaPool::new(ManaSettings::default());
        let mut events = TickEvents::default();

        let spawned = director.tick(Fixed::ONE, &table, &mut mana, &mut rng, &mut events);
        assert_eq!(spawned.len(), 16);
        for request in &spawned {
            let offset = request.position - settings.anchor;
            assert!(offset.x.abs() <= Fixed::ONE);
            assert!(offset.y.abs() <= Fixed::from_num(2));
        }
    }

    #[test]
    fn test_enrage_rises_and_clamps() {
        let mut settings = still_settings();
        settings.enrage_per_second = Fixed::from_num(30);
        let mut director = Director::new(settings);
        let mut mana = ManaPool::new(ManaSettings::default());
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut events = TickEvents::default();

        for _ in 0..5 {
            director.tick(Fixed::ONE, &[], &mut mana, &mut rng, &mut events);
        }
        assert_eq!(director.enrage(), ENRAGE_MAX);

        director.set_enrage(Fixed::from_num(-5));
        assert_eq!(director.enrage(), Fixed::ZERO);
    }
}
