//! Mana economy and health properties.

use lanefall_core::economy::{EconomyError, ManaPool, ManaSettings};
use lanefall_core::health::Health;
use lanefall_core::math::Fixed;
use lanefall_core::side::Side;
use lanefall_core::simulation::Simulation;
use lanefall_test_utils::fixtures::{bare_config, fixed};
use lanefall_test_utils::proptest::prelude::*;

fn pool(starting: i32) -> ManaPool {
    ManaPool::new(ManaSettings {
        starting,
        tick_amount: 1,
        interval: Fixed::ONE,
    })
}

// =============================================================================
// Accrual
// =============================================================================

proptest! {
    /// Any chunking of `N * interval` into exact sub-steps yields exactly N.
    #[test]
    fn test_accrual_is_chunking_invariant(intervals in 1u32..20, shift in 0u32..6) {
        let mut mana = pool(0);
        let step = Fixed::ONE >> shift;
        let steps = intervals << shift;
        for _ in 0..steps {
            mana.accrue(step);
        }
        prop_assert_eq!(mana.current(), i32::try_from(intervals).unwrap());
        prop_assert_eq!(mana.progress(), Fixed::ZERO);
    }

    /// Same property for intervals that are not powers of two: any step
    /// size, with the interval an exact multiple of it.
    #[test]
    fn test_accrual_exact_for_any_step(
        step_bits in 1i64..(1i64 << 34),
        chunks in 1i32..12,
        intervals in 1i32..8,
    ) {
        let step = Fixed::from_bits(step_bits);
        let mut mana = ManaPool::new(ManaSettings {
            starting: 0,
            tick_amount: 2,
            interval: step * fixed(chunks),
        });
        for _ in 0..chunks * intervals {
            mana.accrue(step);
        }
        prop_assert_eq!(mana.current(), 2 * intervals);
        prop_assert_eq!(mana.progress(), Fixed::ZERO);
    }

    /// Whole-second ticks against a whole-second interval.
    #[test]
    fn test_accrual_whole_seconds(interval in 1i32..10, intervals in 1i32..10) {
        let mut mana = ManaPool::new(ManaSettings {
            starting: 0,
            tick_amount: 1,
            interval: fixed(interval),
        });
        for _ in 0..interval * intervals {
            mana.accrue(Fixed::ONE);
        }
        prop_assert_eq!(mana.current(), intervals);
    }

    /// Spend never succeeds on a short balance and never leaves it negative.
    #[test]
    fn test_spend_never_overdraws(start in 0i32..50, costs in prop::collection::vec(0i32..20, 1..30)) {
        let mut mana = pool(start);
        for cost in costs {
            let before = mana.current();
            match mana.spend(cost) {
                Ok(()) => prop_assert_eq!(mana.current(), before - cost),
                Err(_) => {
                    prop_assert!(before < cost);
                    prop_assert_eq!(mana.current(), before);
                }
            }
            prop_assert!(mana.current() >= 0);
        }
    }

    /// Current hit points stay within [0, max] across any damage/heal mix.
    #[test]
    fn test_health_stays_clamped(
        max in 1u32..500,
        ops in prop::collection::vec((any::<bool>(), 0u32..200), 1..40),
    ) {
        let mut health = Health::new(max);
        let mut deaths = 0;
        for (is_damage, amount) in ops {
            if is_damage {
                if health.apply_damage(amount).died {
                    deaths += 1;
                }
            } else {
                health.heal(amount);
            }
            prop_assert!(health.current() <= health.max());
        }
        prop_assert!(deaths <= 1);
        prop_assert_eq!(deaths == 1, health.is_dead());
    }
}

#[test]
fn test_large_delta_grants_one_tick() {
    let mut mana = pool(0);
    assert_eq!(mana.accrue(fixed(5)), 1);
    assert_eq!(mana.current(), 1);
    assert_eq!(mana.progress(), Fixed::ZERO);
}

#[test]
fn test_match_accrues_on_interval_at_default_delta() {
    let mut config = bare_config();
    config.player_mana.starting = 0;
    config.player_mana.interval = fixed(3);
    let mut sim = Simulation::new(config).unwrap();
    let dt = Fixed::ONE >> 4;

    for _ in 0..47 {
        sim.tick(dt);
    }
    assert_eq!(sim.mana(Side::Player).current(), 0);
    sim.tick(dt);
    assert_eq!(sim.mana(Side::Player).current(), 1);

    for _ in 0..(30 * 16 - 48) {
        sim.tick(dt);
    }
    assert_eq!(sim.mana(Side::Player).current(), 10);
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_draw_and_play_scenario() {
    let mut mana = pool(3);
    assert!(mana.spend(2).is_ok());
    assert_eq!(mana.current(), 1);
    assert_eq!(
        mana.spend(2),
        Err(EconomyError::InsufficientResource {
            required: 2,
            available: 1
        })
    );
    assert_eq!(mana.current(), 1);
}

#[test]
fn test_death_fires_once() {
    let mut health = Health::new(30);
    assert!(!health.apply_damage(20).died);
    assert!(health.apply_damage(20).died);
    let after = health.apply_damage(20);
    assert!(!after.died);
    assert_eq!(after.applied, 0);
    assert_eq!(health.heal(10), 0);
    assert_eq!(health.current(), 0);
}
