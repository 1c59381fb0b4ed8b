//! Full-match tests: outcome, hand flow, determinism and replays.

use lanefall_core::data::{CardEffect, CardTemplate, MatchConfig, SpellEffect};
use lanefall_core::deck::{Deck, DrawQueue, DECK_SIZE};
use lanefall_core::events::GameEvent;
use lanefall_core::math::{Fixed, Vec2Fixed};
use lanefall_core::replay::{PlayerCommand, Replay, ReplayPlayer};
use lanefall_core::side::Side;
use lanefall_core::simulation::Simulation;
use lanefall_test_utils::determinism::strategies::{arb_deltas, arb_seed};
use lanefall_test_utils::determinism::{
    find_first_divergence, run_parallel_matches, scripted_step, start_match,
    verify_match_determinism, verify_serialization_determinism,
};
use lanefall_test_utils::fixtures::{duel_config, fixed, fixed_f, ron_roundtrip, scripted_commands};
use lanefall_test_utils::proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// =============================================================================
// Draw queue
// =============================================================================

#[test]
fn test_draw_without_replacement() {
    let config = MatchConfig::default();
    let templates = config.templates().unwrap();
    let deck = Deck::new(config.deck.clone(), &templates).unwrap();
    let mut queue = DrawQueue::new(&deck);
    let mut rng = ChaCha8Rng::seed_from_u64(99);

    let mut drawn: Vec<String> = (0..DECK_SIZE).filter_map(|_| queue.draw(&mut rng)).collect();
    drawn.sort();
    let mut expected = config.deck.clone();
    expected.sort();
    assert_eq!(drawn, expected);
    assert_eq!(queue.cycles(), 1);
    assert_eq!(queue.remaining(), 0);

    assert!(queue.draw(&mut rng).is_some());
    assert_eq!(queue.cycles(), 2);
    assert_eq!(queue.remaining(), DECK_SIZE - 1);
}

#[test]
fn test_overflow_card_is_discarded() {
    let mut sim = start_match(&duel_config(100));
    assert!(sim.hand().is_full());
    let extra = sim.draw_card().unwrap();
    assert_eq!(sim.hand().overflow().len(), 1);

    let mut discarded = false;
    for _ in 0..40 {
        let events = sim.tick(fixed_f(0.125));
        discarded |= events.events.contains(&GameEvent::CardDiscarded {
            instance: extra.instance,
            card_type: extra.card_type.clone(),
        });
    }
    assert!(discarded);
    assert!(sim.hand().overflow().is_empty());
    assert_eq!(sim.hand().cards().len(), 4);
}

// =============================================================================
// Outcome
// =============================================================================

#[test]
fn test_destroying_enemy_hq_wins() {
    let mut sim = start_match(&duel_config(20));
    let card = sim.hand().cards()[0].instance;
    sim.submit_summon(card, Vec2Fixed::from_ints(17, 0)).unwrap();

    let mut over = None;
    for _ in 0..200 {
        let events = sim.tick(fixed_f(0.125));
        if let Some(GameEvent::MatchOver { winner }) = events
            .events
            .iter()
            .find(|e| matches!(e, GameEvent::MatchOver { .. }))
        {
            over = Some(*winner);
            break;
        }
    }
    assert_eq!(over, Some(Side::Player));
    assert_eq!(sim.outcome(), Some(Side::Player));

    let ticks = sim.tick_count();
    assert!(sim.tick(Fixed::ONE).is_empty());
    assert_eq!(sim.tick_count(), ticks);
}

#[test]
fn test_fireball_hits_only_opponents() {
    let mut config = duel_config(100);
    config.cards.push(CardTemplate {
        card_type: "fireball".to_string(),
        cost: 0,
        effect: CardEffect::Spell {
            radius: fixed(3),
            effect: SpellEffect::Damage(40),
        },
    });
    config.deck = vec!["fireball".to_string(); 8];
    let mut sim = start_match(&config);

    let card = sim.hand().cards()[0].instance;
    sim.submit_summon(card, Vec2Fixed::from_ints(19, 0)).unwrap();
    let events = sim.tick(fixed_f(0.125));

    let hqs: Vec<_> = sim.registry().iter().map(|e| (e.side, e.health.current())).collect();
    assert!(hqs.contains(&(Side::Enemy, 60)));
    assert!(hqs.contains(&(Side::Player, 100)));
    assert!(events
        .events
        .iter()
        .any(|e| matches!(e, GameEvent::SummonResolved { .. })));
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_scripted_match_is_deterministic() {
    verify_match_determinism(&MatchConfig::default(), 4, 600, fixed_f(0.05))
        .assert_deterministic();
}

#[test]
fn test_parallel_matches_agree() {
    run_parallel_matches(&MatchConfig::default(), 4, 400, fixed_f(0.0625)).assert_deterministic();
}

#[test]
fn test_no_divergence_in_scripted_match() {
    assert_eq!(
        find_first_divergence(&MatchConfig::default(), 300, fixed_f(0.1)),
        None
    );
}

#[test]
fn test_serialization_preserves_match() {
    assert!(verify_serialization_determinism(
        &MatchConfig::default(),
        150,
        fixed_f(0.0625)
    ));
}

#[test]
fn test_config_survives_ron() {
    let config = MatchConfig::default();
    assert_eq!(ron_roundtrip(&config), config);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Replaying recorded frames always reproduces the final hash.
    #[test]
    fn test_replay_reproduces_any_run(seed in arb_seed(), deltas in arb_deltas(120)) {
        let config = MatchConfig { seed, ..MatchConfig::default() };
        let mut sim = Simulation::new(config.clone()).unwrap();
        let mut replay = Replay::new(config);

        for (frame, delta) in deltas.iter().enumerate() {
            let mut commands = scripted_commands(&sim);
            if frame % 17 == 0 {
                commands.push(PlayerCommand::Draw);
            }
            replay.record(&mut sim, *delta, commands);
        }
        replay.finalize(&sim);

        let bytes = replay.to_bytes().unwrap();
        let mut player = ReplayPlayer::new(Replay::from_bytes(&bytes).unwrap()).unwrap();
        prop_assert!(player.verify().unwrap());
        prop_assert_eq!(player.simulation().state_hash(), sim.state_hash());
    }

    /// Pausing freezes everything, whatever has happened so far.
    #[test]
    fn test_pause_freezes_state(deltas in arb_deltas(60)) {
        let mut sim = start_match(&MatchConfig::default());
        for delta in &deltas {
            scripted_step(&mut sim, *delta);
        }
        sim.set_time_scale(Fixed::ZERO);
        let before = sim.state_hash();
        for delta in &deltas {
            sim.tick(*delta);
        }
        prop_assert_eq!(sim.state_hash(), before);
    }
}
