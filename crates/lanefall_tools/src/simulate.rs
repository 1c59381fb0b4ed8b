//! Headless matches with a scripted player.
//!
//! The opponent is the regular director; the player side is driven by
//! [`ScriptedPlayer`], which plays the most expensive affordable card it
//! has a use for. Every run is recorded as a [`Replay`] so it can be saved
//! and checked later.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use lanefall_core::data::{CardEffect, MatchConfig, SpellEffect};
use lanefall_core::events::GameEvent;
use lanefall_core::math::{Fixed, Vec2Fixed};
use lanefall_core::registry::EntityId;
use lanefall_core::replay::{PlayerCommand, Replay, ReplayPlayer};
use lanefall_core::side::Side;
use lanefall_core::simulation::Simulation;
use serde::Serialize;

use crate::error::{ToolError, ToolResult};

/// Options for a headless run.
#[derive(Debug, Clone, Copy)]
pub struct SimulateOptions {
    /// Upper bound on ticks; the run stops early when the match ends.
    pub max_ticks: u64,
    /// Wall-clock seconds per tick.
    pub delta: Fixed,
    /// Override for the config's seed.
    pub seed: Option<u64>,
}

impl Default for SimulateOptions {
    fn default() -> Self {
        Self {
            max_ticks: 6000,
            delta: Fixed::ONE >> 4,
            seed: None,
        }
    }
}

/// Per-side tallies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SideSummary {
    /// Units that entered the battlefield.
    pub units_spawned: u32,
    /// Units (including HQs) that died.
    pub units_lost: u32,
    /// Total mana spent.
    pub mana_spent: i32,
    /// Mana left at the end.
    pub final_mana: i32,
}

/// JSON-friendly result of a headless run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    /// Seed the match ran with.
    pub seed: u64,
    /// Ticks that advanced the match.
    pub ticks: u64,
    /// Scaled match time in seconds.
    pub elapsed_seconds: f64,
    /// Winning side, if an HQ fell.
    pub winner: Option<Side>,
    /// Player tallies.
    pub player: SideSummary,
    /// Opponent tallies.
    pub enemy: SideSummary,
    /// Cards the player resolved.
    pub cards_played: u32,
    /// Player summons rejected at resolution.
    pub summons_rejected: u32,
    /// Summon events the director committed to.
    pub opponent_events_chosen: u32,
    /// Final enrage level.
    pub final_enrage: f64,
    /// Final state hash.
    pub final_hash: u64,
}

/// Simple player policy used for headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptedPlayer;

impl ScriptedPlayer {
    /// Commands to issue before the next tick.
    ///
    /// Waits while a summon is still pending. Unit cards go to the middle
    /// of the placement zone; damage and freeze spells aim at the first
    /// live opposing unit, heals at the first friendly unit. Spells with
    /// nothing to aim at are held.
    #[must_use]
    pub fn commands(self, sim: &Simulation) -> Vec<PlayerCommand> {
        if sim.is_over() || !sim.pending_summons().is_empty() {
            return Vec::new();
        }
        let available = sim.mana(Side::Player).current();

        let mut best: Option<(i32, u32, Vec2Fixed)> = None;
        for card in sim.hand().cards() {
            let Ok(template) = sim.templates().card_by_type(&card.card_type) else {
                continue;
            };
            if template.cost > available || best.is_some_and(|(cost, _, _)| cost >= template.cost) {
                continue;
            }
            let point = match &template.effect {
                CardEffect::Summon { .. } => Some(sim.config().placement_zone.center),
                CardEffect::Spell { effect, .. } => spell_target(sim, *effect),
            };
            if let Some(point) = point {
                best = Some((template.cost, card.instance, point));
            }
        }

        best.map(|(_, instance, point)| vec![PlayerCommand::Summon { instance, point }])
            .unwrap_or_default()
    }
}

fn spell_target(sim: &Simulation, effect: SpellEffect) -> Option<Vec2Fixed> {
    let side = match effect {
        SpellEffect::Heal(_) => Side::Player,
        SpellEffect::Damage(_) | SpellEffect::Freeze { .. } => Side::Enemy,
    };
    sim.registry()
        .side_entities(side)
        .find(|entity| !entity.hq && entity.is_alive())
        .map(|entity| entity.center())
}

/// Play a match to completion (or `max_ticks`) and record it.
///
/// # Errors
///
/// Returns an error if the configuration is rejected.
pub fn run_match(
    mut config: MatchConfig,
    options: SimulateOptions,
) -> lanefall_core::error::Result<(MatchSummary, Replay)> {
    if let Some(seed) = options.seed {
        config.seed = seed;
    }
    let mut sim = Simulation::new(config.clone())?;
    let mut replay = Replay::new(config);
    let player = ScriptedPlayer;
    let mut tally = Tally::default();
    for entity in sim.registry().iter() {
        tally.sides.insert(entity.id, entity.side);
    }

    while sim.tick_count() < options.max_ticks && !sim.is_over() {
        let before = sim.tick_count();
        let commands = player.commands(&sim);
        let events = replay.record(&mut sim, options.delta, commands);
        if sim.tick_count() == before {
            tracing::warn!("tick did not advance, stopping (time scale is zero?)");
            break;
        }
        for event in &events.events {
            tally.observe(event);
        }
    }
    replay.finalize(&sim);

    let summary = tally.finish(&sim);
    tracing::info!(
        ticks = summary.ticks,
        winner = ?summary.winner,
        hash = summary.final_hash,
        "headless match finished"
    );
    Ok((summary, replay))
}

#[derive(Debug, Default)]
struct Tally {
    player: SideSummary,
    enemy: SideSummary,
    cards_played: u32,
    summons_rejected: u32,
    opponent_events_chosen: u32,
    // Death events carry no side, so remember spawns by id.
    sides: BTreeMap<EntityId, Side>,
}

impl Tally {
    fn side_mut(&mut self, side: Side) -> &mut SideSummary {
        match side {
            Side::Player => &mut self.player,
            Side::Enemy => &mut self.enemy,
        }
    }

    fn observe(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Spawned { entity, side, .. } => {
                self.sides.insert(*entity, *side);
                self.side_mut(*side).units_spawned += 1;
            }
            GameEvent::Death { entity } => {
                if let Some(side) = self.sides.get(entity).copied() {
                    self.side_mut(side).units_lost += 1;
                }
            }
            GameEvent::ManaSpent { side, amount } => {
                self.side_mut(*side).mana_spent += amount;
            }
            GameEvent::SummonResolved { .. } => self.cards_played += 1,
            GameEvent::SummonRejected { .. } => self.summons_rejected += 1,
            GameEvent::SummonEventChosen { .. } => self.opponent_events_chosen += 1,
            _ => {}
        }
    }

    fn finish(mut self, sim: &Simulation) -> MatchSummary {
        self.player.final_mana = sim.mana(Side::Player).current();
        self.enemy.final_mana = sim.mana(Side::Enemy).current();
        MatchSummary {
            seed: sim.config().seed,
            ticks: sim.tick_count(),
            elapsed_seconds: sim.elapsed().to_num(),
            winner: sim.outcome(),
            player: self.player,
            enemy: self.enemy,
            cards_played: self.cards_played,
            summons_rejected: self.summons_rejected,
            opponent_events_chosen: self.opponent_events_chosen,
            final_enrage: sim.director().enrage().to_num(),
            final_hash: sim.state_hash(),
        }
    }
}

/// Render a summary as pretty JSON.
///
/// # Errors
///
/// Returns an error if JSON encoding fails.
pub fn summary_json(summary: &MatchSummary) -> ToolResult<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

/// Save a replay as bincode bytes.
///
/// # Errors
///
/// Returns an error if encoding or the write fails.
pub fn save_replay(replay: &Replay, path: &Path) -> ToolResult<()> {
    let bytes = replay.to_bytes().map_err(|e| ToolError::game(path, e))?;
    fs::write(path, bytes).map_err(|e| ToolError::io(path, e))
}

/// Load a replay, play it back and compare the final hash.
///
/// # Errors
///
/// Returns [`ToolError::ReplayMismatch`] if playback diverges, or an error
/// if the file cannot be read or decoded.
pub fn verify_replay_file(path: &Path) -> ToolResult<usize> {
    let bytes = fs::read(path).map_err(|e| ToolError::io(path, e))?;
    let replay = Replay::from_bytes(&bytes).map_err(|e| ToolError::game(path, e))?;
    let frames = replay.frame_count();
    let mut player = ReplayPlayer::new(replay).map_err(|e| ToolError::game(path, e))?;
    if player.verify().map_err(|e| ToolError::game(path, e))? {
        Ok(frames)
    } else {
        Err(ToolError::ReplayMismatch(path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_match_runs_and_spends() {
        let options = SimulateOptions {
            max_ticks: 800,
            ..SimulateOptions::default()
        };
        let (summary, replay) = run_match(MatchConfig::default(), options).unwrap();
        assert!(summary.ticks > 0 && summary.ticks <= 800);
        assert!(summary.cards_played > 0);
        assert!(summary.player.mana_spent > 0);
        assert_eq!(replay.frame_count() as u64, summary.ticks);
    }

    #[test]
    fn test_seed_override_is_used() {
        let options = SimulateOptions {
            max_ticks: 10,
            seed: Some(77),
            ..SimulateOptions::default()
        };
        let (summary, replay) = run_match(MatchConfig::default(), options).unwrap();
        assert_eq!(summary.seed, 77);
        assert_eq!(replay.seed(), 77);
    }

    #[test]
    fn test_scripted_player_waits_on_pending() {
        let mut sim = Simulation::new(MatchConfig::default()).unwrap();
        let first = ScriptedPlayer.commands(&sim);
        assert_eq!(first.len(), 1);
        first[0].apply(&mut sim);
        assert!(ScriptedPlayer.commands(&sim).is_empty());
    }

    #[test]
    fn test_summary_serializes() {
        let (summary, _) = run_match(
            MatchConfig::default(),
            SimulateOptions {
                max_ticks: 5,
                ..SimulateOptions::default()
            },
        )
        .unwrap();
        let json = summary_json(&summary).unwrap();
        assert!(json.contains("\"final_hash\""));
    }
}
