//! Replay system for recording and playing back matches.
//!
//! A replay stores the match configuration (which carries the RNG seed)
//! and, for every tick, the wall-clock delta and the player commands issued
//! just before it. Feeding the same frames to a fresh [`Simulation`]
//! recreates the match exactly, which [`ReplayPlayer::verify`] checks
//! against the recorded final hash.

use serde::{Deserialize, Serialize};

use crate::data::MatchConfig;
use crate::error::{GameError, Result};
use crate::events::TickEvents;
use crate::math::{fixed_serde, Fixed, Vec2Fixed};
use crate::placement::SummonTicket;
use crate::simulation::Simulation;

/// Replay format version for compatibility.
pub const REPLAY_VERSION: u32 = 1;

/// An input the player can give between ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerCommand {
    /// Play a card from the hand at a point.
    Summon {
        /// Hand instance id.
        instance: u32,
        /// Target point.
        point: Vec2Fixed,
    },
    /// Withdraw a queued summon.
    Cancel(SummonTicket),
    /// Draw an extra card.
    Draw,
    /// Change the time scale.
    SetTimeScale(#[serde(with = "fixed_serde")] Fixed),
}

impl PlayerCommand {
    /// Apply the command. Rejections are part of normal play and only logged.
    pub fn apply(&self, sim: &mut Simulation) {
        match self {
            Self::Summon { instance, point } => {
                if let Err(reason) = sim.submit_summon(*instance, *point) {
                    tracing::debug!(instance, %reason, "replayed summon rejected");
                }
            }
            Self::Cancel(ticket) => {
                if let Err(reason) = sim.cancel_summon(*ticket) {
                    tracing::debug!(?ticket, %reason, "replayed cancel rejected");
                }
            }
            Self::Draw => {
                sim.draw_card();
            }
            Self::SetTimeScale(scale) => sim.set_time_scale(*scale),
        }
    }
}

/// Commands and delta for one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayFrame {
    /// Wall-clock delta passed to [`Simulation::tick`].
    #[serde(with = "fixed_serde")]
    pub delta: Fixed,
    /// Commands applied before the tick, in order.
    pub commands: Vec<PlayerCommand>,
}

/// Complete replay data structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replay {
    /// Replay format version.
    pub version: u32,
    /// Configuration the match was created from.
    pub config: MatchConfig,
    /// One frame per tick call.
    pub frames: Vec<ReplayFrame>,
    /// Final state hash for verification.
    pub final_hash: u64,
}

impl Replay {
    /// Start an empty replay for a match configuration.
    #[must_use]
    pub fn new(config: MatchConfig) -> Self {
        Self {
            version: REPLAY_VERSION,
            config,
            frames: Vec::new(),
            final_hash: 0,
        }
    }

    /// Apply `commands`, tick the simulation and record the frame.
    pub fn record(
        &mut self,
        sim: &mut Simulation,
        delta: Fixed,
        commands: Vec<PlayerCommand>,
    ) -> TickEvents {
        for command in &commands {
            command.apply(sim);
        }
        let events = sim.tick(delta);
        self.frames.push(ReplayFrame { delta, commands });
        events
    }

    /// Seal the replay with the simulation's final state.
    pub fn finalize(&mut self, sim: &Simulation) {
        self.final_hash = sim.state_hash();
    }

    /// Seed of the recorded match.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.config.seed
    }

    /// Number of recorded frames.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Total number of recorded commands.
    #[must_use]
    pub fn command_count(&self) -> usize {
        self.frames.iter().map(|f| f.commands.len()).sum()
    }

    /// Encode the replay as bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize replay: {e}")))
    }

    /// Decode a replay, rejecting other format versions.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding fails or the version does not match.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let replay: Self = bincode::deserialize(bytes)
            .map_err(|e| GameError::InvalidState(format!("Failed to deserialize replay: {e}")))?;

        if replay.version != REPLAY_VERSION {
            return Err(GameError::InvalidState(format!(
                "Replay version mismatch: expected {REPLAY_VERSION}, got {}",
                replay.version
            )));
        }

        Ok(replay)
    }

    /// Build the simulation the replay starts from.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored configuration is invalid.
    pub fn restore_initial_state(&self) -> Result<Simulation> {
        Simulation::new(self.config.clone())
    }
}

/// Replay playback controller.
#[derive(Debug)]
pub struct ReplayPlayer {
    replay: Replay,
    simulation: Simulation,
    frame: usize,
    /// Whether playback is paused.
    pub paused: bool,
}

impl ReplayPlayer {
    /// Create a player positioned before the first frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial state cannot be restored.
    pub fn new(replay: Replay) -> Result<Self> {
        let simulation = replay.restore_initial_state()?;
        Ok(Self {
            replay,
            simulation,
            frame: 0,
            paused: false,
        })
    }

    /// Play one frame. Returns true while frames remain.
    pub fn advance(&mut self) -> bool {
        if self.paused || self.is_finished() {
            return !self.is_finished();
        }
        self.play_frame();
        !self.is_finished()
    }

    fn play_frame(&mut self) {
        let Some(frame) = self.replay.frames.get(self.frame) else {
            return;
        };
        for command in &frame.commands {
            command.apply(&mut self.simulation);
        }
        self.simulation.tick(frame.delta);
        self.frame += 1;
    }

    /// Restart and play up to `target` frames.
    ///
    /// # Errors
    ///
    /// Returns an error if state restoration fails.
    pub fn seek(&mut self, target: usize) -> Result<()> {
        self.simulation = self.replay.restore_initial_state()?;
        self.frame = 0;
        while self.frame < target && !self.is_finished() {
            self.play_frame();
        }
        Ok(())
    }

    /// Frames played so far.
    #[must_use]
    pub const fn current_frame(&self) -> usize {
        self.frame
    }

    /// The simulation being played.
    #[must_use]
    pub const fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// The replay being played.
    #[must_use]
    pub const fn replay(&self) -> &Replay {
        &self.replay
    }

    /// Whether every frame has been played.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.frame >= self.replay.frames.len()
    }

    /// Play the whole replay from the start and compare final hashes.
    ///
    /// # Errors
    ///
    /// Returns an error if state restoration fails.
    pub fn verify(&mut self) -> Result<bool> {
        self.seek(self.replay.frames.len())?;
        Ok(self.simulation.state_hash() == self.replay.final_hash)
    }

    /// Toggle pause state.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }
}
