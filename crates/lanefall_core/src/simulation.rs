//! Core match loop.
//!
//! [`Simulation`] owns every piece of match state (entity registry, both
//! mana pools, the opponent director, the player's draw queue and hand,
//! the pending placements and the match RNG) and advances all of it with
//! one explicit [`Simulation::tick`] call per frame.
//!
//! # Determinism
//!
//! - No floating-point math (uses fixed-point via [`Fixed`])
//! - One seeded RNG, owned by the match and serialized with it
//! - Registry scan order is spawn order and only changes at safe points
//! - Same config, deltas and commands always produce the same match
//!
//! # Example
//!
//! ```
//! use lanefall_core::data::MatchConfig;
//! use lanefall_core::math::Fixed;
//! use lanefall_core::simulation::Simulation;
//!
//! let mut sim = Simulation::new(MatchConfig::default()).unwrap();
//! let events = sim.tick(Fixed::from_num(0.05));
//! assert_eq!(sim.tick_count(), 1);
//! assert!(!events.is_empty());
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::data::{CardEffect, MatchConfig, TemplateRegistry};
use crate::deck::{Deck, DrawQueue, Hand, HandCard};
use crate::director::Director;
use crate::economy::{EconomyError, ManaPool};
use crate::entity::CombatEntity;
use crate::error::{GameError, Result};
use crate::events::{GameEvent, TickEvents};
use crate::math::{fixed_serde, Fixed, Rect, Vec2Fixed};
use crate::placement::{PendingSummon, PlacementQueue, SummonRejection, SummonTicket};
use crate::registry::{EntityId, EntityRegistry};
use crate::side::Side;
use crate::spells::cast_spell;
use crate::systems::{engagement_system, status_system};

/// Build a combat entity from a named template.
fn build_unit(
    templates: &TemplateRegistry,
    lane: Rect,
    side: Side,
    name: &str,
    position: Vec2Fixed,
) -> Result<CombatEntity> {
    let template = templates.template_by_name(name)?;
    CombatEntity::new(template.spawn_params(side, position, lane))
}

/// The full state of one match.
///
/// # Tick Order
///
/// 1. **Economy** - both pools accrue
/// 2. **Director** - opponent picks, pays for and requests units
/// 3. **Placement** - queued player summons spend and spawn or cast
/// 4. **Safe point** - pending spawns join the registry
/// 5. **Engagement** - targeting, range, attacks, movement
/// 6. **Status** - freezes and immunity windows advance
/// 7. **Safe point** - dead entities leave the registry
/// 8. **Hand** - overflow cards drift toward the discard point
/// 9. **Outcome** - a fallen HQ ends the match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    config: MatchConfig,
    templates: TemplateRegistry,
    registry: EntityRegistry,
    player_mana: ManaPool,
    enemy_mana: ManaPool,
    director: Director,
    draw_queue: DrawQueue,
    hand: Hand,
    placement: PlacementQueue,
    rng: ChaCha8Rng,
    #[serde(with = "fixed_serde")]
    time_scale: Fixed,
    #[serde(with = "fixed_serde")]
    elapsed: Fixed,
    tick: u64,
    outcome: Option<Side>,
    outbox: Vec<GameEvent>,
}

impl Simulation {
    /// Set up a match: validate the config, place HQs and deal the opening hand.
    ///
    /// # Errors
    ///
    /// Returns any configuration error found by [`MatchConfig::validate`].
    pub fn new(config: MatchConfig) -> Result<Self> {
        config.validate()?;
        let templates = config.templates()?;
        let deck = Deck::new(config.deck.clone(), &templates)?;

        let mut sim = Self {
            registry: EntityRegistry::new(),
            player_mana: ManaPool::new(config.player_mana),
            enemy_mana: ManaPool::new(config.enemy_mana),
            director: Director::new(config.director),
            draw_queue: DrawQueue::new(&deck),
            hand: Hand::new(config.hand),
            placement: PlacementQueue::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            time_scale: config.time_scale,
            elapsed: Fixed::ZERO,
            tick: 0,
            outcome: None,
            outbox: Vec::new(),
            templates,
            config,
        };

        for hq in &sim.config.headquarters {
            let entity = build_unit(
                &sim.templates,
                sim.config.lane,
                hq.side,
                &hq.template,
                hq.position,
            )?;
            sim.registry.queue_spawn(entity);
        }
        sim.registry.flush_spawns();

        while !sim.hand.is_full() {
            if sim.draw_card().is_none() {
                break;
            }
        }

        tracing::info!(seed = sim.config.seed, "match created");
        Ok(sim)
    }

    /// Number of ticks that actually advanced the match.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Scaled match time in seconds.
    #[must_use]
    pub const fn elapsed(&self) -> Fixed {
        self.elapsed
    }

    /// The configuration the match was built from.
    #[must_use]
    pub const fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Read-only template and card lookup.
    #[must_use]
    pub const fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// Live entities.
    #[must_use]
    pub const fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Look up a live entity.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&CombatEntity> {
        self.registry.get(id)
    }

    /// A side's mana pool.
    #[must_use]
    pub const fn mana(&self, side: Side) -> &ManaPool {
        match side {
            Side::Player => &self.player_mana,
            Side::Enemy => &self.enemy_mana,
        }
    }

    /// Add bonus mana to a side. Restarts that side's accrual ramp.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::NegativeAmount`] for a negative grant.
    pub fn grant_mana(&mut self, side: Side, amount: i32) -> std::result::Result<(), EconomyError> {
        match side {
            Side::Player => self.player_mana.grant(amount),
            Side::Enemy => self.enemy_mana.grant(amount),
        }
    }

    /// The opponent director.
    #[must_use]
    pub const fn director(&self) -> &Director {
        &self.director
    }

    /// Override the opponent's enrage level (clamped to `[0, 100]`).
    pub fn set_enrage(&mut self, enrage: Fixed) {
        self.director.set_enrage(enrage);
    }

    /// The player's hand.
    #[must_use]
    pub const fn hand(&self) -> &Hand {
        &self.hand
    }

    /// The player's draw queue.
    #[must_use]
    pub const fn draw_queue(&self) -> &DrawQueue {
        &self.draw_queue
    }

    /// Summons waiting for the next tick.
    #[must_use]
    pub fn pending_summons(&self) -> &[PendingSummon] {
        self.placement.pending()
    }

    /// Current time scale.
    #[must_use]
    pub const fn time_scale(&self) -> Fixed {
        self.time_scale
    }

    /// Set the time scale. Negative values are treated as zero (paused).
    pub fn set_time_scale(&mut self, scale: Fixed) {
        self.time_scale = scale.max(Fixed::ZERO);
    }

    /// Winner, once an HQ has fallen.
    #[must_use]
    pub const fn outcome(&self) -> Option<Side> {
        self.outcome
    }

    /// Whether the match has been decided.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Draw one card into the hand (or its overflow area).
    ///
    /// The `CardDrawn` notification is delivered with the next tick.
    pub fn draw_card(&mut self) -> Option<HandCard> {
        let (card, overflow) = self.deal_card()?;
        self.outbox.push(GameEvent::CardDrawn {
            instance: card.instance,
            card_type: card.card_type.clone(),
            overflow,
        });
        Some(card)
    }

    fn deal_card(&mut self) -> Option<(HandCard, bool)> {
        let card_type = self.draw_queue.draw(&mut self.rng)?;
        Some(self.hand.receive(card_type))
    }

    /// Queue a card from the hand to be played at `point` on the next tick.
    ///
    /// Checks hand membership, the placement zone (unit cards only) and
    /// current affordability now; mana is spent when the summon resolves.
    ///
    /// # Errors
    ///
    /// Returns the [`SummonRejection`] describing why the card cannot be
    /// played.
    pub fn submit_summon(
        &mut self,
        instance: u32,
        point: Vec2Fixed,
    ) -> std::result::Result<SummonTicket, SummonRejection> {
        if self.outcome.is_some() {
            return Err(SummonRejection::MatchOver);
        }
        let card = self
            .hand
            .get(instance)
            .ok_or(SummonRejection::CardNotInHand(instance))?;
        if self.placement.is_pending(instance) {
            return Err(SummonRejection::CardAlreadyPending(instance));
        }
        let template = self
            .templates
            .card_by_type(&card.card_type)
            .map_err(|_| SummonRejection::UnknownCard(card.card_type.clone()))?;
        if template.is_summon() && !self.config.placement_zone.contains(point) {
            return Err(SummonRejection::OutsidePlacementZone);
        }
        if !self.player_mana.can_afford(template.cost) {
            return Err(SummonRejection::InsufficientMana {
                required: template.cost,
                available: self.player_mana.current(),
            });
        }

        let card_type = card.card_type.clone();
        let ticket = self.placement.submit(instance, card_type, point);
        tracing::debug!(?ticket, instance, "summon queued");
        Ok(ticket)
    }

    /// Withdraw a queued summon before it resolves. Nothing is refunded
    /// because nothing was spent.
    ///
    /// # Errors
    ///
    /// Returns [`SummonRejection::UnknownTicket`] if the summon already
    /// resolved or never existed.
    pub fn cancel_summon(
        &mut self,
        ticket: SummonTicket,
    ) -> std::result::Result<(), SummonRejection> {
        self.placement.cancel(ticket)?;
        tracing::debug!(?ticket, "summon cancelled");
        Ok(())
    }

    /// Advance the match by `delta` seconds of wall time.
    ///
    /// `delta` is multiplied by the time scale before anything sees it. A
    /// zero scaled delta, or a decided match, makes the call a no-op that
    /// does not advance the tick counter.
    pub fn tick(&mut self, delta: Fixed) -> TickEvents {
        let mut events = TickEvents::default();
        if self.outcome.is_some() {
            return events;
        }
        let delta = delta.saturating_mul(self.time_scale);
        if delta <= Fixed::ZERO {
            return events;
        }

        self.tick += 1;
        self.elapsed = self.elapsed.saturating_add(delta);
        events.events.append(&mut self.outbox);

        // 1. Economy
        self.player_mana.accrue(delta);
        self.enemy_mana.accrue(delta);

        // 2. Director
        let requests = self.director.tick(
            delta,
            &self.config.summon_events,
            &mut self.enemy_mana,
            &mut self.rng,
            &mut events,
        );
        for request in requests {
            match build_unit(
                &self.templates,
                self.config.lane,
                Side::Enemy,
                &request.template,
                request.position,
            ) {
                Ok(entity) => {
                    self.registry.queue_spawn(entity);
                }
                Err(e) => tracing::warn!(error = %e, "opponent spawn skipped"),
            }
        }

        // 3. Player placement
        self.resolve_placements(&mut events);

        // 4. Safe point: spawns
        for id in self.registry.flush_spawns() {
            if let Some(entity) = self.registry.get(id) {
                events.push(GameEvent::Spawned {
                    entity: id,
                    side: entity.side,
                    template: entity.template.clone(),
                    position: entity.position,
                });
            }
        }

        // 5-6. Engagement and status
        engagement_system(&mut self.registry, delta, &mut events);
        status_system(&mut self.registry, delta, &mut events);

        // 7. Safe point: despawns
        for entity in self.registry.flush_despawns() {
            events.push(GameEvent::Despawned { entity: entity.id });
            if entity.hq && self.outcome.is_none() {
                self.outcome = Some(entity.side.opponent());
            }
        }

        // 8. Hand overflow
        for card in self.hand.advance_overflow(delta) {
            events.push(GameEvent::CardDiscarded {
                instance: card.instance,
                card_type: card.card_type,
            });
        }

        // 9. Outcome
        if let Some(winner) = self.outcome {
            tracing::info!(%winner, tick = self.tick, "match over");
            events.push(GameEvent::MatchOver { winner });
        }

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::trace!(tick = self.tick, state_hash = hash, "simulation state hash");
        }

        events
    }

    fn resolve_placements(&mut self, events: &mut TickEvents) {
        for pending in self.placement.drain() {
            match self.resolve_summon(&pending, events) {
                Ok(()) => events.push(GameEvent::SummonResolved {
                    ticket: pending.ticket,
                    card_type: pending.card_type,
                }),
                Err(reason) => {
                    tracing::debug!(ticket = ?pending.ticket, %reason, "summon rejected");
                    events.push(GameEvent::SummonRejected {
                        ticket: pending.ticket,
                        reason,
                    });
                }
            }
        }
    }

    fn resolve_summon(
        &mut self,
        pending: &PendingSummon,
        events: &mut TickEvents,
    ) -> std::result::Result<(), SummonRejection> {
        if self.hand.get(pending.instance).is_none() {
            return Err(SummonRejection::CardNotInHand(pending.instance));
        }
        let card = self
            .templates
            .card_by_type(&pending.card_type)
            .map_err(|_| SummonRejection::UnknownCard(pending.card_type.clone()))?
            .clone();

        let available = self.player_mana.current();
        self.player_mana
            .spend(card.cost)
            .map_err(|_| SummonRejection::InsufficientMana {
                required: card.cost,
                available,
            })?;
        events.push(GameEvent::ManaSpent {
            side: Side::Player,
            amount: card.cost,
        });
        self.hand.take(pending.instance);

        match card.effect {
            CardEffect::Summon {
                unit,
                count,
                spacing,
            } => {
                let span = spacing
                    .saturating_mul(Fixed::saturating_from_num(count.saturating_sub(1)))
                    / Fixed::from_num(2);
                for index in 0..count {
                    let offset = spacing.saturating_mul(Fixed::saturating_from_num(index)) - span;
                    let position = pending.point + Vec2Fixed::new(Fixed::ZERO, offset);
                    match build_unit(&self.templates, self.config.lane, Side::Player, &unit, position)
                    {
                        Ok(entity) => {
                            self.registry.queue_spawn(entity);
                        }
                        Err(e) => tracing::warn!(error = %e, "player spawn skipped"),
                    }
                }
            }
            CardEffect::Spell { radius, effect } => {
                cast_spell(
                    &mut self.registry,
                    Side::Player,
                    pending.point,
                    radius,
                    effect,
                    events,
                );
            }
        }

        if let Some((drawn, overflow)) = self.deal_card() {
            events.push(GameEvent::CardDrawn {
                instance: drawn.instance,
                card_type: drawn.card_type,
                overflow,
            });
        }
        Ok(())
    }

    /// Calculate a deterministic hash of the simulation state.
    ///
    /// Used to verify that two runs (or a replay) stayed in lockstep.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.tick.hash(&mut hasher);
        self.elapsed.to_bits().hash(&mut hasher);
        self.outcome.hash(&mut hasher);
        self.rng.get_word_pos().hash(&mut hasher);

        for side in Side::ALL {
            let snapshot = self.mana(side).snapshot();
            snapshot.current.hash(&mut hasher);
            snapshot.elapsed.to_bits().hash(&mut hasher);
        }

        self.director.enrage().to_bits().hash(&mut hasher);
        self.director.phase().hash(&mut hasher);

        self.registry.len().hash(&mut hasher);
        for entity in self.registry.iter() {
            entity.id.hash(&mut hasher);
            entity.side.hash(&mut hasher);
            entity.position.hash(&mut hasher);
            entity.health.current().hash(&mut hasher);
            entity.state.hash(&mut hasher);
            entity.target.hash(&mut hasher);
            entity.cooldown.to_bits().hash(&mut hasher);
            entity
                .freeze
                .map(|f| f.remaining().to_bits())
                .hash(&mut hasher);
        }

        for card in self.hand.cards() {
            card.hash(&mut hasher);
        }
        for pending in self.hand.overflow() {
            pending.card.hash(&mut hasher);
            pending.position.hash(&mut hasher);
        }
        self.draw_queue.remaining().hash(&mut hasher);

        hasher.finish()
    }

    /// Serialize the whole match for save/resume or replay seeking.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize simulation: {e}")))
    }

    /// Restore a match serialized with [`serialize`](Self::serialize).
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| GameError::InvalidState(format!("Failed to deserialize simulation: {e}")))
    }
}
