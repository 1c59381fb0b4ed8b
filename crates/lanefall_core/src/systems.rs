//! Engagement resolution.
//!
//! Each tick every live, unfrozen, non-HQ entity is evaluated in registry
//! scan order (player list, then enemy list). For one entity the order is
//! fixed: target loss, target acquisition, range check, then either the
//! attack cadence or movement. Later entities see the positions and health
//! left behind by earlier ones in the same tick.

use crate::entity::EngagementState;
use crate::events::{GameEvent, TickEvents};
use crate::math::{Fixed, Vec2Fixed};
use crate::registry::{EntityId, EntityRegistry};
use crate::side::Side;

/// Run targeting, attacks and movement for every entity.
pub fn engagement_system(registry: &mut EntityRegistry, delta: Fixed, events: &mut TickEvents) {
    for id in registry.scan_order() {
        resolve_entity(registry, id, delta, events);
    }
}

/// Advance freezes and post-hit immunity windows.
///
/// Runs after [`engagement_system`] so a freeze applied this tick costs
/// the unit this tick's action.
pub fn status_system(registry: &mut EntityRegistry, delta: Fixed, events: &mut TickEvents) {
    for id in registry.scan_order() {
        let Some(entity) = registry.get_mut(id) else {
            continue;
        };
        if !entity.is_alive() {
            continue;
        }
        entity.health.tick(delta);
        if entity.advance_freeze(delta) {
            tracing::debug!(entity = id, "unfrozen");
            events.push(GameEvent::Unfrozen { entity: id });
        }
    }
}

/// First live opponent whose center lies within `radius` of `center`.
///
/// Walks the opposing list in spawn order and returns the first match, not
/// the closest one. A farther unit that spawned earlier wins over a
/// nearer one that spawned later.
#[must_use]
pub fn find_first_in_range(
    registry: &EntityRegistry,
    opponents: Side,
    center: Vec2Fixed,
    radius: Fixed,
) -> Option<(EntityId, Vec2Fixed)> {
    registry
        .side_entities(opponents)
        .filter(|candidate| candidate.is_alive())
        .map(|candidate| (candidate.id, candidate.center()))
        .find(|(_, candidate_center)| center.within(*candidate_center, radius))
}

/// Center of a live entity, or `None` if it is gone or dead.
fn live_center(registry: &EntityRegistry, id: EntityId) -> Option<Vec2Fixed> {
    registry
        .get(id)
        .filter(|entity| entity.is_alive())
        .map(|entity| entity.center())
}

fn resolve_entity(
    registry: &mut EntityRegistry,
    id: EntityId,
    delta: Fixed,
    events: &mut TickEvents,
) {
    let Some(entity) = registry.get(id) else {
        return;
    };
    if entity.hq || entity.is_frozen() || !entity.is_alive() {
        return;
    }
    let Some(attack) = entity.attack else {
        return;
    };
    let side = entity.side;
    let center = entity.center();
    let held = entity.target;

    let mut target = None;
    if let Some(target_id) = held {
        match live_center(registry, target_id) {
            Some(target_center) => target = Some((target_id, target_center)),
            None => lose_target(registry, id, events),
        }
    }

    if target.is_none() {
        if let Some((found, found_center)) =
            find_first_in_range(registry, side.opponent(), center, attack.detection_range)
        {
            if let Some(entity) = registry.get_mut(id) {
                entity.target = Some(found);
                entity.state = EngagementState::Approaching;
            }
            tracing::debug!(entity = id, target = found, "enemy detected");
            events.push(GameEvent::EnemyDetected {
                entity: id,
                target: Some(found),
            });
            target = Some((found, found_center));
        }
    }

    let Some(entity) = registry.get_mut(id) else {
        return;
    };

    let Some((target_id, target_center)) = target else {
        entity.step_movement(delta);
        return;
    };

    if !center.within(target_center, attack.attack_range) {
        if entity.state == EngagementState::Attacking {
            events.push(GameEvent::EnemyInRange {
                entity: id,
                target: None,
            });
        }
        entity.state = EngagementState::Approaching;
        entity.move_direction = target_center - center;
        entity.step_movement(delta);
        return;
    }

    if entity.state != EngagementState::Attacking {
        // The first swing lands one full attack delay after entering range.
        entity.state = EngagementState::Attacking;
        entity.cooldown = attack.attack_delay;
        events.push(GameEvent::EnemyInRange {
            entity: id,
            target: Some(target_id),
        });
        return;
    }

    entity.cooldown = (entity.cooldown - delta).max(Fixed::ZERO);
    if entity.cooldown > Fixed::ZERO {
        return;
    }
    entity.cooldown = attack.attack_delay;

    events.push(GameEvent::AttackFired {
        attacker: id,
        target: target_id,
    });
    apply_damage(registry, target_id, attack.damage, events);
}

fn lose_target(registry: &mut EntityRegistry, id: EntityId, events: &mut TickEvents) {
    let Some(entity) = registry.get_mut(id) else {
        return;
    };
    let was_attacking = entity.state == EngagementState::Attacking;
    entity.clear_target();

    tracing::debug!(entity = id, "detection lost");
    if was_attacking {
        events.push(GameEvent::EnemyInRange {
            entity: id,
            target: None,
        });
    }
    events.push(GameEvent::EnemyDetected {
        entity: id,
        target: None,
    });
}

/// Deal damage to an entity at its center.
///
/// A target that vanished or already died is skipped. A killing blow marks
/// the entity dead and queues it for removal at the next safe point.
pub fn apply_damage(
    registry: &mut EntityRegistry,
    target: EntityId,
    amount: u32,
    events: &mut TickEvents,
) {
    let Some(victim) = registry.get_mut(target) else {
        tracing::trace!(target, "damage skipped, target gone");
        return;
    };
    if !victim.is_alive() {
        return;
    }

    let outcome = victim.health.apply_damage(amount);
    let position = victim.center();
    if outcome.applied > 0 {
        events.push(GameEvent::DamageApplied {
            target,
            amount: outcome.applied,
            position,
        });
    }
    if outcome.died {
        victim.state = EngagementState::Dead;
        victim.freeze = None;
        tracing::debug!(entity = target, "died");
        events.push(GameEvent::Death { entity: target });
        registry.queue_despawn(target);
    }
}

/// Restore hit points to a live entity.
pub fn apply_heal(
    registry: &mut EntityRegistry,
    target: EntityId,
    amount: u32,
    events: &mut TickEvents,
) {
    let Some(entity) = registry.get_mut(target) else {
        return;
    };
    let healed = entity.health.heal(amount);
    if healed > 0 {
        events.push(GameEvent::Healed {
            target,
            amount: healed,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{AttackProfile, CombatEntity, EntitySpawnParams};
    use crate::health::Health;

    fn spawn(
        registry: &mut EntityRegistry,
        side: Side,
        x: i32,
        detection: i32,
        attack_range: i32,
    ) -> EntityId {
        let entity = CombatEntity::new(EntitySpawnParams {
            side: Some(side),
            position: Vec2Fixed::from_ints(x, 0),
            health: Some(Health::new(100)),
            attack: Some(AttackProfile::new(
                Fixed::from_num(detection),
                Fixed::from_num(attack_range),
                10,
                Fixed::ONE,
            )),
            move_speed: Fixed::ONE,
            bounds_size: Vec2Fixed::from_ints(1000, 1000),
            ..Default::default()
        })
        .unwrap();
        registry.queue_spawn(entity)
    }

    #[test]
    fn test_first_in_range_not_nearest() {
        let mut registry = EntityRegistry::new();
        let far = spawn(&mut registry, Side::Enemy, 9, 0, 0);
        let near = spawn(&mut registry, Side::Enemy, 2, 0, 0);
        registry.flush_spawns();

        let found = find_first_in_range(&registry, Side::Enemy, Vec2Fixed::ZERO, Fixed::from_num(10));
        assert_eq!(found.map(|(id, _)| id), Some(far));
        assert_ne!(found.map(|(id, _)| id), Some(near));
    }

    #[test]
    fn test_detection_fires_once() {
        let mut registry = EntityRegistry::new();
        let player = spawn(&mut registry, Side::Player, 0, 5, 1);
        let enemy = spawn(&mut registry, Side::Enemy, 4, 0, 0);
        registry.flush_spawns();

        let mut events = TickEvents::default();
        engagement_system(&mut registry, Fixed::from_num(0.125), &mut events);
        engagement_system(&mut registry, Fixed::from_num(0.125), &mut events);

        let detections = events
            .events
            .iter()
            .filter(|e| {
                matches!(e, GameEvent::EnemyDetected { entity, target: Some(t) }
                    if *entity == player && *t == enemy)
            })
            .count();
        assert_eq!(detections, 1);
        assert_eq!(
            registry.get(player).unwrap().state,
            EngagementState::Approaching
        );
    }

    #[test]
    fn test_first_attack_waits_one_delay() {
        let mut registry = EntityRegistry::new();
        spawn(&mut registry, Side::Player, 0, 5, 2);
        let enemy = spawn(&mut registry, Side::Enemy, 1, 0, 0);
        registry.flush_spawns();

        let delta = Fixed::from_num(0.25);
        let mut hit_ticks = Vec::new();
        for tick in 1..=9 {
            let mut events = TickEvents::default();
            engagement_system(&mut registry, delta, &mut events);
            if events.damage_to(enemy) > 0 {
                hit_ticks.push(tick);
            }
        }
        // Enters range on tick 1, then one swing per second.
        assert_eq!(hit_ticks, vec![5, 9]);
        assert_eq!(registry.get(enemy).unwrap().health.current(), 80);
    }

    #[test]
    fn test_killed_target_is_lost_next_tick() {
        let mut registry = EntityRegistry::new();
        let player = spawn(&mut registry, Side::Player, 0, 5, 2);
        let enemy = spawn(&mut registry, Side::Enemy, 1, 0, 0);
        registry.flush_spawns();
        if let Some(e) = registry.get_mut(enemy) {
            e.health = Health::new(10);
        }

        let delta = Fixed::from_num(0.25);
        for _ in 0..4 {
            let mut events = TickEvents::default();
            engagement_system(&mut registry, delta, &mut events);
            assert!(events.deaths().is_empty());
        }
        let mut events = TickEvents::default();
        engagement_system(&mut registry, delta, &mut events);
        assert_eq!(events.deaths(), vec![enemy]);
        registry.flush_despawns();

        let mut events = TickEvents::default();
        engagement_system(&mut registry, delta, &mut events);
        assert!(events.events.contains(&GameEvent::EnemyDetected {
            entity: player,
            target: None
        }));
        let unit = registry.get(player).unwrap();
        assert_eq!(unit.target, None);
        assert_eq!(unit.move_direction, Side::Player.default_heading());
    }

    #[test]
    fn test_frozen_entity_does_nothing() {
        let mut registry = EntityRegistry::new();
        let player = spawn(&mut registry, Side::Player, 0, 5, 2);
        spawn(&mut registry, Side::Enemy, 1, 0, 0);
        registry.flush_spawns();
        registry
            .get_mut(player)
            .unwrap()
            .freeze(Fixed::ONE, Fixed::ZERO);

        let mut events = TickEvents::default();
        engagement_system(&mut registry, Fixed::from_num(0.5), &mut events);
        status_system(&mut registry, Fixed::from_num(0.5), &mut events);
        assert!(events.events.is_empty());

        engagement_system(&mut registry, Fixed::from_num(0.5), &mut events);
        status_system(&mut registry, Fixed::from_num(0.5), &mut events);
        assert!(events.events.contains(&GameEvent::Unfrozen { entity: player }));
    }
}
