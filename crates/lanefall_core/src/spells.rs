//! Area spells cast from cards.

use crate::data::SpellEffect;
use crate::events::{GameEvent, TickEvents};
use crate::math::{Fixed, Vec2Fixed};
use crate::registry::EntityRegistry;
use crate::side::Side;
use crate::systems::{apply_damage, apply_heal};

/// Apply `effect` to every live unit whose center lies within `radius` of
/// `point`.
///
/// Damage and freeze hit the caster's opponents; heals hit the caster's
/// own side. Units are visited in spawn order. HQs shrug off freezes.
pub fn cast_spell(
    registry: &mut EntityRegistry,
    caster: Side,
    point: Vec2Fixed,
    radius: Fixed,
    effect: SpellEffect,
    events: &mut TickEvents,
) {
    let affected = match effect {
        SpellEffect::Heal(_) => caster,
        SpellEffect::Damage(_) | SpellEffect::Freeze { .. } => caster.opponent(),
    };
    let hit: Vec<_> = registry
        .side_entities(affected)
        .filter(|entity| entity.is_alive() && entity.center().within(point, radius))
        .map(|entity| entity.id)
        .collect();

    tracing::debug!(?effect, targets = hit.len(), "spell cast");

    for id in hit {
        match effect {
            SpellEffect::Damage(amount) => apply_damage(registry, id, amount, events),
            SpellEffect::Heal(amount) => apply_heal(registry, id, amount, events),
            SpellEffect::Freeze {
                shock,
                after_effect,
            } => {
                let frozen = registry
                    .get_mut(id)
                    .is_some_and(|entity| entity.freeze(shock, after_effect));
                if frozen {
                    events.push(GameEvent::Frozen { entity: id });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{AttackProfile, CombatEntity, EntitySpawnParams};
    use crate::health::Health;
    use crate::registry::EntityId;

    fn spawn(registry: &mut EntityRegistry, side: Side, x: i32, hq: bool) -> EntityId {
        let entity = CombatEntity::new(EntitySpawnParams {
            side: Some(side),
            position: Vec2Fixed::from_ints(x, 0),
            health: Some(Health::new(50)),
            attack: (!hq).then(|| AttackProfile::new(Fixed::ONE, Fixed::ONE, 1, Fixed::ONE)),
            bounds_size: Vec2Fixed::from_ints(100, 100),
            hq,
            ..Default::default()
        })
        .unwrap();
        registry.queue_spawn(entity)
    }

    #[test]
    fn test_damage_hits_only_opponents_in_radius() {
        let mut registry = EntityRegistry::new();
        let ally = spawn(&mut registry, Side::Player, 0, false);
        let near = spawn(&mut registry, Side::Enemy, 1, false);
        let far = spawn(&mut registry, Side::Enemy, 5, false);
        registry.flush_spawns();

        let mut events = TickEvents::default();
        cast_spell(
            &mut registry,
            Side::Player,
            Vec2Fixed::ZERO,
            Fixed::from_num(2),
            SpellEffect::Damage(20),
            &mut events,
        );
        assert_eq!(events.damage_to(near), 20);
        assert_eq!(events.damage_to(far), 0);
        assert_eq!(events.damage_to(ally), 0);
    }

    #[test]
    fn test_freeze_skips_hq() {
        let mut registry = EntityRegistry::new();
        let unit = spawn(&mut registry, Side::Enemy, 0, false);
        let hq = spawn(&mut registry, Side::Enemy, 1, true);
        registry.flush_spawns();

        let mut events = TickEvents::default();
        cast_spell(
            &mut registry,
            Side::Player,
            Vec2Fixed::ZERO,
            Fixed::from_num(3),
            SpellEffect::Freeze {
                shock: Fixed::ONE,
                after_effect: Fixed::ONE,
            },
            &mut events,
        );
        assert_eq!(events.events, vec![GameEvent::Frozen { entity: unit }]);
        assert!(!registry.get(hq).unwrap().is_frozen());
    }

    #[test]
    fn test_heal_targets_own_side() {
        let mut registry = EntityRegistry::new();
        let ally = spawn(&mut registry, Side::Player, 0, false);
        registry.flush_spawns();
        registry.get_mut(ally).unwrap().health.apply_damage(30);

        let mut events = TickEvents::default();
        cast_spell(
            &mut registry,
            Side::Player,
            Vec2Fixed::ZERO,
            Fixed::ONE,
            SpellEffect::Heal(100),
            &mut events,
        );
        assert_eq!(
            events.events,
            vec![GameEvent::Healed {
                target: ally,
                amount: 30
            }]
        );
    }
}
