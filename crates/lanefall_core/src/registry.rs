//! Live entity registry.
//!
//! Entities are stored by id and indexed by two per-side lists in spawn
//! order. That order is the scan order used for target acquisition, so it
//! must be stable: it only changes at the safe points between scans, when
//! [`EntityRegistry::flush_spawns`] and [`EntityRegistry::flush_despawns`]
//! run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::CombatEntity;
use crate::side::Side;

/// Unique identifier for entities.
pub type EntityId = u64;

/// Owner of all live combat entities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityRegistry {
    entities: BTreeMap<EntityId, CombatEntity>,
    players: Vec<EntityId>,
    enemies: Vec<EntityId>,
    pending_spawns: Vec<CombatEntity>,
    pending_despawns: Vec<EntityId>,
    next_id: EntityId,
}

impl EntityRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Queue an entity to join at the next safe point. Returns its id.
    pub fn queue_spawn(&mut self, mut entity: CombatEntity) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        entity.id = id;
        self.pending_spawns.push(entity);
        id
    }

    /// Queue an entity for removal at the next safe point.
    pub fn queue_despawn(&mut self, id: EntityId) {
        if !self.pending_despawns.contains(&id) {
            self.pending_despawns.push(id);
        }
    }

    /// Move queued spawns into the registry. Returns the ids that joined.
    pub fn flush_spawns(&mut self) -> Vec<EntityId> {
        let mut joined = Vec::with_capacity(self.pending_spawns.len());
        for entity in self.pending_spawns.drain(..) {
            let id = entity.id;
            match entity.side {
                Side::Player => self.players.push(id),
                Side::Enemy => self.enemies.push(id),
            }
            self.entities.insert(id, entity);
            joined.push(id);
        }
        joined
    }

    /// Remove queued despawns. Returns the entities that left.
    pub fn flush_despawns(&mut self) -> Vec<CombatEntity> {
        let mut removed = Vec::with_capacity(self.pending_despawns.len());
        for id in self.pending_despawns.drain(..) {
            if let Some(entity) = self.entities.remove(&id) {
                match entity.side {
                    Side::Player => self.players.retain(|&p| p != id),
                    Side::Enemy => self.enemies.retain(|&e| e != id),
                }
                removed.push(entity);
            }
        }
        removed
    }

    /// Get an entity by id.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&CombatEntity> {
        self.entities.get(&id)
    }

    /// Get a mutable reference to an entity by id.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut CombatEntity> {
        self.entities.get_mut(&id)
    }

    /// Check if an entity is live in the registry.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Ids of one side in spawn order.
    #[must_use]
    pub fn side_ids(&self, side: Side) -> &[EntityId] {
        match side {
            Side::Player => &self.players,
            Side::Enemy => &self.enemies,
        }
    }

    /// All ids in scan order: player list, then enemy list.
    #[must_use]
    pub fn scan_order(&self) -> Vec<EntityId> {
        self.players.iter().chain(self.enemies.iter()).copied().collect()
    }

    /// Live entities of one side in spawn order.
    pub fn side_entities(&self, side: Side) -> impl Iterator<Item = &CombatEntity> {
        self.side_ids(side)
            .iter()
            .filter_map(|id| self.entities.get(id))
    }

    /// Iterate over all live entities in id order.
    pub fn iter(&self) -> impl Iterator<Item = &CombatEntity> {
        self.entities.values()
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if no entities are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of entities waiting for the next spawn flush.
    #[must_use]
    pub fn pending_spawn_count(&self) -> usize {
        self.pending_spawns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{AttackProfile, EntitySpawnParams};
    use crate::health::Health;
    use crate::math::{Fixed, Vec2Fixed};

    fn unit(side: Side) -> CombatEntity {
        CombatEntity::new(EntitySpawnParams {
            side: Some(side),
            health: Some(Health::new(10)),
            attack: Some(AttackProfile::new(Fixed::ONE, Fixed::ONE, 1, Fixed::ONE)),
            bounds_size: Vec2Fixed::from_ints(100, 100),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_spawns_are_deferred_until_flush() {
        let mut registry = EntityRegistry::new();
        let id = registry.queue_spawn(unit(Side::Player));
        assert!(!registry.contains(id));
        assert_eq!(registry.pending_spawn_count(), 1);

        assert_eq!(registry.flush_spawns(), vec![id]);
        assert!(registry.contains(id));
        assert_eq!(registry.side_ids(Side::Player), &[id]);
    }

    #[test]
    fn test_scan_order_is_players_then_enemies() {
        let mut registry = EntityRegistry::new();
        let e1 = registry.queue_spawn(unit(Side::Enemy));
        let p1 = registry.queue_spawn(unit(Side::Player));
        let e2 = registry.queue_spawn(unit(Side::Enemy));
        registry.flush_spawns();

        assert_eq!(registry.scan_order(), vec![p1, e1, e2]);
    }

    #[test]
    fn test_despawn_removes_from_side_list() {
        let mut registry = EntityRegistry::new();
        let a = registry.queue_spawn(unit(Side::Enemy));
        let b = registry.queue_spawn(unit(Side::Enemy));
        registry.flush_spawns();

        registry.queue_despawn(a);
        registry.queue_despawn(a);
        assert!(registry.contains(a));

        let removed = registry.flush_despawns();
        assert_eq!(removed.len(), 1);
        assert!(!registry.contains(a));
        assert_eq!(registry.side_ids(Side::Enemy), &[b]);
    }
}
