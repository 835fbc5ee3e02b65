//! The entity arena: sole owner of every simulated world object.

use bevy::prelude::*;
use std::collections::BTreeMap;

use crate::entities::{EntityBody, EntityKind, SimEntity};
use crate::shared::*;

/// Entities live in spawn order. Ids are never reused, even across
/// `clear`.
#[derive(Resource, Debug, Default)]
pub struct WorldEntities {
    next_id: u64,
    entities: Vec<SimEntity>,
}

impl WorldEntities {
    pub fn spawn(&mut self, pos: Vec2, body: EntityBody) -> EntityId {
        self.next_id += 1;
        let id = EntityId(self.next_id);
        self.entities.push(SimEntity::new(id, pos, body));
        id
    }

    /// Lookup including entities marked dead but not yet compacted.
    pub fn get(&self, id: EntityId) -> Option<&SimEntity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut SimEntity> {
        self.entities.iter_mut().find(|e| e.id() == id)
    }

    /// Live entities.
    pub fn iter(&self) -> impl Iterator<Item = &SimEntity> {
        self.entities.iter().filter(|e| e.is_alive())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SimEntity> {
        self.entities.iter_mut().filter(|e| e.is_alive())
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Closest live entity matching `pred`, with its distance.
    pub fn nearest(
        &self,
        from: Vec2,
        pred: impl Fn(&SimEntity) -> bool,
    ) -> Option<(EntityId, f32)> {
        self.iter()
            .filter(|e| pred(e))
            .map(|e| (e.id(), e.pos().distance(from)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    pub fn count_kind(&self, kind: EntityKind) -> usize {
        self.iter().filter(|e| e.kind() == kind).count()
    }

    pub fn counts_by_kind(&self) -> BTreeMap<EntityKind, usize> {
        let mut counts = BTreeMap::new();
        for entity in self.iter() {
            *counts.entry(entity.kind()).or_insert(0) += 1;
        }
        counts
    }

    /// Whether a body of `radius` at `pos` would overlap a tangible entity.
    pub fn collides(&self, pos: Vec2, radius: f32) -> bool {
        self.iter()
            .filter(|e| e.core.tangible)
            .any(|e| e.pos().distance(pos) < e.core.radius + radius)
    }

    /// Drop dead entities. Returns how many were removed.
    pub fn compact(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(SimEntity::is_alive);
        before - self.entities.len()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Coin, Cow, Rock};

    #[test]
    fn test_ids_are_never_reused() {
        let mut arena = WorldEntities::default();
        let a = arena.spawn(Vec2::ZERO, EntityBody::Rock(Rock));
        arena.clear();
        let b = arena.spawn(Vec2::ZERO, EntityBody::Rock(Rock));
        assert_ne!(a, b);
    }

    #[test]
    fn test_nearest_skips_dead_and_filtered() {
        let mut arena = WorldEntities::default();
        let near = arena.spawn(Vec2::new(10.0, 0.0), EntityBody::Coin(Coin::default()));
        let far = arena.spawn(Vec2::new(40.0, 0.0), EntityBody::Coin(Coin::default()));
        arena.spawn(Vec2::new(5.0, 0.0), EntityBody::Cow(Cow::default()));

        let coins = |e: &SimEntity| e.kind() == EntityKind::Coin;
        assert_eq!(arena.nearest(Vec2::ZERO, coins), Some((near, 10.0)));

        if let Some(entity) = arena.get_mut(near) {
            entity.core.dead = true;
        }
        assert_eq!(arena.nearest(Vec2::ZERO, coins), Some((far, 40.0)));
        assert_eq!(arena.compact(), 1);
        assert!(arena.get(near).is_none());
    }

    #[test]
    fn test_only_tangible_entities_collide() {
        let mut arena = WorldEntities::default();
        arena.spawn(Vec2::new(100.0, 100.0), EntityBody::Rock(Rock));
        arena.spawn(Vec2::new(300.0, 100.0), EntityBody::Cow(Cow::default()));
        assert!(arena.collides(Vec2::new(110.0, 100.0), PLAYER_RADIUS));
        assert!(!arena.collides(Vec2::new(300.0, 100.0), PLAYER_RADIUS), "cows are not tangible");
        assert_eq!(arena.count_kind(EntityKind::Rock), 1);
    }
}
