//! Collision policy and the per-tick collision pass
//!
//! Each entity decides its own contacts from the pre-pass state of the
//! registry. Deaths are applied only after every entity has been checked, so
//! two entities that would destroy each other both die.

use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityId};
use crate::error::SimError;

/// Coarse side an entity is on; policies target factions, never concrete kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Faction {
    Scenery,
    Player,
    Hostile,
}

/// What happens when an entity's hitbox overlaps another's
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionPolicy {
    /// Takes no part in collision testing, in either direction
    Ignore,
    /// This entity dies when it touches a member of `with`
    DiesOnContact { with: Faction },
    /// This entity and whatever it touches from `with` both die
    MutualDestruction { with: Faction },
}

impl CollisionPolicy {
    /// Ids that die because `me` touched something in `others`
    pub fn victims(&self, me: &Entity, others: &[Entity]) -> Result<Vec<EntityId>, SimError> {
        let (with, mutual) = match *self {
            CollisionPolicy::Ignore => return Ok(Vec::new()),
            CollisionPolicy::DiesOnContact { with } => (with, false),
            CollisionPolicy::MutualDestruction { with } => (with, true),
        };

        let mut victims = Vec::new();
        for other in others {
            if other.id() == me.id()
                || !other.is_alive()
                || other.policy() == CollisionPolicy::Ignore
                || other.kind().faction() != with
            {
                continue;
            }
            if me.is_colliding(other)? {
                if !victims.contains(&me.id()) {
                    victims.push(me.id());
                }
                if mutual {
                    victims.push(other.id());
                }
            }
        }
        Ok(victims)
    }
}

/// Run every live entity's collision check against the same snapshot.
/// Returns the deduplicated ids to destroy, in registry order of discovery.
pub fn collision_pass(entities: &[Entity]) -> Result<Vec<EntityId>, SimError> {
    let mut doomed: Vec<EntityId> = Vec::new();
    for entity in entities.iter().filter(|e| e.is_alive()) {
        for id in entity.check_for_collisions(entities)? {
            if !doomed.contains(&id) {
                doomed.push(id);
            }
        }
    }
    Ok(doomed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{Sprite, SpriteId};
    use glam::Vec2;

    fn sprite() -> Sprite {
        Sprite::new(SpriteId::BIRD, Vec2::new(20.0, 20.0)).unwrap()
    }

    fn spawned(mut e: Entity, at: Vec2) -> Entity {
        e.spawn(at, Vec2::ZERO);
        e
    }

    #[test]
    fn test_player_and_hostile_destroy_each_other() {
        let entities = vec![
            spawned(Entity::player(EntityId(1), sprite(), 400.0), Vec2::new(100.0, 100.0)),
            spawned(Entity::bird(EntityId(2), sprite(), 300.0), Vec2::new(110.0, 110.0)),
        ];
        let doomed = collision_pass(&entities).unwrap();
        assert_eq!(doomed, vec![EntityId(1), EntityId(2)]);
    }

    #[test]
    fn test_hostiles_ignore_each_other() {
        let entities = vec![
            spawned(Entity::bird(EntityId(1), sprite(), 300.0), Vec2::new(0.0, 0.0)),
            spawned(Entity::homing_missile(EntityId(2), sprite(), 250.0), Vec2::new(5.0, 5.0)),
        ];
        assert!(collision_pass(&entities).unwrap().is_empty());
    }

    #[test]
    fn test_background_excluded() {
        let bg = Sprite::new(SpriteId::BACKGROUND, Vec2::new(480.0, 800.0)).unwrap();
        let entities = vec![
            spawned(Entity::background(EntityId(0), bg), Vec2::ZERO),
            spawned(Entity::player(EntityId(1), sprite(), 400.0), Vec2::new(240.0, 80.0)),
            spawned(Entity::bird(EntityId(2), sprite(), 300.0), Vec2::new(0.0, 500.0)),
        ];
        assert!(collision_pass(&entities).unwrap().is_empty());
    }

    #[test]
    fn test_dead_and_unspawned_entities_are_skipped() {
        let mut dead = spawned(Entity::bird(EntityId(2), sprite(), 300.0), Vec2::new(100.0, 100.0));
        dead.kill();
        let entities = vec![
            spawned(Entity::player(EntityId(1), sprite(), 400.0), Vec2::new(100.0, 100.0)),
            dead,
            Entity::bird(EntityId(3), sprite(), 300.0),
        ];
        assert!(collision_pass(&entities).unwrap().is_empty());
    }

    #[test]
    fn test_one_player_many_hostiles() {
        let entities = vec![
            spawned(Entity::player(EntityId(1), sprite(), 400.0), Vec2::new(100.0, 100.0)),
            spawned(Entity::bird(EntityId(2), sprite(), 300.0), Vec2::new(90.0, 100.0)),
            spawned(Entity::bird(EntityId(3), sprite(), 300.0), Vec2::new(110.0, 100.0)),
            spawned(Entity::bird(EntityId(4), sprite(), 300.0), Vec2::new(400.0, 400.0)),
        ];
        let doomed = collision_pass(&entities).unwrap();
        assert_eq!(doomed.len(), 3);
        assert!(!doomed.contains(&EntityId(4)));
    }
}
