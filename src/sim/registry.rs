//! Ordered entity storage
//!
//! The first `protected` entries (background, player) are created with the
//! round and are never reclaimed. Everything after them is appended by spawn
//! events and removed only by [`EntityRegistry::reclaim`].

use super::entity::{Entity, EntityId};
use crate::config::Playfield;

#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: Vec<Entity>,
    protected: usize,
}

impl EntityRegistry {
    /// Start a registry whose initial entries are exempt from reclamation
    pub fn with_protected(protected: Vec<Entity>) -> Self {
        Self {
            protected: protected.len(),
            entities: protected,
        }
    }

    pub fn push(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn protected_count(&self) -> usize {
        self.protected
    }

    pub fn as_slice(&self) -> &[Entity] {
        &self.entities
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id() == id)
    }

    /// Entities past the protected prefix
    pub fn unprotected(&self) -> &[Entity] {
        &self.entities[self.protected..]
    }

    /// Remove every unprotected entity that is not alive or whose position has
    /// left the playfield. Returns how many were removed.
    pub fn reclaim(&mut self, playfield: &Playfield) -> usize {
        let before = self.entities.len();
        let protected = self.protected;
        let mut index = 0;
        self.entities.retain(|e| {
            let keep = index < protected
                || e.position().is_ok_and(|pos| playfield.contains(pos));
            index += 1;
            keep
        });
        before - self.entities.len()
    }
}
