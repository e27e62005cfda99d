//! Simulated entities
//!
//! Every entity shares one contract (spawn, steer, integrate, collide); what
//! differs per variant is injected as data: a [`Movement`] strategy and a
//! [`CollisionPolicy`]. Positional queries on an entity that is not alive fail
//! with a precondition error instead of returning stale coordinates.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{CollisionPolicy, Faction};
use super::hitbox::Hitbox;
use crate::error::SimError;

/// Stable identifier, unique within a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where an entity is in its life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    /// Constructed but `spawn` not yet called
    Unspawned,
    Alive,
    /// Destroyed by collision logic; awaiting reclamation
    Dead,
}

/// Hostile variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostileKind {
    /// Crosses the playfield diagonally from a side edge
    Bird,
    /// Rises from the bottom edge and re-aims at the player every tick
    HomingMissile,
}

/// Entity variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Background,
    Player,
    Hostile(HostileKind),
}

impl EntityKind {
    pub fn faction(&self) -> Faction {
        match self {
            EntityKind::Background => Faction::Scenery,
            EntityKind::Player => Faction::Player,
            EntityKind::Hostile(_) => Faction::Hostile,
        }
    }
}

/// How an entity chooses its velocity before integration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Movement {
    /// Never moves; velocity is pinned to zero
    Static,
    /// Keeps whatever velocity it was spawned with or was last given
    Linear,
    /// Re-aims at the target at a constant speed
    Homing { speed: f32 },
}

/// Handle the presentation layer maps to an actual image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpriteId(pub u32);

impl SpriteId {
    pub const BACKGROUND: SpriteId = SpriteId(0);
    pub const TROOPER: SpriteId = SpriteId(1);
    pub const BIRD: SpriteId = SpriteId(2);
    pub const MISSILE: SpriteId = SpriteId(3);
}

/// Opaque visual resource; the core only cares about its extents
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub id: SpriteId,
    size: Vec2,
}

impl Sprite {
    pub fn new(id: SpriteId, size: Vec2) -> Result<Self, SimError> {
        // Reuse hitbox validation so both reject the same extents
        Hitbox::new(Vec2::ZERO, size.x, size.y)?;
        Ok(Self { id, size })
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.size
    }
}

/// A simulated object: position is the sprite's top-left corner
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    kind: EntityKind,
    /// Per-axis velocity caps applied by `set_velocity`
    max_speed: Vec2,
    pos: Vec2,
    vel: Vec2,
    lifecycle: Lifecycle,
    hitbox: Option<Hitbox>,
    sprite: Sprite,
    movement: Movement,
    policy: CollisionPolicy,
}

impl Entity {
    pub fn new(
        id: EntityId,
        kind: EntityKind,
        sprite: Sprite,
        max_speed: Vec2,
        movement: Movement,
        policy: CollisionPolicy,
    ) -> Self {
        Self {
            id,
            kind,
            max_speed: max_speed.abs(),
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            lifecycle: Lifecycle::Unspawned,
            hitbox: None,
            sprite,
            movement,
            policy,
        }
    }

    /// Full-playfield backdrop; never moves and takes no part in collisions
    pub fn background(id: EntityId, sprite: Sprite) -> Self {
        Self::new(
            id,
            EntityKind::Background,
            sprite,
            Vec2::ZERO,
            Movement::Static,
            CollisionPolicy::Ignore,
        )
    }

    /// The controlled actor; horizontal speed bounded by `max_speed_x`
    pub fn player(id: EntityId, sprite: Sprite, max_speed_x: f32) -> Self {
        Self::new(
            id,
            EntityKind::Player,
            sprite,
            Vec2::new(max_speed_x, 0.0),
            Movement::Linear,
            CollisionPolicy::DiesOnContact {
                with: Faction::Hostile,
            },
        )
    }

    pub fn bird(id: EntityId, sprite: Sprite, speed: f32) -> Self {
        Self::new(
            id,
            EntityKind::Hostile(HostileKind::Bird),
            sprite,
            Vec2::splat(speed),
            Movement::Linear,
            CollisionPolicy::MutualDestruction {
                with: Faction::Player,
            },
        )
    }

    pub fn homing_missile(id: EntityId, sprite: Sprite, speed: f32) -> Self {
        Self::new(
            id,
            EntityKind::Hostile(HostileKind::HomingMissile),
            sprite,
            Vec2::splat(speed),
            Movement::Homing { speed },
            CollisionPolicy::MutualDestruction {
                with: Faction::Player,
            },
        )
    }

    /// Place the entity, build its hitbox and mark it alive.
    /// Calling this again simply resets the entity.
    pub fn spawn(&mut self, pos: Vec2, vel: Vec2) {
        self.pos = pos;
        self.vel = vel;
        self.hitbox = Some(Hitbox::from_extents(pos, self.sprite.size()));
        self.lifecycle = Lifecycle::Alive;
    }

    /// Fails unless the entity is alive
    pub fn require_alive(&self) -> Result<(), SimError> {
        match self.lifecycle {
            Lifecycle::Alive => Ok(()),
            Lifecycle::Unspawned => Err(SimError::NotSpawned { id: self.id }),
            Lifecycle::Dead => Err(SimError::Dead { id: self.id }),
        }
    }

    /// Apply the movement strategy. `target` is the point homing entities chase.
    pub fn steer(&mut self, target: Option<Vec2>) -> Result<(), SimError> {
        self.require_alive()?;
        match self.movement {
            Movement::Static => self.vel = Vec2::ZERO,
            Movement::Linear => {}
            Movement::Homing { speed } => {
                if let Some(target) = target {
                    let dir = (target - self.center()?).normalize_or_zero();
                    if dir != Vec2::ZERO {
                        self.set_velocity(dir * speed);
                    }
                }
            }
        }
        Ok(())
    }

    /// Euler step: `pos += vel * dt` (dt in seconds), then re-center the hitbox
    pub fn update_physics(&mut self, dt: f32) -> Result<(), SimError> {
        self.require_alive()?;
        self.pos += self.vel * dt;
        let center = self.center()?;
        if let Some(hitbox) = self.hitbox.as_mut() {
            hitbox.set_position(center);
        }
        Ok(())
    }

    /// Ids of the entities (possibly including this one) that die because of
    /// this entity's contacts. Decided from the current state of `others`;
    /// the caller applies the deaths once every entity has been checked.
    pub fn check_for_collisions(&self, others: &[Entity]) -> Result<Vec<EntityId>, SimError> {
        self.require_alive()?;
        self.policy.victims(self, others)
    }

    /// Hitbox overlap; both entities must be alive
    pub fn is_colliding(&self, other: &Entity) -> Result<bool, SimError> {
        let mine = self.hitbox()?;
        let theirs = other.hitbox()?;
        Ok(mine.is_colliding(theirs))
    }

    pub fn hitbox(&self) -> Result<&Hitbox, SimError> {
        self.require_alive()?;
        self.hitbox.as_ref().ok_or(SimError::NotSpawned { id: self.id })
    }

    /// Top-left corner
    pub fn position(&self) -> Result<Vec2, SimError> {
        self.require_alive()?;
        Ok(self.pos)
    }

    pub fn center(&self) -> Result<Vec2, SimError> {
        self.require_alive()?;
        Ok(self.pos + self.sprite.size() / 2.0)
    }

    pub fn center_x(&self) -> Result<f32, SimError> {
        Ok(self.center()?.x)
    }

    pub fn center_y(&self) -> Result<f32, SimError> {
        Ok(self.center()?.y)
    }

    /// Set velocity, clamped per axis to the variant's caps
    pub fn set_velocity(&mut self, vel: Vec2) {
        self.vel = vel.clamp(-self.max_speed, self.max_speed);
    }

    pub fn set_velocity_x(&mut self, dx: f32) {
        self.set_velocity(Vec2::new(dx, self.vel.y));
    }

    /// Graceful destruction; the entity is reclaimed on the next pass
    pub fn kill(&mut self) {
        self.lifecycle = Lifecycle::Dead;
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.lifecycle == Lifecycle::Alive
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn velocity(&self) -> Vec2 {
        self.vel
    }

    pub fn max_speed(&self) -> Vec2 {
        self.max_speed
    }

    pub fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    pub fn policy(&self) -> CollisionPolicy {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sprite(w: f32, h: f32) -> Sprite {
        Sprite::new(SpriteId::BIRD, Vec2::new(w, h)).unwrap()
    }

    #[test]
    fn test_sprite_rejects_negative_size() {
        assert!(matches!(
            Sprite::new(SpriteId::TROOPER, Vec2::new(-4.0, 4.0)),
            Err(SimError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_queries_before_spawn_fail() {
        let mut e = Entity::bird(EntityId(7), sprite(10.0, 10.0), 300.0);
        let other = Entity::bird(EntityId(8), sprite(10.0, 10.0), 300.0);

        assert!(matches!(e.position(), Err(SimError::NotSpawned { id }) if id == EntityId(7)));
        assert!(e.center_x().is_err());
        assert!(e.center_y().is_err());
        assert!(e.update_physics(0.016).unwrap_err().is_precondition());
        assert!(e.check_for_collisions(&[]).unwrap_err().is_precondition());
        assert!(e.is_colliding(&other).unwrap_err().is_precondition());
    }

    #[test]
    fn test_queries_after_death_fail() {
        let mut e = Entity::bird(EntityId(1), sprite(10.0, 10.0), 300.0);
        e.spawn(Vec2::new(5.0, 5.0), Vec2::ZERO);
        e.kill();
        assert!(matches!(e.center(), Err(SimError::Dead { .. })));
        assert!(matches!(e.update_physics(1.0), Err(SimError::Dead { .. })));
    }

    #[test]
    fn test_is_colliding_requires_both_alive() {
        let mut a = Entity::bird(EntityId(1), sprite(10.0, 10.0), 300.0);
        let b = Entity::bird(EntityId(2), sprite(10.0, 10.0), 300.0);
        a.spawn(Vec2::ZERO, Vec2::ZERO);
        assert!(matches!(a.is_colliding(&b), Err(SimError::NotSpawned { id }) if id == EntityId(2)));
    }

    #[test]
    fn test_center_uses_both_axes() {
        let mut e = Entity::bird(EntityId(1), sprite(20.0, 40.0), 300.0);
        e.spawn(Vec2::new(100.0, 300.0), Vec2::ZERO);
        assert_eq!(e.center_x().unwrap(), 110.0);
        assert_eq!(e.center_y().unwrap(), 320.0);
    }

    #[test]
    fn test_spawn_twice_resets() {
        let mut e = Entity::bird(EntityId(1), sprite(10.0, 10.0), 300.0);
        e.spawn(Vec2::new(1.0, 1.0), Vec2::new(5.0, 5.0));
        e.kill();
        e.spawn(Vec2::new(50.0, 60.0), Vec2::ZERO);
        assert!(e.is_alive());
        assert_eq!(e.position().unwrap(), Vec2::new(50.0, 60.0));
        assert_eq!(e.hitbox().unwrap().center(), e.center().unwrap());
    }

    #[test]
    fn test_hitbox_matches_sprite_extents() {
        let mut e = Entity::bird(EntityId(1), sprite(24.0, 16.0), 300.0);
        e.spawn(Vec2::new(30.0, 40.0), Vec2::ZERO);
        let hb = e.hitbox().unwrap();
        assert_eq!(hb.min(), Vec2::new(30.0, 40.0));
        assert_eq!(hb.size(), Vec2::new(24.0, 16.0));
        assert_eq!(hb.center(), e.center().unwrap());
    }

    #[test]
    fn test_player_velocity_clamped() {
        let mut p = Entity::player(EntityId(1), sprite(10.0, 10.0), 400.0);
        p.set_velocity_x(9000.0);
        assert_eq!(p.velocity().x, 400.0);
        p.set_velocity_x(-9000.0);
        assert_eq!(p.velocity().x, -400.0);
        // Player has no vertical authority
        p.set_velocity(Vec2::new(0.0, 50.0));
        assert_eq!(p.velocity().y, 0.0);
    }

    #[test]
    fn test_static_entity_never_moves() {
        let mut bg = Entity::background(
            EntityId(0),
            Sprite::new(SpriteId::BACKGROUND, Vec2::new(480.0, 800.0)).unwrap(),
        );
        bg.spawn(Vec2::ZERO, Vec2::new(10.0, 10.0));
        bg.steer(None).unwrap();
        bg.update_physics(1.0).unwrap();
        assert_eq!(bg.position().unwrap(), Vec2::ZERO);
    }

    #[test]
    fn test_homing_aims_at_target() {
        let mut m = Entity::homing_missile(EntityId(3), sprite(10.0, 10.0), 250.0);
        m.spawn(Vec2::new(95.0, 495.0), Vec2::ZERO);
        // Target straight above the missile's center
        m.steer(Some(Vec2::new(100.0, 100.0))).unwrap();
        let vel = m.velocity();
        assert!(vel.x.abs() < 1e-3);
        assert!((vel.y + 250.0).abs() < 1e-3);
    }

    #[test]
    fn test_homing_without_target_keeps_velocity() {
        let mut m = Entity::homing_missile(EntityId(3), sprite(10.0, 10.0), 250.0);
        m.spawn(Vec2::ZERO, Vec2::new(0.0, -100.0));
        m.steer(None).unwrap();
        assert_eq!(m.velocity(), Vec2::new(0.0, -100.0));
    }

    proptest! {
        #[test]
        fn prop_euler_integration(
            x in -1000.0f32..1000.0, y in -1000.0f32..1000.0,
            dx in -300.0f32..300.0, dy in -300.0f32..300.0,
            dt in 0.0f32..1.0,
        ) {
            let mut e = Entity::bird(EntityId(1), sprite(24.0, 16.0), 300.0);
            e.spawn(Vec2::new(x, y), Vec2::new(dx, dy));
            let before = e.position().unwrap();
            e.update_physics(dt).unwrap();
            let expected = before + Vec2::new(dx, dy) * dt;
            let after = e.position().unwrap();
            prop_assert!((after - expected).length() < 1e-3);
            let hb_center = e.hitbox().unwrap().center();
            prop_assert!((hb_center - e.center().unwrap()).length() < 1e-3);
        }

        #[test]
        fn prop_is_colliding_symmetric(
            ax in 0.0f32..200.0, ay in 0.0f32..200.0,
            bx in 0.0f32..200.0, by in 0.0f32..200.0,
            w in 1.0f32..80.0, h in 1.0f32..80.0,
        ) {
            let mut a = Entity::bird(EntityId(1), sprite(w, h), 300.0);
            let mut b = Entity::homing_missile(EntityId(2), sprite(h, w), 250.0);
            a.spawn(Vec2::new(ax, ay), Vec2::ZERO);
            b.spawn(Vec2::new(bx, by), Vec2::ZERO);
            prop_assert_eq!(a.is_colliding(&b).unwrap(), b.is_colliding(&a).unwrap());
        }
    }
}
