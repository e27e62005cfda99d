//! Spawn content
//!
//! The tick decides *when* a hostile appears; a [`SpawnStrategy`] decides
//! *what* appears and where. Strategies draw from the round's seeded RNG so
//! runs stay reproducible.

use std::time::Duration;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::entity::{Entity, EntityId, Sprite, SpriteId};
use crate::config::SimConfig;

/// What a strategy may look at when building a hostile
#[derive(Debug, Clone, Copy)]
pub struct SpawnContext<'a> {
    pub config: &'a SimConfig,
    /// Player center, if the player is alive
    pub player_center: Option<Vec2>,
    /// Time since round start
    pub elapsed: Duration,
}

/// Builds and spawns new hostiles. Returning `None` skips this spawn slot.
pub trait SpawnStrategy: Send {
    fn spawn(&mut self, id: EntityId, ctx: &SpawnContext<'_>, rng: &mut Pcg32) -> Option<Entity>;
}

/// Birds from either side edge, missiles from the bottom edge, chosen evenly
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeSpawner;

impl EdgeSpawner {
    fn bird(id: EntityId, ctx: &SpawnContext<'_>, rng: &mut Pcg32) -> Option<Entity> {
        let config = ctx.config;
        let pf = config.playfield;
        let sprite = Sprite::new(SpriteId::BIRD, config.hostile_size).ok()?;
        let speed = config.bird_speed;

        // Birds fly up and across, as the player falls past them
        let y = rng.random_range(0.0..pf.height);
        let (pos, vel) = if rng.random_bool(0.5) {
            (Vec2::new(0.0, y), Vec2::new(speed, -speed))
        } else {
            (Vec2::new(pf.width, y), Vec2::new(-speed, -speed))
        };

        let mut bird = Entity::bird(id, sprite, speed);
        bird.spawn(pos, vel);
        Some(bird)
    }

    fn missile(id: EntityId, ctx: &SpawnContext<'_>, rng: &mut Pcg32) -> Option<Entity> {
        let config = ctx.config;
        let pf = config.playfield;
        let sprite = Sprite::new(SpriteId::MISSILE, config.hostile_size).ok()?;
        let speed = config.missile_speed;

        let x = rng.random_range(0.0..pf.width);
        let mut missile = Entity::homing_missile(id, sprite, speed);
        missile.spawn(Vec2::new(x, pf.height), Vec2::new(0.0, -speed));
        Some(missile)
    }
}

impl SpawnStrategy for EdgeSpawner {
    fn spawn(&mut self, id: EntityId, ctx: &SpawnContext<'_>, rng: &mut Pcg32) -> Option<Entity> {
        if rng.random_bool(0.5) {
            Self::bird(id, ctx, rng)
        } else {
            Self::missile(id, ctx, rng)
        }
    }
}
