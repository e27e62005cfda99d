//! Round state and core simulation types
//!
//! Everything one round owns: the registry, the seeded RNG, score, clocks and
//! the spawn strategy.

use std::time::Duration;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityId, EntityKind, Sprite, SpriteId};
use super::registry::EntityRegistry;
use super::spawn::{EdgeSpawner, SpawnStrategy};
use crate::config::SimConfig;
use crate::error::SimError;

/// Current phase of the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Ticks advance the simulation
    Running,
    /// Player died; ticks are ignored until a new round replaces this state
    Over,
}

/// Final numbers handed to the lifecycle layer when the player dies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub score: u64,
    pub elapsed_ms: u64,
    /// Score beat the high score recorded before this round began
    pub new_high_score: bool,
}

/// Things that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    HostileSpawned { id: EntityId, kind: EntityKind },
    EntityDestroyed { id: EntityId, kind: EntityKind },
    Reclaimed { count: usize },
    RoundEnded(RoundSummary),
}

/// Read-only view of one entity for drawing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Vec2,
    pub size: Vec2,
    pub sprite: SpriteId,
}

/// Immutable copy of the round taken after a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub score: u64,
    pub elapsed_ms: u64,
    pub phase: RoundPhase,
    pub player_alive: bool,
    /// Live entities in registry order
    pub entities: Vec<EntityView>,
}

/// Complete state of a round
pub struct GameState {
    pub config: SimConfig,
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub registry: EntityRegistry,
    pub(crate) player_id: EntityId,
    pub(crate) score: u64,
    /// Simulation tick counter
    pub(crate) time_ticks: u64,
    pub(crate) elapsed: Duration,
    pub(crate) since_last_spawn: Duration,
    pub(crate) phase: RoundPhase,
    /// Best score before this round; beating it flags a new high score
    pub(crate) high_score: u64,
    pub(crate) spawner: Box<dyn SpawnStrategy>,
    next_id: u32,
}

impl GameState {
    /// Start a round: background and player are spawned and protected
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let pf = config.playfield;

        let background_sprite = Sprite::new(SpriteId::BACKGROUND, pf.size())?;
        let mut background = Entity::background(EntityId(0), background_sprite);
        background.spawn(Vec2::ZERO, Vec2::ZERO);

        let player_sprite = Sprite::new(SpriteId::TROOPER, config.player_size)?;
        let player_id = EntityId(1);
        let mut player = Entity::player(player_id, player_sprite, config.player_max_speed);
        player.spawn(Vec2::new(pf.width / 2.0, pf.height / 10.0), Vec2::ZERO);

        log::info!(
            "Round started: {}x{} playfield, seed {}",
            pf.width,
            pf.height,
            seed
        );

        Ok(Self {
            rng: Pcg32::seed_from_u64(seed),
            seed,
            config,
            registry: EntityRegistry::with_protected(vec![background, player]),
            player_id,
            score: 0,
            time_ticks: 0,
            elapsed: Duration::ZERO,
            since_last_spawn: Duration::ZERO,
            phase: RoundPhase::Running,
            high_score: 0,
            spawner: Box::new(EdgeSpawner),
            next_id: 2,
        })
    }

    /// Replace the spawn-content strategy
    pub fn with_spawner(mut self, spawner: Box<dyn SpawnStrategy>) -> Self {
        self.spawner = spawner;
        self
    }

    /// Set the score this round has to beat
    pub fn with_high_score(mut self, high_score: u64) -> Self {
        self.high_score = high_score;
        self
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn player(&self) -> Option<&Entity> {
        self.registry.get(self.player_id)
    }

    pub fn player_alive(&self) -> bool {
        self.player().is_some_and(Entity::is_alive)
    }

    /// Player center, or `None` once the player is dead
    pub fn player_center(&self) -> Option<Vec2> {
        self.player().and_then(|p| p.center().ok())
    }

    /// Control input: desired horizontal velocity, clamped to the player's cap
    pub fn set_player_velocity_x(&mut self, dx: f32) {
        let dx = if dx.is_finite() { dx } else { 0.0 };
        let player_id = self.player_id;
        if let Some(player) = self.registry.get_mut(player_id) {
            player.set_velocity_x(dx);
        }
    }

    pub fn increment_score(&mut self, amount: u64) {
        self.score = self.score.saturating_add(amount);
    }

    /// Advance both the round clock and the spawn timer
    pub fn increment_time(&mut self, amount: Duration) {
        self.elapsed += amount;
        self.since_last_spawn += amount;
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase == RoundPhase::Over
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_millis(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }

    pub fn since_last_spawn(&self) -> Duration {
        self.since_last_spawn
    }

    /// Fresh spawn delay, uniform over the configured window
    pub(crate) fn draw_spawn_threshold(&mut self) -> Duration {
        Duration::from_millis(self.rng.random_range(self.config.spawn_window()))
    }

    pub fn summary(&self) -> RoundSummary {
        RoundSummary {
            score: self.score,
            elapsed_ms: self.elapsed_millis(),
            new_high_score: self.score > self.high_score,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let entities = self
            .registry
            .iter()
            .filter_map(|e| {
                Some(EntityView {
                    id: e.id(),
                    kind: e.kind(),
                    position: e.position().ok()?,
                    size: e.sprite().size(),
                    sprite: e.sprite().id,
                })
            })
            .collect();

        Snapshot {
            tick: self.time_ticks,
            score: self.score,
            elapsed_ms: self.elapsed_millis(),
            phase: self.phase,
            player_alive: self.player_alive(),
            entities,
        }
    }
}
