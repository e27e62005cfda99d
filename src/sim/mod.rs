//! Deterministic simulation module
//!
//! All gameplay logic lives here. Given the same seed and the same sequence of
//! inputs and deltas, a round plays out identically:
//! - Seeded RNG only
//! - Stable iteration order (registry order)
//! - No rendering, threading or platform dependencies

pub mod collision;
pub mod entity;
pub mod hitbox;
pub mod registry;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{CollisionPolicy, Faction, collision_pass};
pub use entity::{Entity, EntityId, EntityKind, HostileKind, Lifecycle, Movement, Sprite, SpriteId};
pub use hitbox::Hitbox;
pub use registry::EntityRegistry;
pub use spawn::{EdgeSpawner, SpawnContext, SpawnStrategy};
pub use state::{EntityView, GameEvent, GameState, RoundPhase, RoundSummary, Snapshot};
pub use tick::tick;
