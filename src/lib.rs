//! Freefall - a falling-arcade simulation core
//!
//! A trooper drops through the sky while birds and homing missiles close in.
//! This crate is the simulation only; drawing, input devices and storage
//! belong to the host.
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, spawning, ticks)
//! - `driver`: Threaded tick driver, control channel and published snapshots
//! - `config`: Round configuration
//! - `highscores`: In-memory leaderboard

pub mod config;
pub mod driver;
pub mod error;
pub mod highscores;
pub mod sim;

pub use config::{Playfield, SimConfig};
pub use driver::{Controls, DriverEvent, TickDriver};
pub use error::SimError;
pub use highscores::HighScores;

/// Game configuration constants
pub mod consts {
    use glam::Vec2;

    /// Default playfield (portrait phone)
    pub const DEFAULT_PLAYFIELD_WIDTH: f32 = 480.0;
    pub const DEFAULT_PLAYFIELD_HEIGHT: f32 = 800.0;

    /// Randomized spawn delay window in ms, [min, max)
    pub const SPAWN_MIN_MS: u64 = 1500;
    pub const SPAWN_MAX_MS: u64 = 2500;

    /// Player horizontal speed cap (units/second)
    pub const PLAYER_MAX_SPEED: f32 = 400.0;
    pub const PLAYER_SIZE: Vec2 = Vec2::new(48.0, 64.0);

    /// Hostile defaults
    pub const HOSTILE_SIZE: Vec2 = Vec2::new(40.0, 40.0);
    pub const BIRD_SPEED: f32 = 300.0;
    pub const MISSILE_SPEED: f32 = 250.0;

    /// Driver sleep between ticks (ms)
    pub const TICK_PAUSE_MS: u64 = 2;
}
