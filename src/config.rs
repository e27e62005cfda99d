//! Round configuration
//!
//! Supplied once at round start by the presentation layer and treated as
//! immutable for the round's duration. Serializable so hosts can keep it in
//! whatever storage they like.

use std::fs;
use std::ops::Range;
use std::path::Path;
use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SimError;

/// Playfield bounds, derived from display geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            width: DEFAULT_PLAYFIELD_WIDTH,
            height: DEFAULT_PLAYFIELD_HEIGHT,
        }
    }
}

impl Playfield {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Inclusive on all edges: a point exactly on the border is still inside
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Tunables for one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub playfield: Playfield,
    /// Fixed seed for reproducible runs; drawn from the OS when absent
    pub seed: Option<u64>,

    // === Spawning ===
    /// Lower bound of the randomized spawn delay (inclusive)
    pub spawn_min_ms: u64,
    /// Upper bound of the randomized spawn delay (exclusive)
    pub spawn_max_ms: u64,

    // === Entities ===
    /// Horizontal speed cap of the player (units/second)
    pub player_max_speed: f32,
    pub player_size: Vec2,
    pub hostile_size: Vec2,
    pub bird_speed: f32,
    pub missile_speed: f32,

    // === Driver ===
    /// Sleep between ticks; zero just yields
    pub tick_pause_ms: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            playfield: Playfield::default(),
            seed: None,

            spawn_min_ms: SPAWN_MIN_MS,
            spawn_max_ms: SPAWN_MAX_MS,

            player_max_speed: PLAYER_MAX_SPEED,
            player_size: PLAYER_SIZE,
            hostile_size: HOSTILE_SIZE,
            bird_speed: BIRD_SPEED,
            missile_speed: MISSILE_SPEED,

            tick_pause_ms: TICK_PAUSE_MS,
        }
    }
}

impl SimConfig {
    /// Default configuration for the given playfield
    pub fn with_playfield(width: f32, height: f32) -> Self {
        Self {
            playfield: Playfield::new(width, height),
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse and validate a JSON document; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let pf = self.playfield;
        if !(pf.width.is_finite() && pf.height.is_finite() && pf.width > 0.0 && pf.height > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "playfield must be positive, got {}x{}",
                pf.width, pf.height
            )));
        }
        if self.spawn_min_ms >= self.spawn_max_ms {
            return Err(SimError::InvalidConfig(format!(
                "spawn window [{}, {}) is empty",
                self.spawn_min_ms, self.spawn_max_ms
            )));
        }
        for (name, speed) in [
            ("player_max_speed", self.player_max_speed),
            ("bird_speed", self.bird_speed),
            ("missile_speed", self.missile_speed),
        ] {
            if !speed.is_finite() || speed < 0.0 {
                return Err(SimError::InvalidConfig(format!("{name} must be >= 0, got {speed}")));
            }
        }
        for size in [self.player_size, self.hostile_size] {
            if !size.is_finite() || size.min_element() < 0.0 {
                return Err(SimError::InvalidDimensions {
                    width: size.x,
                    height: size.y,
                });
            }
        }
        Ok(())
    }

    /// Range the spawn threshold is drawn from, in milliseconds
    pub fn spawn_window(&self) -> Range<u64> {
        self.spawn_min_ms..self.spawn_max_ms
    }

    pub fn tick_pause(&self) -> Duration {
        Duration::from_millis(self.tick_pause_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.spawn_window(), 1500..2500);
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            SimConfig::from_json(r#"{ "playfield": { "width": 800, "height": 600 }, "seed": 42 }"#)
                .unwrap();
        assert_eq!(config.playfield, Playfield::new(800.0, 600.0));
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.spawn_min_ms, SPAWN_MIN_MS);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(SimConfig::from_json("{ nope"), Err(SimError::Config(_))));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("freefall-no-such-config.json");
        assert!(matches!(SimConfig::load(&path), Err(SimError::Io(_))));
    }

    #[test]
    fn test_load_reads_file() {
        let path = std::env::temp_dir().join(format!("freefall-config-{}.json", std::process::id()));
        fs::write(&path, r#"{ "seed": 5, "tick_pause_ms": 0 }"#).unwrap();
        let loaded = SimConfig::load(&path);
        fs::remove_file(&path).unwrap();
        let config = loaded.unwrap();
        assert_eq!(config.seed, Some(5));
        assert_eq!(config.tick_pause_ms, 0);
    }

    #[test]
    fn test_validation() {
        let mut config = SimConfig::with_playfield(0.0, 600.0);
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));

        config = SimConfig::default();
        config.spawn_min_ms = 3000;
        assert!(config.validate().is_err());

        config = SimConfig::default();
        config.hostile_size = Vec2::new(-1.0, 10.0);
        assert!(matches!(config.validate(), Err(SimError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_json_round_trip_keeps_seed() {
        let config = SimConfig::with_playfield(480.0, 800.0).with_seed(7);
        let back = SimConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_playfield_contains_edges() {
        let pf = Playfield::new(800.0, 600.0);
        assert!(pf.contains(Vec2::new(400.0, 300.0)));
        assert!(pf.contains(Vec2::new(0.0, 600.0)));
        assert!(!pf.contains(Vec2::new(-1.0, 300.0)));
        assert!(!pf.contains(Vec2::new(400.0, 601.0)));
    }
}
