//! Error types for the simulation core
//!
//! Precondition violations are caller bugs in the orchestrator and are never
//! swallowed. Reaching a playfield edge or spawning nothing are not errors.

use thiserror::Error;

use crate::sim::EntityId;

/// Everything that can go wrong when driving the simulation
#[derive(Debug, Error)]
pub enum SimError {
    /// Entity was queried or updated before `spawn`
    #[error("entity {id} must be spawned before it can be queried or updated")]
    NotSpawned { id: EntityId },

    /// Entity was queried or updated after being destroyed
    #[error("entity {id} is dead and can no longer be queried or updated")]
    Dead { id: EntityId },

    /// Negative or non-finite extents
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: f32, height: f32 },

    /// A configuration value was rejected by validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration JSON could not be parsed
    #[error("failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Configuration file could not be read
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The round cannot be replaced while ticks are running
    #[error("tick driver is running; stop it first")]
    DriverRunning,

    /// The driver's worker thread has exited
    #[error("tick driver has shut down")]
    DriverShutdown,

    /// A tick panicked; the worker exited and the driver is shut down
    #[error("tick worker panicked: {0}")]
    WorkerPanicked(String),
}

impl SimError {
    /// True for errors raised by calling into an entity in the wrong lifecycle state
    pub fn is_precondition(&self) -> bool {
        matches!(self, SimError::NotSpawned { .. } | SimError::Dead { .. })
    }
}
