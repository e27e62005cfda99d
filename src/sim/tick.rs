//! One simulation step
//!
//! Passes run in a fixed order: steering and physics, collisions,
//! reclamation, spawning, then the terminal check. Collisions therefore see
//! post-movement positions, and dead entities are purged before the next
//! spawn decision.

use std::time::Duration;

use super::collision::collision_pass;
use super::spawn::SpawnContext;
use super::state::{GameEvent, GameState, RoundPhase};
use crate::error::SimError;

/// Advance the round by `dt` of wall-clock time.
///
/// Returns the events the step produced. A round that is already over is left
/// untouched. Errors are precondition violations and indicate a bug in whoever
/// assembled the registry.
pub fn tick(state: &mut GameState, dt: Duration) -> Result<Vec<GameEvent>, SimError> {
    if state.phase == RoundPhase::Over {
        return Ok(Vec::new());
    }

    let mut events = Vec::new();
    let dt_secs = dt.as_secs_f32();
    state.time_ticks += 1;
    state.elapsed += dt;

    // Physics
    let target = state.player_center();
    for entity in state.registry.iter_mut().filter(|e| e.is_alive()) {
        entity.steer(target)?;
        entity.update_physics(dt_secs)?;
    }

    // Collisions, decided against one consistent view then applied
    for id in collision_pass(state.registry.as_slice())? {
        if let Some(entity) = state.registry.get_mut(id) {
            entity.kill();
            log::debug!("{:?} {} destroyed", entity.kind(), id);
            events.push(GameEvent::EntityDestroyed {
                id,
                kind: entity.kind(),
            });
        }
    }

    // Reclamation
    let reclaimed = state.registry.reclaim(&state.config.playfield);
    if reclaimed > 0 {
        log::debug!("Reclaimed {} entities", reclaimed);
        events.push(GameEvent::Reclaimed { count: reclaimed });
    }

    // Spawning
    state.since_last_spawn += dt;
    let threshold = state.draw_spawn_threshold();
    if state.since_last_spawn >= threshold {
        state.since_last_spawn = Duration::ZERO;
        let id = state.next_entity_id();
        let ctx = SpawnContext {
            config: &state.config,
            player_center: state.player_center(),
            elapsed: state.elapsed,
        };
        match state.spawner.spawn(id, &ctx, &mut state.rng) {
            Some(entity) if entity.is_alive() => {
                log::debug!("Spawned {:?} {}", entity.kind(), id);
                events.push(GameEvent::HostileSpawned {
                    id,
                    kind: entity.kind(),
                });
                state.registry.push(entity);
            }
            Some(entity) => {
                log::warn!("Spawn strategy returned unspawned {:?}; dropped", entity.kind());
            }
            None => {}
        }
    }

    // Terminal check
    if !state.player_alive() {
        state.phase = RoundPhase::Over;
        let summary = state.summary();
        log::info!(
            "Round over: score {} after {} ms{}",
            summary.score,
            summary.elapsed_ms,
            if summary.new_high_score { " (new high score)" } else { "" }
        );
        events.push(GameEvent::RoundEnded(summary));
    }

    log::trace!("Tick {} took dt={:?}", state.time_ticks, dt);
    Ok(events)
}
