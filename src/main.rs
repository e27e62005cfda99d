//! Freefall headless demo
//!
//! Plays a few rounds on the tick driver with a simple autopilot that sweeps
//! the trooper back and forth, then prints the leaderboard as JSON.
//!
//! Usage: `freefall [config.json]`

use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use freefall::sim::{EntityKind, GameState};
use freefall::{DriverEvent, SimConfig, SimError, TickDriver};

const ROUNDS: usize = 3;
const POLL: Duration = Duration::from_millis(50);
const ROUND_LIMIT: Duration = Duration::from_secs(30);

fn load_config() -> Result<SimConfig, SimError> {
    match std::env::args().nth(1) {
        Some(path) => SimConfig::load(path),
        None => Ok(SimConfig::default()),
    }
}

/// Seed for round `n`: derived from the configured seed when there is one
fn round_config(base: &SimConfig, n: usize) -> SimConfig {
    let mut config = base.clone();
    config.seed = base.seed.map(|seed| seed.wrapping_add(n as u64));
    config
}

fn main() -> Result<(), SimError> {
    env_logger::init();
    log::info!("Freefall (headless) starting...");

    let base = load_config()?;
    base.validate()?;
    let width = base.playfield.width;
    let speed = base.player_max_speed;

    let (driver, events) = TickDriver::new(GameState::new(round_config(&base, 0))?);
    let controls = driver.controls();

    for round in 0..ROUNDS {
        if round > 0 {
            driver.new_round(GameState::new(round_config(&base, round))?)?;
        }
        controls.set_player_velocity_x(speed);
        driver.start()?;

        let started = Instant::now();
        loop {
            match events.recv_timeout(POLL) {
                Ok(DriverEvent::RoundEnded(summary)) => {
                    log::info!(
                        "Round {} ended: score {} in {} ms{}",
                        round + 1,
                        summary.score,
                        summary.elapsed_ms,
                        if summary.new_high_score { ", new high score" } else { "" }
                    );
                    break;
                }
                Ok(DriverEvent::Faulted(err)) => return Err(err),
                Err(RecvTimeoutError::Disconnected) => return Err(SimError::DriverShutdown),
                Err(RecvTimeoutError::Timeout) => {}
            }

            if started.elapsed() >= ROUND_LIMIT {
                log::info!("Round {} survived {:?}; calling it", round + 1, ROUND_LIMIT);
                break;
            }

            // Autopilot: one point per poll survived, bounce off the walls
            controls.award(1);
            let snapshot = driver.snapshot();
            let player = snapshot.entities.iter().find(|e| e.kind == EntityKind::Player);
            if let Some(player) = player {
                let x = player.position.x;
                if x <= 0.0 {
                    controls.set_player_velocity_x(speed);
                } else if x + player.size.x >= width {
                    controls.set_player_velocity_x(-speed);
                }
            }
        }
        driver.stop();
    }

    let scores = driver.high_scores();
    match serde_json::to_string_pretty(&scores) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize high scores: {}", e),
    }
    Ok(())
}
