//! Threaded tick driver
//!
//! One long-lived worker thread owns the ticking. `start` and `stop` flip its
//! state; they never spawn a second loop. Other contexts interact through
//! three narrow channels:
//! - [`Controls`]: lock-free input (player velocity, score awards), applied by
//!   the worker at the start of each tick
//! - [`TickDriver::snapshot`]: an immutable [`Snapshot`] published after every
//!   tick, so readers never see a registry mid-pass
//! - [`DriverEvent`]s on an mpsc channel (round over, faults)

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::SimError;
use crate::highscores::HighScores;
use crate::sim::{GameEvent, GameState, RoundSummary, Snapshot, tick};

/// Notifications for the lifecycle layer
#[derive(Debug)]
pub enum DriverEvent {
    /// The player died; the driver has stopped itself
    RoundEnded(RoundSummary),
    /// A tick failed a precondition, or the worker panicked and the driver
    /// has shut down; either way no more ticks run on this round
    Faulted(SimError),
}

/// Input channel shared with the input context
#[derive(Debug, Clone, Default)]
pub struct Controls {
    inner: Arc<ControlState>,
}

#[derive(Debug, Default)]
struct ControlState {
    /// f32 bits of the desired player x-velocity
    velocity_x: AtomicU32,
    pending_score: AtomicU64,
}

impl Controls {
    /// Desired horizontal velocity; clamped to the player's cap when applied
    pub fn set_player_velocity_x(&self, dx: f32) {
        self.inner.velocity_x.store(dx.to_bits(), Ordering::Relaxed);
    }

    pub fn player_velocity_x(&self) -> f32 {
        f32::from_bits(self.inner.velocity_x.load(Ordering::Relaxed))
    }

    /// Queue points to add to the score on the next tick
    pub fn award(&self, points: u64) {
        self.inner.pending_score.fetch_add(points, Ordering::Relaxed);
    }

    fn apply(&self, state: &mut GameState) {
        state.set_player_velocity_x(self.player_velocity_x());
        let points = self.inner.pending_score.swap(0, Ordering::Relaxed);
        if points > 0 {
            state.increment_score(points);
        }
    }

    fn reset(&self) {
        self.set_player_velocity_x(0.0);
        self.inner.pending_score.store(0, Ordering::Relaxed);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Stopped,
    Running,
    Shutdown,
}

#[derive(Debug)]
struct DriverControl {
    mode: Mode,
    /// A tick is in flight
    ticking: bool,
}

struct Shared {
    control: Mutex<DriverControl>,
    wake: Condvar,
    state: Mutex<GameState>,
    snapshot: RwLock<Arc<Snapshot>>,
    leaderboard: Mutex<HighScores>,
}

/// Runs the simulation on a dedicated thread
pub struct TickDriver {
    shared: Arc<Shared>,
    controls: Controls,
    worker: Option<JoinHandle<()>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TickDriver {
    /// Take ownership of a round and park a worker for it. Nothing ticks until
    /// [`TickDriver::start`] is called.
    pub fn new(state: GameState) -> (Self, Receiver<DriverEvent>) {
        Self::with_high_scores(state, HighScores::new())
    }

    /// Like [`TickDriver::new`] with a leaderboard restored by the host
    pub fn with_high_scores(state: GameState, scores: HighScores) -> (Self, Receiver<DriverEvent>) {
        let baseline = scores.top_score().unwrap_or(0).max(state.high_score());
        let state = state.with_high_score(baseline);
        let pause = state.config.tick_pause();

        let shared = Arc::new(Shared {
            control: Mutex::new(DriverControl {
                mode: Mode::Stopped,
                ticking: false,
            }),
            wake: Condvar::new(),
            snapshot: RwLock::new(Arc::new(state.snapshot())),
            state: Mutex::new(state),
            leaderboard: Mutex::new(scores),
        });
        let controls = Controls::default();
        let (tx, rx) = mpsc::channel();

        let worker = {
            let shared = Arc::clone(&shared);
            let controls = controls.clone();
            thread::spawn(move || run(shared, controls, tx, pause))
        };

        (
            Self {
                shared,
                controls,
                worker: Some(worker),
            },
            rx,
        )
    }

    /// Begin ticking. No-op if already running, or if the round is over.
    pub fn start(&self) -> Result<(), SimError> {
        let mut control = lock(&self.shared.control);
        match control.mode {
            Mode::Running => Ok(()),
            Mode::Shutdown => Err(SimError::DriverShutdown),
            Mode::Stopped => {
                if lock(&self.shared.state).is_over() {
                    log::warn!("start() ignored: round is over, begin a new round first");
                    return Ok(());
                }
                control.mode = Mode::Running;
                self.shared.wake.notify_all();
                log::info!("Tick driver started");
                Ok(())
            }
        }
    }

    /// Halt ticking. Returns once any in-flight tick has completed; no
    /// mutation happens after that until the next `start`.
    pub fn stop(&self) {
        let mut control = lock(&self.shared.control);
        if control.mode == Mode::Running {
            control.mode = Mode::Stopped;
            log::info!("Tick driver stopped");
        }
        while control.ticking {
            control = self
                .shared
                .wake
                .wait(control)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub fn is_running(&self) -> bool {
        lock(&self.shared.control).mode == Mode::Running
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<Snapshot> {
        let guard = self
            .shared
            .snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Handle for the input context
    pub fn controls(&self) -> Controls {
        self.controls.clone()
    }

    pub fn high_scores(&self) -> HighScores {
        lock(&self.shared.leaderboard).clone()
    }

    /// Replace the round ("play again"). The driver must be stopped. The new
    /// round has to beat the best leaderboard score.
    pub fn new_round(&self, state: GameState) -> Result<(), SimError> {
        let mut control = lock(&self.shared.control);
        while control.ticking && control.mode == Mode::Stopped {
            control = self
                .shared
                .wake
                .wait(control)
                .unwrap_or_else(PoisonError::into_inner);
        }
        match control.mode {
            Mode::Running => return Err(SimError::DriverRunning),
            Mode::Shutdown => return Err(SimError::DriverShutdown),
            Mode::Stopped => {}
        }

        let baseline = lock(&self.shared.leaderboard).top_score().unwrap_or(0);
        let prior = state.high_score();
        let state = state.with_high_score(baseline.max(prior));
        let snapshot = Arc::new(state.snapshot());
        *lock(&self.shared.state) = state;
        *self
            .shared
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = snapshot;
        self.controls.reset();
        drop(control);

        log::info!("New round installed");
        Ok(())
    }
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        {
            let mut control = lock(&self.shared.control);
            control.mode = Mode::Shutdown;
            self.shared.wake.notify_all();
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Tick worker panicked");
            }
        }
    }
}

/// Marks the driver shut down however the worker exits, so `stop` and
/// `new_round` never wait on a tick that will not finish
struct WorkerExit<'a> {
    shared: &'a Shared,
}

impl Drop for WorkerExit<'_> {
    fn drop(&mut self) {
        let mut control = lock(&self.shared.control);
        control.mode = Mode::Shutdown;
        control.ticking = false;
        self.shared.wake.notify_all();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Worker loop: wait while stopped, otherwise tick with the wall-clock delta
fn run(shared: Arc<Shared>, controls: Controls, events: Sender<DriverEvent>, pause: Duration) {
    let _exit = WorkerExit { shared: &shared };
    let mut last: Option<Instant> = None;

    loop {
        {
            let mut control = lock(&shared.control);
            loop {
                match control.mode {
                    Mode::Shutdown => return,
                    Mode::Running => break,
                    Mode::Stopped => {
                        // Time spent stopped is not simulated
                        last = None;
                        control = shared
                            .wake
                            .wait(control)
                            .unwrap_or_else(PoisonError::into_inner);
                    }
                }
            }
            control.ticking = true;
        }

        let now = Instant::now();
        let dt = last.map_or(Duration::ZERO, |prev| now - prev);
        last = Some(now);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut state = lock(&shared.state);
            controls.apply(&mut state);
            let result = tick(&mut state, dt);
            let snapshot = Arc::new(state.snapshot());
            *shared
                .snapshot
                .write()
                .unwrap_or_else(PoisonError::into_inner) = snapshot;
            result
        }));
        let result = match outcome {
            Ok(result) => result,
            Err(payload) => {
                // Round state may be mid-pass; nothing more is ticked on it
                let err = SimError::WorkerPanicked(panic_message(payload.as_ref()));
                log::error!("Tick worker shutting down: {}", err);
                let _ = events.send(DriverEvent::Faulted(err));
                return;
            }
        };

        let halt = match result {
            Ok(tick_events) => {
                let mut halt = false;
                for event in tick_events {
                    if let GameEvent::RoundEnded(summary) = event {
                        let rank = lock(&shared.leaderboard).add_score(summary.score, summary.elapsed_ms);
                        if let Some(rank) = rank {
                            log::info!("Score {} entered the leaderboard at #{}", summary.score, rank);
                        }
                        // Receiver may be gone; the driver keeps working without it
                        let _ = events.send(DriverEvent::RoundEnded(summary));
                        halt = true;
                    }
                }
                halt
            }
            Err(err) => {
                log::error!("Tick failed: {}", err);
                let _ = events.send(DriverEvent::Faulted(err));
                true
            }
        };

        {
            let mut control = lock(&shared.control);
            control.ticking = false;
            if halt && control.mode == Mode::Running {
                control.mode = Mode::Stopped;
                log::info!("Tick driver stopped: round finished");
            }
            shared.wake.notify_all();
        }

        if pause.is_zero() {
            thread::yield_now();
        } else {
            thread::sleep(pause);
        }
    }
}
