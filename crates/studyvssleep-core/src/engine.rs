//! Game engine implementation.
//!
//! The engine is a tick-driven state machine. It owns its clock but never
//! waits on it: whoever receives the clock's ticks calls [`GameEngine::on_tick`],
//! and user input arrives through [`GameEngine::tap`]. All calls are expected
//! on one thread of control, so ordering is whatever order the host applies.
//!
//! ## State Transitions
//!
//! ```text
//! start -> Playing -> (Won | Lost)
//! restart / start: any -> fresh Playing run
//! ```
//!
//! ## Usage
//!
//! ```
//! use studyvssleep_core::{DifficultyLevel, GameEngine, ManualClock, Phase};
//!
//! let mut engine = GameEngine::new(ManualClock::default(), 5.0).unwrap();
//! engine.start(DifficultyLevel::Easy);
//! for _ in 0..10 {
//!     engine.tap().unwrap();
//! }
//! assert_eq!(engine.phase(), Some(Phase::Won));
//! ```

use std::fmt;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::clock::{GameClock, IntervalClock, ManualClock, Tick, DEFAULT_TICK_PERIOD};
use crate::difficulty::{rate_for, DifficultyLevel};
use crate::error::{CoreError, Result};
use crate::events::GameEvent;

/// Fixed-point resolution: progress is tracked in 1/10000 of a percentage point.
const UNITS_PER_POINT: f64 = 10_000.0;
const MAX_UNITS: i64 = 100 * 10_000;
const START_UNITS: i64 = 50 * 10_000;

/// Default progress gained per tap.
pub const DEFAULT_TAP_IMPULSE: f64 = 5.0;
/// Smallest tap impulse the fixed-point progress can represent.
pub const MIN_TAP_IMPULSE: f64 = 0.0001;
/// Elapsed time is counted in whole milliseconds.
const MIN_TICK_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Playing,
    Won,
    Lost,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Phase::Playing)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Playing => f.write_str("playing"),
            Phase::Won => f.write_str("won"),
            Phase::Lost => f.write_str("lost"),
        }
    }
}

/// Tunables for building an engine and its clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    pub tick_period: Duration,
    pub tap_impulse: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tick_period: DEFAULT_TICK_PERIOD,
            tap_impulse: DEFAULT_TAP_IMPULSE,
        }
    }
}

/// Mutable state of one run. Replaced wholesale on every start.
#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    progress_units: i64,
    phase: Phase,
    elapsed_ms: u64,
    ticks: u64,
    taps: u64,
    difficulty: DifficultyLevel,
}

impl RunState {
    fn new(difficulty: DifficultyLevel) -> Self {
        Self {
            progress_units: START_UNITS,
            phase: Phase::Playing,
            elapsed_ms: 0,
            ticks: 0,
            taps: 0,
            difficulty,
        }
    }

    /// Progress in percentage points, always within `0.0..=100.0`.
    pub fn progress(&self) -> f64 {
        self.progress_units as f64 / UNITS_PER_POINT
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn taps(&self) -> u64 {
        self.taps
    }

    pub fn difficulty(&self) -> DifficultyLevel {
        self.difficulty
    }

    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            difficulty: self.difficulty,
            phase: self.phase,
            progress: self.progress(),
            elapsed_ms: self.elapsed_ms,
            ticks: self.ticks,
            taps: self.taps,
        }
    }

    /// Store `units` through the shared clamp and report whether the run ended.
    fn settle(&mut self, units: i64) -> bool {
        let (units, phase) = clamp_progress(units);
        self.progress_units = units;
        self.phase = phase;
        phase.is_terminal()
    }
}

/// Owned copy of a run, handed to observers and printed by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub difficulty: DifficultyLevel,
    pub phase: Phase,
    pub progress: f64,
    pub elapsed_ms: u64,
    pub ticks: u64,
    pub taps: u64,
}

impl RunSnapshot {
    pub fn to_event(&self) -> GameEvent {
        GameEvent::StateSnapshot {
            difficulty: self.difficulty,
            phase: self.phase,
            progress: self.progress,
            elapsed_ms: self.elapsed_ms,
            ticks: self.ticks,
            taps: self.taps,
            at: Utc::now(),
        }
    }
}

/// Boundary policy shared by ticks and taps. The lower bound wins ties.
fn clamp_progress(units: i64) -> (i64, Phase) {
    if units <= 0 {
        (0, Phase::Lost)
    } else if units >= MAX_UNITS {
        (MAX_UNITS, Phase::Won)
    } else {
        (units, Phase::Playing)
    }
}

fn to_units(points: f64) -> i64 {
    (points * UNITS_PER_POINT).round() as i64
}

type Observer = Box<dyn FnMut(&GameEvent) + Send>;

/// Core game engine.
pub struct GameEngine<C: GameClock = ManualClock> {
    clock: C,
    impulse_units: i64,
    run: Option<RunState>,
    accepting: bool,
    observers: Vec<Observer>,
}

impl GameEngine<ManualClock> {
    /// Engine on a [`ManualClock`]; ticks are applied by calling `on_tick`.
    pub fn manual(settings: &EngineSettings) -> Result<Self> {
        Self::new(ManualClock::new(settings.tick_period), settings.tap_impulse)
    }
}

impl GameEngine<IntervalClock> {
    /// Engine on a tokio [`IntervalClock`], plus the receiver its ticks arrive on.
    pub fn interval(settings: &EngineSettings) -> Result<(Self, mpsc::UnboundedReceiver<Tick>)> {
        let (clock, ticks) = IntervalClock::new(settings.tick_period);
        Ok((Self::new(clock, settings.tap_impulse)?, ticks))
    }
}

impl<C: GameClock> GameEngine<C> {
    /// Create an idle engine. `tap_impulse` must be a finite number of
    /// percentage points no smaller than [`MIN_TAP_IMPULSE`], and the clock
    /// period at least one millisecond.
    pub fn new(clock: C, tap_impulse: f64) -> Result<Self> {
        if !(tap_impulse.is_finite() && tap_impulse >= MIN_TAP_IMPULSE) {
            return Err(CoreError::InvalidArgument(format!(
                "tap impulse must be at least {MIN_TAP_IMPULSE}, got {tap_impulse}"
            )));
        }
        if clock.period() < MIN_TICK_PERIOD {
            return Err(CoreError::InvalidArgument(format!(
                "tick period must be at least 1ms, got {:?}",
                clock.period()
            )));
        }
        let impulse_units = to_units(tap_impulse);
        Ok(Self {
            clock,
            impulse_units,
            run: None,
            accepting: false,
            observers: Vec::new(),
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn run(&self) -> Option<&RunState> {
        self.run.as_ref()
    }

    pub fn snapshot(&self) -> Option<RunSnapshot> {
        self.run.as_ref().map(RunState::snapshot)
    }

    pub fn phase(&self) -> Option<Phase> {
        self.run.as_ref().map(RunState::phase)
    }

    pub fn progress(&self) -> Option<f64> {
        self.run.as_ref().map(RunState::progress)
    }

    /// True while a run is Playing and the engine has not been stopped.
    pub fn is_accepting_input(&self) -> bool {
        self.accepting && self.phase() == Some(Phase::Playing)
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn tap_impulse(&self) -> f64 {
        self.impulse_units as f64 / UNITS_PER_POINT
    }

    /// Register a state-change observer. It sees every event the engine emits,
    /// including a `StateSnapshot` after each mutation.
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&GameEvent) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Discard any current run and begin a fresh one at progress 50.
    pub fn start(&mut self, difficulty: DifficultyLevel) -> GameEvent {
        self.clock.stop();
        let run = RunState::new(difficulty);
        let progress = run.progress();
        self.run = Some(run);
        self.accepting = true;
        self.clock.start();

        tracing::debug!(%difficulty, rate = %rate_for(difficulty), "run started");
        let event = GameEvent::RunStarted {
            difficulty,
            progress,
            at: Utc::now(),
        };
        self.emit(Some(&event));
        event
    }

    /// Apply one tick of decay. Returns the terminal event if this tick ended the run.
    pub fn on_tick(&mut self) -> Result<Option<GameEvent>> {
        let period_ms = self.clock.period().as_millis() as u64;
        let Some(run) = self.live_run()? else {
            return Ok(None);
        };

        // The tick that ends the game still counts.
        run.elapsed_ms = run.elapsed_ms.saturating_add(period_ms);
        run.ticks += 1;
        let decay = to_units(rate_for(run.difficulty).as_f64());
        let ended = run.settle(run.progress_units - decay);

        Ok(self.after_mutation(ended))
    }

    /// Apply one tap impulse. Returns the terminal event if this tap won the run.
    pub fn tap(&mut self) -> Result<Option<GameEvent>> {
        let impulse = self.impulse_units;
        let Some(run) = self.live_run()? else {
            return Ok(None);
        };

        run.taps += 1;
        let ended = run.settle(run.progress_units.saturating_add(impulse));

        Ok(self.after_mutation(ended))
    }

    /// Start a fresh run with the current difficulty, whatever the phase.
    pub fn restart(&mut self) -> Result<GameEvent> {
        let difficulty = self.run.as_ref().ok_or_else(CoreError::not_started)?.difficulty;
        tracing::debug!(%difficulty, "restarting run");
        Ok(self.start(difficulty))
    }

    /// Tear the engine down: halt the clock and ignore input until the next start.
    pub fn stop(&mut self) -> Option<GameEvent> {
        self.clock.stop();
        if !self.accepting {
            return None;
        }
        self.accepting = false;
        tracing::debug!("engine stopped");
        let event = GameEvent::RunStopped { at: Utc::now() };
        self.emit(Some(&event));
        Some(event)
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// The run if it may still change, `None` if input should be ignored.
    fn live_run(&mut self) -> Result<Option<&mut RunState>> {
        let accepting = self.accepting;
        let run = self.run.as_mut().ok_or_else(CoreError::not_started)?;
        if !accepting || run.phase.is_terminal() {
            return Ok(None);
        }
        Ok(Some(run))
    }

    fn after_mutation(&mut self, ended: bool) -> Option<GameEvent> {
        let event = if ended {
            self.clock.stop();
            self.run.as_ref().map(terminal_event)
        } else {
            None
        };
        self.emit(event.as_ref());
        event
    }

    fn emit(&mut self, event: Option<&GameEvent>) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = match self.run.as_ref() {
            Some(run) => run.snapshot().to_event(),
            None => return,
        };
        for observer in &mut self.observers {
            if let Some(event) = event {
                observer(event);
            }
            observer(&snapshot);
        }
    }
}

fn terminal_event(run: &RunState) -> GameEvent {
    let at = Utc::now();
    match run.phase {
        Phase::Lost => {
            tracing::info!(difficulty = %run.difficulty, ticks = run.ticks, taps = run.taps, "run lost");
            GameEvent::RunLost {
                difficulty: run.difficulty,
                elapsed_ms: run.elapsed_ms,
                ticks: run.ticks,
                taps: run.taps,
                at,
            }
        }
        _ => {
            tracing::info!(difficulty = %run.difficulty, ticks = run.ticks, taps = run.taps, "run won");
            GameEvent::RunWon {
                difficulty: run.difficulty,
                elapsed_ms: run.elapsed_ms,
                ticks: run.ticks,
                taps: run.taps,
                at,
            }
        }
    }
}

impl<C: GameClock + fmt::Debug> fmt::Debug for GameEngine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameEngine")
            .field("clock", &self.clock)
            .field("impulse_units", &self.impulse_units)
            .field("run", &self.run)
            .field("accepting", &self.accepting)
            .field("observers", &self.observers.len())
            .finish()
    }
}
