//! Tick sources for the game engine.
//!
//! A clock only decides *whether* ticks are flowing. Delivery is the host's
//! job: tests call [`GameEngine::on_tick`](crate::GameEngine::on_tick) by hand
//! against a [`ManualClock`], while the async session drains the channel fed
//! by an [`IntervalClock`] and drops anything [`IntervalClock::accepts`]
//! rejects.
//!
//! ## Guarantees
//!
//! - `start` on a running clock stops the previous run first, so two timers
//!   never feed the same engine.
//! - After `stop` returns, no tick from the stopped run is accepted, even one
//!   already sitting in the channel.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Nominal tick period (~60 ticks per second).
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(16);

pub trait GameClock {
    /// Begin producing ticks, stopping any prior run first.
    fn start(&mut self);
    /// Halt tick production. Synchronous with respect to future ticks.
    fn stop(&mut self);
    fn is_running(&self) -> bool;
    fn period(&self) -> Duration;
}

/// Deterministic clock for tests and simulations.
///
/// It never produces ticks on its own; it only tracks the running flag and
/// how often it was started and stopped.
#[derive(Debug, Clone)]
pub struct ManualClock {
    period: Duration,
    running: bool,
    starts: u32,
    stops: u32,
}

impl ManualClock {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            running: false,
            starts: 0,
            stops: 0,
        }
    }

    pub fn starts(&self) -> u32 {
        self.starts
    }

    pub fn stops(&self) -> u32 {
        self.stops
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_PERIOD)
    }
}

impl GameClock for ManualClock {
    fn start(&mut self) {
        self.stop();
        self.running = true;
        self.starts += 1;
    }

    fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.stops += 1;
        }
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn period(&self) -> Duration {
        self.period
    }
}

/// A tick produced by an [`IntervalClock`], stamped with the run it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    generation: u64,
}

/// Tokio-backed periodic clock.
///
/// Must be started from within a tokio runtime.
#[derive(Debug)]
pub struct IntervalClock {
    period: Duration,
    sender: mpsc::UnboundedSender<Tick>,
    task: Option<JoinHandle<()>>,
    generation: u64,
}

impl IntervalClock {
    /// Create a stopped clock and the receiver its ticks arrive on.
    pub fn new(period: Duration) -> (Self, mpsc::UnboundedReceiver<Tick>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let clock = Self {
            period,
            sender,
            task: None,
            generation: 0,
        };
        (clock, receiver)
    }

    /// Whether `tick` belongs to the current, still running, run.
    pub fn accepts(&self, tick: &Tick) -> bool {
        self.task.is_some() && tick.generation == self.generation
    }
}

impl GameClock for IntervalClock {
    fn start(&mut self) {
        self.stop();
        self.generation += 1;

        let generation = self.generation;
        let period = self.period;
        let sender = self.sender.clone();
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if sender.send(Tick { generation }).is_err() {
                    break;
                }
            }
        }));
        tracing::trace!(generation, ?period, "interval clock started");
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            // Anything still queued from this run is now stale.
            self.generation += 1;
            tracing::trace!(generation = self.generation, "interval clock stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.task.is_some()
    }

    fn period(&self) -> Duration {
        self.period
    }
}

impl Drop for IntervalClock {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
