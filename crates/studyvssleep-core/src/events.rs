use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::difficulty::DifficultyLevel;
use crate::engine::Phase;

/// Every state change in the engine produces an Event.
/// Presentation layers subscribe to them; the CLI prints them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    RunStarted {
        difficulty: DifficultyLevel,
        progress: f64,
        at: DateTime<Utc>,
    },
    /// Progress reached 100.
    RunWon {
        difficulty: DifficultyLevel,
        elapsed_ms: u64,
        ticks: u64,
        taps: u64,
        at: DateTime<Utc>,
    },
    /// Progress reached 0.
    RunLost {
        difficulty: DifficultyLevel,
        elapsed_ms: u64,
        ticks: u64,
        taps: u64,
        at: DateTime<Utc>,
    },
    /// Engine torn down; no further input is accepted until the next start.
    RunStopped {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        difficulty: DifficultyLevel,
        phase: Phase,
        progress: f64,
        elapsed_ms: u64,
        ticks: u64,
        taps: u64,
        at: DateTime<Utc>,
    },
}
