//! # Study vs Sleep Core Library
//!
//! This library provides the game logic for Study vs Sleep, a tap-based
//! balance game: study progress drifts toward "sleep" every tick and each tap
//! pushes it back toward "study". Reaching 100 wins, reaching 0 loses.
//!
//! ## Architecture
//!
//! - **Difficulty**: fixed table of per-tick decay rates
//! - **Clock**: tick sources; a manual one for deterministic hosts and a
//!   tokio interval for real time
//! - **Engine**: the run state machine (`Playing -> Won | Lost`)
//! - **Session**: async host that serializes ticks and commands and calls the
//!   advertisement placeholder at the right moments
//! - **Config**: TOML-based settings
//!
//! ## Key Components
//!
//! - [`GameEngine`]: Core state machine
//! - [`GameClock`]: Tick source abstraction
//! - [`GameSession`]: Real-time host
//! - [`Config`]: Application configuration management

pub mod ads;
pub mod clock;
pub mod config;
pub mod difficulty;
pub mod engine;
pub mod error;
pub mod events;
pub mod session;

pub use ads::{restart_requires_ad, AdPlacement, AdvertisementGateway, NoopAds, PlaceholderAds};
pub use clock::{GameClock, IntervalClock, ManualClock, Tick, DEFAULT_TICK_PERIOD};
pub use config::Config;
pub use difficulty::{rate_for, DecayRate, DifficultyLevel};
pub use engine::{
    EngineSettings, GameEngine, Phase, RunSnapshot, RunState, DEFAULT_TAP_IMPULSE, MIN_TAP_IMPULSE,
};
pub use error::{ConfigError, CoreError};
pub use events::GameEvent;
pub use session::{GameSession, SessionCommand};
