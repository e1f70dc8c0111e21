//! Async host that embeds the engine.
//!
//! A [`GameSession`] plays the role of the screen logic around the engine:
//! it runs the real [`IntervalClock`], serializes ticks and user commands on a
//! single task, and calls the advertisement gateway at the points the game
//! shows ads. Ticks are polled first when both are ready, so a tick and a tap
//! arriving together always apply tick-then-tap.

use tokio::sync::mpsc;

use crate::ads::{restart_requires_ad, AdPlacement, AdvertisementGateway};
use crate::clock::{IntervalClock, Tick};
use crate::difficulty::DifficultyLevel;
use crate::engine::{EngineSettings, GameEngine, RunSnapshot};
use crate::error::{CoreError, Result};
use crate::events::GameEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Tap,
    Restart,
    /// Leave the game screen.
    Stop,
}

pub struct GameSession<A> {
    engine: GameEngine<IntervalClock>,
    ticks: mpsc::UnboundedReceiver<Tick>,
    ads: A,
}

impl<A: AdvertisementGateway> GameSession<A> {
    pub fn new(settings: &EngineSettings, ads: A) -> Result<Self> {
        let (engine, ticks) = GameEngine::interval(settings)?;
        Ok(Self { engine, ticks, ads })
    }

    pub fn engine(&self) -> &GameEngine<IntervalClock> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut GameEngine<IntervalClock> {
        &mut self.engine
    }

    pub fn ads(&self) -> &A {
        &self.ads
    }

    /// Show the difficulty-confirmation interstitials, then start a run.
    pub async fn select_difficulty(&mut self, difficulty: DifficultyLevel) -> GameEvent {
        for placement in AdPlacement::DIFFICULTY_SELECT {
            self.ads.show_interstitial(placement).await;
        }
        self.engine.start(difficulty)
    }

    /// Restart the run, showing an interstitial first if it was lost.
    pub async fn restart(&mut self) -> Result<GameEvent> {
        let phase = self.engine.phase().ok_or_else(CoreError::not_started)?;
        if restart_requires_ad(phase) {
            self.ads.show_interstitial(AdPlacement::RestartAfterLoss).await;
        }
        self.engine.restart()
    }

    /// Drive the started run until `Stop` arrives or every command sender is
    /// dropped. The engine is stopped on the way out.
    pub async fn run(
        &mut self,
        mut commands: mpsc::Receiver<SessionCommand>,
    ) -> Result<Option<RunSnapshot>> {
        if self.engine.run().is_none() {
            return Err(CoreError::not_started());
        }

        loop {
            tokio::select! {
                biased;

                Some(tick) = self.ticks.recv() => {
                    if self.engine.clock().accepts(&tick) {
                        self.engine.on_tick()?;
                    }
                }
                command = commands.recv() => match command {
                    Some(SessionCommand::Tap) => {
                        self.engine.tap()?;
                    }
                    Some(SessionCommand::Restart) => {
                        self.restart().await?;
                    }
                    Some(SessionCommand::Stop) | None => break,
                },
            }
        }

        self.engine.stop();
        Ok(self.engine.snapshot())
    }
}
