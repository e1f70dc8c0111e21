//! Advertisement placeholder.
//!
//! The engine knows nothing about ads. Hosts initialize the gateway once at
//! startup, then call it around certain transitions: twice after a difficulty
//! is picked, and once before restarting a lost run. The gateways here only
//! log and, optionally, wait.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::Phase;

pub const DEFAULT_APP_ID: &str = "ca-app-pub-0000000000000000~0000000000";
pub const DEFAULT_BANNER_ID: &str = "ca-app-pub-0000000000000000/0000000000";
pub const DEFAULT_INTERSTITIAL_DELAY: Duration = Duration::from_millis(1500);
pub const DEFAULT_INIT_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdPlacement {
    DifficultySelectFirst,
    DifficultySelectSecond,
    RestartAfterLoss,
}

impl AdPlacement {
    /// Interstitials shown, in order, once a difficulty is chosen.
    pub const DIFFICULTY_SELECT: [AdPlacement; 2] = [
        AdPlacement::DifficultySelectFirst,
        AdPlacement::DifficultySelectSecond,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AdPlacement::DifficultySelectFirst => "difficulty_select_1",
            AdPlacement::DifficultySelectSecond => "difficulty_select_2",
            AdPlacement::RestartAfterLoss => "restart_game",
        }
    }
}

impl fmt::Display for AdPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Restarting shows an interstitial only after a loss.
pub fn restart_requires_ad(phase: Phase) -> bool {
    phase == Phase::Lost
}

pub trait AdvertisementGateway {
    /// Bring the ad SDK up. Called once before any ad is shown.
    fn initialize(&self) -> impl Future<Output = ()> + Send {
        async {}
    }

    /// Show a full-screen ad and resolve once it has been dismissed.
    fn show_interstitial(&self, placement: AdPlacement) -> impl Future<Output = ()> + Send;

    fn banner_id(&self) -> &str {
        DEFAULT_BANNER_ID
    }
}

/// Gateway that shows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAds;

impl AdvertisementGateway for NoopAds {
    async fn show_interstitial(&self, _placement: AdPlacement) {}
}

/// Gateway that simulates an interstitial by logging and waiting.
#[derive(Debug, Clone)]
pub struct PlaceholderAds {
    delay: Duration,
    init_delay: Duration,
    app_id: String,
    banner_id: String,
}

impl PlaceholderAds {
    pub fn new(delay: Duration, banner_id: impl Into<String>) -> Self {
        Self {
            delay,
            init_delay: DEFAULT_INIT_DELAY,
            app_id: DEFAULT_APP_ID.into(),
            banner_id: banner_id.into(),
        }
    }

    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = app_id.into();
        self
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }
}

impl Default for PlaceholderAds {
    fn default() -> Self {
        Self::new(DEFAULT_INTERSTITIAL_DELAY, DEFAULT_BANNER_ID)
    }
}

impl AdvertisementGateway for PlaceholderAds {
    async fn initialize(&self) {
        tracing::info!(app_id = %self.app_id, "initializing ads");
        if !self.init_delay.is_zero() {
            tokio::time::sleep(self.init_delay).await;
        }
    }

    async fn show_interstitial(&self, placement: AdPlacement) {
        tracing::info!(%placement, delay_ms = self.delay.as_millis() as u64, "showing interstitial ad");
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        tracing::debug!(%placement, "interstitial ad dismissed");
    }

    fn banner_id(&self) -> &str {
        &self.banner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_a_loss_gates_restart() {
        assert!(restart_requires_ad(Phase::Lost));
        assert!(!restart_requires_ad(Phase::Won));
        assert!(!restart_requires_ad(Phase::Playing));
    }

    #[test]
    fn placement_names() {
        let names: Vec<_> = AdPlacement::DIFFICULTY_SELECT.iter().map(|p| p.as_str()).collect();
        assert_eq!(names, ["difficulty_select_1", "difficulty_select_2"]);
        assert_eq!(AdPlacement::RestartAfterLoss.to_string(), "restart_game");
    }

    #[tokio::test(start_paused = true)]
    async fn placeholder_waits_for_delay() {
        let ads = PlaceholderAds::new(Duration::from_millis(1500), "banner");
        let before = tokio::time::Instant::now();
        ads.show_interstitial(AdPlacement::RestartAfterLoss).await;
        assert!(before.elapsed() >= Duration::from_millis(1500));
        assert_eq!(ads.banner_id(), "banner");
    }

    #[tokio::test(start_paused = true)]
    async fn placeholder_initializes_with_app_id() {
        let ads = PlaceholderAds::default().with_app_id("ca-app-pub-test~1");
        assert_eq!(ads.app_id(), "ca-app-pub-test~1");

        let before = tokio::time::Instant::now();
        ads.initialize().await;
        assert!(before.elapsed() >= DEFAULT_INIT_DELAY);

        let before = tokio::time::Instant::now();
        NoopAds.initialize().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }
}
