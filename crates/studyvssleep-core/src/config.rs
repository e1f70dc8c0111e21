//! TOML-based application configuration.
//!
//! Stores game tunables (tick interval, tap impulse, default difficulty) and
//! the advertisement placeholder settings. Run state is never persisted.
//!
//! Configuration is stored at `~/.config/studyvssleep/config.toml`, or under
//! `$STUDYVSSLEEP_CONFIG_DIR` when that variable is set.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ads::{DEFAULT_APP_ID, DEFAULT_BANNER_ID, DEFAULT_INTERSTITIAL_DELAY};
use crate::clock::DEFAULT_TICK_PERIOD;
use crate::difficulty::DifficultyLevel;
use crate::engine::{EngineSettings, DEFAULT_TAP_IMPULSE, MIN_TAP_IMPULSE};
use crate::error::{ConfigError, Result};

pub const CONFIG_DIR_ENV: &str = "STUDYVSSLEEP_CONFIG_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_tap_impulse")]
    pub tap_impulse: f64,
    #[serde(default)]
    pub default_difficulty: DifficultyLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_interstitial_delay_ms")]
    pub interstitial_delay_ms: u64,
    #[serde(default = "default_banner_id")]
    pub banner_id: String,
    #[serde(default = "default_app_id")]
    pub app_id: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<config dir>/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub ads: AdsConfig,
}

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_PERIOD.as_millis() as u64
}
fn default_tap_impulse() -> f64 {
    DEFAULT_TAP_IMPULSE
}
fn default_true() -> bool {
    true
}
fn default_interstitial_delay_ms() -> u64 {
    DEFAULT_INTERSTITIAL_DELAY.as_millis() as u64
}
fn default_banner_id() -> String {
    DEFAULT_BANNER_ID.into()
}
fn default_app_id() -> String {
    DEFAULT_APP_ID.into()
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            tap_impulse: default_tap_impulse(),
            default_difficulty: DifficultyLevel::default(),
        }
    }
}

impl Default for AdsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interstitial_delay_ms: default_interstitial_delay_ms(),
            banner_id: default_banner_id(),
            app_id: default_app_id(),
        }
    }
}

/// Returns `$STUDYVSSLEEP_CONFIG_DIR` or `~/.config/studyvssleep/`, creating it.
pub fn config_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) => PathBuf::from(dir),
        None => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("studyvssleep"),
    };
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let (parent, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut current = root;
        if let Some(parent) = parent {
            for part in parent.split('.') {
                current = current
                    .get_mut(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
            }
        }

        let obj = current
            .as_object_mut()
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        let existing = obj
            .get(leaf)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|e| invalid(format!("cannot parse '{value}' as bool: {e}")))?,
            ),
            serde_json::Value::Number(n) => {
                if let (true, Ok(parsed)) = (n.is_u64(), value.parse::<u64>()) {
                    serde_json::Value::Number(parsed.into())
                } else if let Ok(parsed) = value.parse::<f64>() {
                    serde_json::Number::from_f64(parsed)
                        .map(serde_json::Value::Number)
                        .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                } else {
                    return Err(invalid(format!("cannot parse '{value}' as number")));
                }
            }
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    pub fn path() -> Result<PathBuf> {
        Ok(config_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(err) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: err.to_string(),
            }
            .into()),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Update a value by dot-separated key without saving.
    ///
    /// The new value is parsed according to the type of the current one and
    /// the whole config is re-validated.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Update a value by key and persist. Returns error if key is unknown.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        self.save()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.game.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "game.tick_interval_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        if !(self.game.tap_impulse.is_finite() && self.game.tap_impulse >= MIN_TAP_IMPULSE) {
            return Err(ConfigError::InvalidValue {
                key: "game.tap_impulse".into(),
                message: format!("must be at least {MIN_TAP_IMPULSE}, got {}", self.game.tap_impulse),
            });
        }
        Ok(())
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            tick_period: Duration::from_millis(self.game.tick_interval_ms),
            tap_impulse: self.game.tap_impulse,
        }
    }

    pub fn interstitial_delay(&self) -> Duration {
        Duration::from_millis(self.ads.interstitial_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.game.tick_interval_ms, 16);
        assert_eq!(parsed.game.tap_impulse, 5.0);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[game]\ntap_impulse = 2.5\n").unwrap();
        assert_eq!(parsed.game.tap_impulse, 2.5);
        assert_eq!(parsed.game.default_difficulty, DifficultyLevel::Medium);
        assert!(parsed.ads.enabled);
    }

    #[test]
    fn get_by_dot_path() {
        let cfg = Config::default();
        assert_eq!(cfg.get("game.tick_interval_ms").as_deref(), Some("16"));
        assert_eq!(cfg.get("game.default_difficulty").as_deref(), Some("medium"));
        assert_eq!(cfg.get("ads.enabled").as_deref(), Some("true"));
        assert!(cfg.get("game.nope").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn apply_parses_by_existing_type() {
        let mut cfg = Config::default();
        cfg.apply("game.tap_impulse", "7.5").unwrap();
        cfg.apply("game.tick_interval_ms", "33").unwrap();
        cfg.apply("game.default_difficulty", "hard").unwrap();
        cfg.apply("ads.enabled", "false").unwrap();

        assert_eq!(cfg.game.tap_impulse, 7.5);
        assert_eq!(cfg.engine_settings().tick_period, Duration::from_millis(33));
        assert_eq!(cfg.game.default_difficulty, DifficultyLevel::Hard);
        assert!(!cfg.ads.enabled);
    }

    #[test]
    fn smallest_valid_impulse_builds_an_engine() {
        let mut cfg = Config::default();
        cfg.apply("game.tap_impulse", "0.0001").unwrap();
        assert!(crate::GameEngine::manual(&cfg.engine_settings()).is_ok());
    }

    #[test]
    fn apply_rejects_bad_values() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("game.nope", "1"),
            Err(CoreError::Config(ConfigError::UnknownKey(_)))
        ));
        assert!(matches!(
            cfg.apply("ads.enabled", "maybe"),
            Err(CoreError::Config(ConfigError::InvalidValue { .. }))
        ));
        assert!(matches!(
            cfg.apply("game.tick_interval_ms", "0"),
            Err(CoreError::Config(ConfigError::InvalidValue { .. }))
        ));
        assert!(matches!(
            cfg.apply("game.tap_impulse", "-1"),
            Err(CoreError::Config(ConfigError::InvalidValue { .. }))
        ));
        assert!(matches!(
            cfg.apply("game.tap_impulse", "0.00001"),
            Err(CoreError::Config(ConfigError::InvalidValue { .. }))
        ));
        assert!(matches!(
            cfg.apply("game.default_difficulty", "nightmare"),
            Err(CoreError::Config(ConfigError::InvalidValue { .. }))
        ));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.apply("game.default_difficulty", "impossible").unwrap();
        changed.save_to(&path).unwrap();
        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.game.default_difficulty, DifficultyLevel::Impossible);
    }

    #[test]
    fn load_from_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[game\ntick_interval_ms = ").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(CoreError::Config(ConfigError::LoadFailed { .. }))
        ));
    }
}
