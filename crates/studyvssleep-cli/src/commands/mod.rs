pub mod config;
pub mod difficulties;
pub mod play;
pub mod simulate;

use studyvssleep_core::DifficultyLevel;

/// clap value parser backed by `DifficultyLevel::from_str`.
pub fn parse_difficulty(value: &str) -> Result<DifficultyLevel, String> {
    value.parse::<DifficultyLevel>().map_err(|e| e.to_string())
}
