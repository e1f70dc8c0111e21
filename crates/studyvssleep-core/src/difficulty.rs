//! Difficulty levels and their fixed decay rates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Easy,
    #[default]
    Medium,
    Hard,
    Impossible,
}

/// Percentage points of progress lost per tick.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecayRate(f64);

impl DecayRate {
    pub fn as_f64(self) -> f64 {
        self.0
    }
}

impl fmt::Display for DecayRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Decay rate for a level. The table is fixed and strictly increasing.
pub fn rate_for(level: DifficultyLevel) -> DecayRate {
    match level {
        DifficultyLevel::Easy => DecayRate(0.05),
        DifficultyLevel::Medium => DecayRate(0.15),
        DifficultyLevel::Hard => DecayRate(0.35),
        DifficultyLevel::Impossible => DecayRate(0.60),
    }
}

impl DifficultyLevel {
    /// All levels, easiest first.
    pub const ALL: [DifficultyLevel; 4] = [
        DifficultyLevel::Easy,
        DifficultyLevel::Medium,
        DifficultyLevel::Hard,
        DifficultyLevel::Impossible,
    ];

    pub fn rate(self) -> DecayRate {
        rate_for(self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DifficultyLevel::Easy => "easy",
            DifficultyLevel::Medium => "medium",
            DifficultyLevel::Hard => "hard",
            DifficultyLevel::Impossible => "impossible",
        }
    }

    /// Menu flavour text.
    pub fn description(self) -> &'static str {
        match self {
            DifficultyLevel::Easy => "A gentle nap",
            DifficultyLevel::Medium => "All-nighter",
            DifficultyLevel::Hard => "Exam week",
            DifficultyLevel::Impossible => "Sleep deprivation",
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(DifficultyLevel::Easy),
            "medium" => Ok(DifficultyLevel::Medium),
            "hard" => Ok(DifficultyLevel::Hard),
            "impossible" => Ok(DifficultyLevel::Impossible),
            other => Err(CoreError::InvalidArgument(format!(
                "unknown difficulty '{other}' (expected easy, medium, hard or impossible)"
            ))),
        }
    }
}

impl TryFrom<u8> for DifficultyLevel {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        DifficultyLevel::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| CoreError::InvalidArgument(format!("difficulty index {value} out of range 0..=3")))
    }
}
