use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Delays between presentation sub-steps, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pacing {
    pub opponent_response: u64,
    pub settle: u64,
    pub solo_play: u64,
    pub end_round: u64,
    pub cleanup: u64,
}

impl Pacing {
    /// No waits at all
    pub fn instant() -> Self {
        Pacing {
            opponent_response: 0,
            settle: 0,
            solo_play: 0,
            end_round: 0,
            cleanup: 0,
        }
    }

    pub fn opponent_response(&self) -> Duration {
        Duration::from_millis(self.opponent_response)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle)
    }

    pub fn solo_play(&self) -> Duration {
        Duration::from_millis(self.solo_play)
    }

    pub fn end_round(&self) -> Duration {
        Duration::from_millis(self.end_round)
    }

    pub fn cleanup(&self) -> Duration {
        Duration::from_millis(self.cleanup)
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Pacing {
            opponent_response: 1000,
            settle: 500,
            solo_play: 1000,
            end_round: 2000,
            cleanup: 1000,
        }
    }
}

/// Rules and timing for one game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub energy_budget: u32,
    pub max_rounds: u32,
    /// Tower runs from -tower_bound to +tower_bound
    pub tower_bound: i32,
    /// Planning auto-locks after this long; None waits forever
    pub planning_timeout_ms: Option<u64>,
    pub dice_roll_for_order: bool,
    pub pacing: Pacing,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            energy_budget: 10,
            max_rounds: 10,
            tower_bound: 5,
            planning_timeout_ms: Some(30_000),
            dice_roll_for_order: false,
            pacing: Pacing::default(),
        }
    }
}

impl GameConfig {
    /// Load a config from a JSON file; missing fields take their defaults
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: GameConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with every wait removed, for headless runs
    pub fn headless() -> Self {
        GameConfig {
            planning_timeout_ms: None,
            pacing: Pacing::instant(),
            ..Self::default()
        }
    }

    pub fn planning_timeout(&self) -> Option<Duration> {
        self.planning_timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.energy_budget == 0 {
            return Err(ConfigError::Invalid("energy_budget must be positive".to_string()));
        }
        if self.max_rounds == 0 {
            return Err(ConfigError::Invalid("max_rounds must be positive".to_string()));
        }
        if self.tower_bound < 1 {
            return Err(ConfigError::Invalid("tower_bound must be at least 1".to_string()));
        }
        Ok(())
    }
}
