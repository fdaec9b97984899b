//! Game configuration

use std::time::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::core::feed::{validate_confidence, FeedError};
use crate::{CONFIDENCE_THRESHOLD, ROUND_DURATION_SECS, TICK_PERIOD_MS};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid confidence threshold: {0}")]
    Threshold(#[from] FeedError),
    #[error("tick period must be at least 1 ms")]
    ZeroTickPeriod,
}

/// Tunables for a game session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Countdown length per round
    pub round_secs: u32,
    /// Minimum confidence for a correct gesture to score
    pub confidence_threshold: f64,
    /// Countdown tick period in milliseconds
    pub tick_period_ms: u64,
    /// Seed for target selection (random when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round_secs: ROUND_DURATION_SECS,
            confidence_threshold: CONFIDENCE_THRESHOLD,
            tick_period_ms: TICK_PERIOD_MS,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn with_round_secs(mut self, secs: u32) -> Self {
        self.round_secs = secs;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    /// Reject settings that would make the game unplayable
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_confidence(self.confidence_threshold)?;
        if self.tick_period_ms == 0 {
            return Err(ConfigError::ZeroTickPeriod);
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
