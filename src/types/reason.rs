//! Reason codes for classification judgments and round transitions

use serde::{Deserialize, Serialize};

/// Why an input did (or did not) change the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    // =========================================================================
    // G100: Classification judgments
    // =========================================================================
    /// Counter-gesture shown with enough confidence
    G101_SCORED,
    /// Counter-gesture shown but classifier unsure
    G102_LOW_CONFIDENCE,
    /// Known gesture that does not beat the target
    G103_WRONG_GESTURE,
    /// Label outside the vocabulary
    G104_UNRECOGNIZED,
    /// Round is not running
    G105_NOT_RUNNING,

    // =========================================================================
    // G200: Round lifecycle
    // =========================================================================
    /// Round started
    G201_ROUND_STARTED,
    /// Countdown decremented
    G202_TICK,
    /// Countdown reached zero
    G203_TIME_UP,
    /// Round stopped from outside
    G204_STOPPED,
}

impl ReasonCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::G101_SCORED => "G101_SCORED",
            Self::G102_LOW_CONFIDENCE => "G102_LOW_CONFIDENCE",
            Self::G103_WRONG_GESTURE => "G103_WRONG_GESTURE",
            Self::G104_UNRECOGNIZED => "G104_UNRECOGNIZED",
            Self::G105_NOT_RUNNING => "G105_NOT_RUNNING",
            Self::G201_ROUND_STARTED => "G201_ROUND_STARTED",
            Self::G202_TICK => "G202_TICK",
            Self::G203_TIME_UP => "G203_TIME_UP",
            Self::G204_STOPPED => "G204_STOPPED",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::G101_SCORED => "Correct gesture, point scored",
            Self::G102_LOW_CONFIDENCE => "Correct gesture, confidence too low",
            Self::G103_WRONG_GESTURE => "Gesture does not beat the target",
            Self::G104_UNRECOGNIZED => "Unrecognized label",
            Self::G105_NOT_RUNNING => "No round running",
            Self::G201_ROUND_STARTED => "Round started",
            Self::G202_TICK => "Countdown",
            Self::G203_TIME_UP => "Time is up",
            Self::G204_STOPPED => "Round stopped",
        }
    }

    /// Did this judgment change the score?
    pub fn is_score(&self) -> bool {
        matches!(self, Self::G101_SCORED)
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}

// =============================================================================
// TESTS
// =============================================================================
