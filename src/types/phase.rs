//! Round phase definitions

use serde::{Deserialize, Serialize};

/// Lifecycle of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// No round played yet
    Idle,
    /// Countdown active, classifications are scored
    Running,
    /// Countdown expired or round stopped
    Ended,
}

impl Phase {
    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            Phase::Idle => "\x1b[90m",    // Gray
            Phase::Running => "\x1b[32m", // Green
            Phase::Ended => "\x1b[36m",   // Cyan
        }
    }

    /// Reset ANSI color
    pub fn color_reset() -> &'static str {
        "\x1b[0m"
    }

    /// Get emoji for phase
    pub fn emoji(&self) -> &'static str {
        match self {
            Phase::Idle => "⏸",
            Phase::Running => "⏱",
            Phase::Ended => "🏁",
        }
    }

    /// Can a new round begin from here?
    pub fn can_start(&self) -> bool {
        matches!(self, Phase::Idle | Phase::Ended)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Idle => "IDLE",
            Phase::Running => "RUNNING",
            Phase::Ended => "ENDED",
        };
        write!(f, "{}", name)
    }
}
