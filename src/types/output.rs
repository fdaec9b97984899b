//! Observable round state and end-of-round report

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::types::{Gesture, Phase, ReasonCode};

/// Consistent view of the round for display sinks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Gesture the player must defeat
    pub target: Gesture,
    pub score: u32,
    pub remaining_secs: u32,
    pub phase: Phase,
    /// Number of rounds started so far
    pub round: u64,
}

impl RoundSnapshot {
    /// Create new snapshot
    pub fn new(target: Gesture, score: u32, remaining_secs: u32, phase: Phase, round: u64) -> Self {
        Self {
            timestamp: Utc::now(),
            target,
            score,
            remaining_secs,
            phase,
            round,
        }
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let color = self.phase.color_code();
        let reset = Phase::color_reset();

        format!(
            "{}{} {}s | score={} | beat {} {} ({}){}",
            color,
            self.phase.emoji(),
            self.remaining_secs,
            self.score,
            self.target.emoji(),
            self.target.display_name(),
            self.target,
            reset
        )
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "phase={} | remaining={}s | score={} | target={}",
            self.phase, self.remaining_secs, self.score, self.target
        )
    }

    /// Same state, ignoring the timestamp
    pub fn same_state(&self, other: &RoundSnapshot) -> bool {
        self.target == other.target
            && self.score == other.score
            && self.remaining_secs == other.remaining_secs
            && self.phase == other.phase
            && self.round == other.round
    }
}

/// Emitted exactly once when a round ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    pub timestamp: DateTime<Utc>,
    pub round: u64,
    pub final_score: u32,
    /// High score after this round was taken into account
    pub high_score: u32,
    /// This round set a new record
    pub new_record: bool,
    /// G203_TIME_UP or G204_STOPPED
    pub reason: ReasonCode,
}

impl RoundReport {
    pub fn new(round: u64, final_score: u32, prior_high: u32, reason: ReasonCode) -> Self {
        Self {
            timestamp: Utc::now(),
            round,
            final_score,
            high_score: final_score.max(prior_high),
            new_record: final_score > prior_high,
            reason,
        }
    }

    /// Format for terminal display
    pub fn to_parseable_string(&self) -> String {
        format!(
            "round={} | score={} | highscore={} | {}",
            self.round,
            self.final_score,
            self.high_score,
            self.reason.code()
        )
    }
}

/// Live update pushed to subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum GameUpdate {
    State(RoundSnapshot),
    Ended(RoundReport),
}

// =============================================================================
// TESTS
// =============================================================================
