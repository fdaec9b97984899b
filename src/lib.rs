//! Handsign: timed rock-paper-scissors against a gesture classifier
//!
//! Pipeline: classifier feed → GameController → RoundEngine → TargetSelector,
//! with a 1-second countdown running alongside in the same task.

pub mod core;
pub mod types;

// =============================================================================
// ROUND
// =============================================================================

/// Length of one round in seconds
pub const ROUND_DURATION_SECS: u32 = 30;

/// Minimum classifier confidence for a correct gesture to score
pub const CONFIDENCE_THRESHOLD: f64 = 0.8;

/// Countdown tick period (milliseconds)
pub const TICK_PERIOD_MS: u64 = 1000;

// =============================================================================
// RUNTIME
// =============================================================================

/// Capacity of the controller ingress queue
pub const INGRESS_CAPACITY: usize = 256;

/// Capacity of the update broadcast channel
pub const UPDATE_CHANNEL_CAPACITY: usize = 100;

/// Key the high score is persisted under
pub const HIGHSCORE_KEY: &str = "highscore";

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "0.1.0";
