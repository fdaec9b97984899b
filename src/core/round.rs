//! Round Engine: countdown state machine with confidence-gated scoring
//!
//! State transitions:
//! - IDLE | ENDED → RUNNING: start() / restart()
//! - RUNNING → ENDED: countdown reaches 0, or stop()
//!
//! Ticks and classifications outside RUNNING are no-ops. The engine is
//! synchronous; callers serialize access (see `controller`).

use log::{debug, info, warn};
use crate::core::store::HighScoreStore;
use crate::core::target::TargetSelector;
use crate::types::{
    ClassificationEvent, GameConfig, Gesture, Observation, Phase, ReasonCode, RoundReport,
    RoundSnapshot,
};

/// Result of feeding one classification
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationOutcome {
    pub reason: ReasonCode,
    /// Gesture the label mapped to
    pub observed: Option<Gesture>,
    /// State after the classification was applied
    pub snapshot: RoundSnapshot,
}

impl ClassificationOutcome {
    pub fn scored(&self) -> bool {
        self.reason.is_score()
    }
}

/// Result of one countdown tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Round not running
    Ignored,
    /// Countdown decremented, round continues
    Counting(RoundSnapshot),
    /// Countdown expired
    Ended(RoundReport),
}

/// Round state machine
#[derive(Debug)]
pub struct RoundEngine {
    config: GameConfig,
    selector: TargetSelector,
    store: Box<dyn HighScoreStore>,
    target: Gesture,
    score: u32,
    remaining_secs: u32,
    phase: Phase,
    /// Rounds started so far
    round: u64,
}

impl RoundEngine {
    /// Create an idle engine. A first target is drawn so there is always one to show.
    pub fn new(config: GameConfig, store: Box<dyn HighScoreStore>) -> Self {
        let mut selector = TargetSelector::from_config(&config);
        let target = selector.next(None);
        Self {
            remaining_secs: config.round_secs,
            config,
            selector,
            store,
            target,
            score: 0,
            phase: Phase::Idle,
            round: 0,
        }
    }

    /// Begin a round from IDLE or ENDED. Returns None while a round is running.
    pub fn start(&mut self) -> Option<RoundSnapshot> {
        if !self.phase.can_start() {
            debug!("start ignored: round {} already running", self.round);
            return None;
        }

        self.round += 1;
        self.score = 0;
        self.remaining_secs = self.config.round_secs;
        self.target = self.selector.next(Some(self.target));
        self.phase = Phase::Running;

        info!(
            "{} round={} target={} secs={}",
            ReasonCode::G201_ROUND_STARTED.code(),
            self.round,
            self.target,
            self.remaining_secs
        );
        Some(self.snapshot())
    }

    /// Start again after a round has ended
    pub fn restart(&mut self) -> Option<RoundSnapshot> {
        self.start()
    }

    /// One second of countdown
    pub fn on_tick(&mut self) -> TickOutcome {
        if self.phase != Phase::Running {
            return TickOutcome::Ignored;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            return TickOutcome::Ended(self.finish(ReasonCode::G203_TIME_UP));
        }

        TickOutcome::Counting(self.snapshot())
    }

    /// End a running round early. Reports exactly like countdown expiry.
    pub fn stop(&mut self) -> Option<RoundReport> {
        if self.phase != Phase::Running {
            return None;
        }
        Some(self.finish(ReasonCode::G204_STOPPED))
    }

    /// Judge one classifier result against the current target
    pub fn on_classification(&mut self, event: &ClassificationEvent) -> ClassificationOutcome {
        let observation = event.observation();
        let observed = observation.gesture();

        let reason = if self.phase != Phase::Running {
            ReasonCode::G105_NOT_RUNNING
        } else {
            match observation {
                Observation::Unrecognized(ref label) => {
                    debug!("unrecognized label {:?}", label);
                    ReasonCode::G104_UNRECOGNIZED
                }
                ref obs if !obs.defeats(self.target) => ReasonCode::G103_WRONG_GESTURE,
                _ if !event.is_confident(self.config.confidence_threshold) => {
                    ReasonCode::G102_LOW_CONFIDENCE
                }
                _ => {
                    self.score += 1;
                    let previous = self.target;
                    self.target = self.selector.next(Some(previous));
                    debug!(
                        "{} score={} beat={} next={} confidence={:.2}",
                        ReasonCode::G101_SCORED.code(),
                        self.score,
                        previous,
                        self.target,
                        event.confidence
                    );
                    ReasonCode::G101_SCORED
                }
            }
        };

        ClassificationOutcome {
            reason,
            observed,
            snapshot: self.snapshot(),
        }
    }

    fn finish(&mut self, reason: ReasonCode) -> RoundReport {
        self.phase = Phase::Ended;

        let prior = self.store.get().unwrap_or_else(|e| {
            warn!("reading high score failed, assuming 0: {}", e);
            0
        });
        let report = RoundReport::new(self.round, self.score, prior, reason);

        if let Err(e) = self.store.set(report.high_score) {
            warn!("persisting high score {} failed: {}", report.high_score, e);
        }

        info!(
            "{} round={} score={} highscore={}",
            reason.code(),
            report.round,
            report.final_score,
            report.high_score
        );
        report
    }

    /// Current observable state
    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot::new(
            self.target,
            self.score,
            self.remaining_secs,
            self.phase,
            self.round,
        )
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn target(&self) -> Gesture {
        self.target
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Persisted high score, 0 if unreadable
    pub fn high_score(&self) -> u32 {
        self.store.get().unwrap_or(0)
    }
}

// =============================================================================
// TESTS
// =============================================================================
