//! Target selection with the no-immediate-repeat rule

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::types::{GameConfig, Gesture};

/// Upper bound on rejection draws before falling back.
/// Each draw repeats with probability 1/3, so reaching the bound is (1/3)^32.
pub const MAX_DRAWS: usize = 32;

/// Draws targets uniformly, never the same twice in a row
#[derive(Debug)]
pub struct TargetSelector {
    rng: StdRng,
    /// Last issued target
    last: Option<Gesture>,
}

impl Default for TargetSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetSelector {
    /// Create selector seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            last: None,
        }
    }

    /// Create deterministic selector
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            last: None,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        match config.seed {
            Some(seed) => Self::with_seed(seed),
            None => Self::new(),
        }
    }

    /// Draw a gesture different from `previous`.
    ///
    /// `None` accepts any gesture (first target of a session).
    pub fn next(&mut self, previous: Option<Gesture>) -> Gesture {
        let drawn = (0..MAX_DRAWS)
            .map(|_| Gesture::ALL[self.rng.gen_range(0..Gesture::ALL.len())])
            .find(|g| Some(*g) != previous);

        let gesture = match (drawn, previous) {
            (Some(g), _) => g,
            (None, Some(prev)) => prev.counter(),
            (None, None) => Gesture::ALL[0],
        };

        self.last = Some(gesture);
        gesture
    }

    /// Draw the successor of the last issued target
    pub fn advance(&mut self) -> Gesture {
        self.next(self.last)
    }

    pub fn last(&self) -> Option<Gesture> {
        self.last
    }
}

// =============================================================================
// TESTS
// =============================================================================
