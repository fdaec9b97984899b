//! Gesture vocabulary and classifier label mapping

use serde::{Deserialize, Serialize};

/// The three hand signs of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gesture {
    Rock,
    Paper,
    Scissors,
}

impl Gesture {
    /// Every gesture, in draw order
    pub const ALL: [Gesture; 3] = [Gesture::Rock, Gesture::Paper, Gesture::Scissors];

    /// The gesture this one defeats
    pub fn beats(self) -> Gesture {
        match self {
            Gesture::Rock => Gesture::Scissors,
            Gesture::Paper => Gesture::Rock,
            Gesture::Scissors => Gesture::Paper,
        }
    }

    /// The gesture that defeats this one
    pub fn counter(self) -> Gesture {
        match self {
            Gesture::Rock => Gesture::Paper,
            Gesture::Paper => Gesture::Scissors,
            Gesture::Scissors => Gesture::Rock,
        }
    }

    /// Target label shown to the player
    pub fn display_name(&self) -> &'static str {
        match self {
            Gesture::Rock => "Pedra",
            Gesture::Paper => "Papel",
            Gesture::Scissors => "Tesoura",
        }
    }

    /// Get emoji for gesture
    pub fn emoji(&self) -> &'static str {
        match self {
            Gesture::Rock => "✊",
            Gesture::Paper => "✋",
            Gesture::Scissors => "✌",
        }
    }
}

impl std::fmt::Display for Gesture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Gesture::Rock => "ROCK",
            Gesture::Paper => "PAPER",
            Gesture::Scissors => "SCISSORS",
        };
        write!(f, "{}", name)
    }
}

/// What a classifier label says the player is showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    Recognized(Gesture),
    /// Label outside the known vocabulary, kept for logging
    Unrecognized(String),
}

impl Observation {
    /// Map a raw classifier label onto the gesture vocabulary
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim();
        let gesture = match trimmed {
            "FistHand" => Some(Gesture::Rock),
            "FiveHand" => Some(Gesture::Paper),
            "VictoryHand" => Some(Gesture::Scissors),
            other if other.eq_ignore_ascii_case("rock") => Some(Gesture::Rock),
            other if other.eq_ignore_ascii_case("paper") => Some(Gesture::Paper),
            other if other.eq_ignore_ascii_case("scissors") => Some(Gesture::Scissors),
            _ => None,
        };

        match gesture {
            Some(g) => Observation::Recognized(g),
            None => Observation::Unrecognized(trimmed.to_string()),
        }
    }

    /// Recognized gesture, if any
    pub fn gesture(&self) -> Option<Gesture> {
        match self {
            Observation::Recognized(g) => Some(*g),
            Observation::Unrecognized(_) => None,
        }
    }

    /// True when the shown gesture defeats `target`
    pub fn defeats(&self, target: Gesture) -> bool {
        self.gesture() == Some(target.counter())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win_relation() {
        assert_eq!(Gesture::Rock.beats(), Gesture::Scissors);
        assert_eq!(Gesture::Paper.beats(), Gesture::Rock);
        assert_eq!(Gesture::Scissors.beats(), Gesture::Paper);
    }

    #[test]
    fn test_counter_is_inverse_of_beats() {
        for g in Gesture::ALL {
            assert_eq!(g.counter().beats(), g);
            assert_ne!(g.counter(), g);
        }
    }

    #[test]
    fn test_classifier_labels() {
        assert_eq!(Observation::from_label("FistHand"), Observation::Recognized(Gesture::Rock));
        assert_eq!(Observation::from_label("FiveHand"), Observation::Recognized(Gesture::Paper));
        assert_eq!(
            Observation::from_label(" VictoryHand "),
            Observation::Recognized(Gesture::Scissors)
        );
    }

    #[test]
    fn test_canonical_names_case_insensitive() {
        assert_eq!(Observation::from_label("ROCK").gesture(), Some(Gesture::Rock));
        assert_eq!(Observation::from_label("Scissors").gesture(), Some(Gesture::Scissors));
    }

    #[test]
    fn test_unknown_label_is_unrecognized() {
        let obs = Observation::from_label("ThumbsUp");
        assert_eq!(obs, Observation::Unrecognized("ThumbsUp".to_string()));
        for g in Gesture::ALL {
            assert!(!obs.defeats(g));
        }
    }

    #[test]
    fn test_defeats_requires_counter() {
        // Paper (FiveHand) defeats a Rock target, nothing else
        let paper = Observation::from_label("FiveHand");
        assert!(paper.defeats(Gesture::Rock));
        assert!(!paper.defeats(Gesture::Paper));
        assert!(!paper.defeats(Gesture::Scissors));
    }
}
