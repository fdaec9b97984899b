//! Classifier output as it enters the game

use serde::{Deserialize, Serialize};
use crate::types::Observation;

/// One classifier result: raw label plus confidence in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationEvent {
    /// Label from the classifier's own vocabulary
    pub label: String,
    pub confidence: f64,
}

impl ClassificationEvent {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }

    /// Map the raw label onto the gesture vocabulary
    pub fn observation(&self) -> Observation {
        Observation::from_label(&self.label)
    }

    /// NaN never clears the gate
    pub fn is_confident(&self, threshold: f64) -> bool {
        self.confidence >= threshold
    }
}
