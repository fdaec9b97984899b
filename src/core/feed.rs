//! Classifier feed: turns text lines into classification events
//!
//! Accepted forms:
//! - `FistHand 0.93`, `FistHand:0.93`, `FistHand=0.93`
//! - `{"label": "FistHand", "confidence": 0.93}`

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use crate::types::ClassificationEvent;

lazy_static! {
    static ref RE_FEED_LINE: Regex = Regex::new(
        r"^\s*([A-Za-z][A-Za-z0-9_-]*)\s*[\s:=,]\s*([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)\s*$"
    ).unwrap();
}

#[derive(Debug, Error, PartialEq)]
pub enum FeedError {
    #[error("empty feed line")]
    Empty,
    #[error("cannot parse feed line {0:?}")]
    Malformed(String),
    #[error("confidence {0} outside [0, 1]")]
    ConfidenceOutOfRange(f64),
}

/// Parse one feed line into an event
pub fn parse_feed_line(line: &str) -> Result<ClassificationEvent, FeedError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(FeedError::Empty);
    }

    let event = if line.starts_with('{') {
        serde_json::from_str::<ClassificationEvent>(line)
            .map_err(|_| FeedError::Malformed(line.to_string()))?
    } else {
        let caps = RE_FEED_LINE
            .captures(line)
            .ok_or_else(|| FeedError::Malformed(line.to_string()))?;
        let confidence = caps[2]
            .parse::<f64>()
            .map_err(|_| FeedError::Malformed(line.to_string()))?;
        ClassificationEvent::new(&caps[1], confidence)
    };

    validate_confidence(event.confidence)?;
    Ok(event)
}

/// Confidence must be a finite value in [0, 1]
pub fn validate_confidence(confidence: f64) -> Result<(), FeedError> {
    if confidence.is_finite() && (0.0..=1.0).contains(&confidence) {
        Ok(())
    } else {
        Err(FeedError::ConfidenceOutOfRange(confidence))
    }
}

// =============================================================================
// TESTS
// =============================================================================
