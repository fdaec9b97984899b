//! Core types for Handsign

mod gesture;
mod phase;
mod classification;
mod output;
mod reason;
mod config;

pub use gesture::{Gesture, Observation};
pub use phase::Phase;
pub use classification::ClassificationEvent;
pub use output::{RoundSnapshot, RoundReport, GameUpdate};
pub use reason::ReasonCode;
pub use config::{GameConfig, ConfigError};
