//! Core modules for Handsign

pub mod target;
pub mod round;
pub mod store;
pub mod feed;
pub mod controller;
pub mod api;

pub use target::TargetSelector;
pub use round::{RoundEngine, ClassificationOutcome, TickOutcome};
pub use store::{HighScoreStore, MemoryStore, JsonFileStore, BackgroundFileStore, StoreError};
pub use feed::{parse_feed_line, validate_confidence, FeedError};
pub use controller::{GameController, GameHandle, ControllerError};
pub use api::{create_router, run_server};
