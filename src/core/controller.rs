//! Game Controller: single serialized consumer for every round input
//!
//! One tokio task owns the `RoundEngine`. Commands and classifier results
//! arrive over one bounded ingress; countdown ticks come from an interval
//! owned by the same task. Every engine mutation therefore happens inside
//! one `select!` arm, never across an await point.
//!
//! The interval exists only while a round is running and is dropped the
//! moment the round ends, so no tick can reach an ended round.

use std::time::Duration;

use log::{debug, info, warn};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::core::round::{RoundEngine, TickOutcome};
use crate::types::{ClassificationEvent, GameUpdate, ReasonCode, RoundReport, RoundSnapshot};
use crate::{INGRESS_CAPACITY, UPDATE_CHANNEL_CAPACITY};

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("controller ingress is full")]
    Busy,
    #[error("controller has shut down")]
    Closed,
}

impl<T> From<mpsc::error::TrySendError<T>> for ControllerError {
    fn from(err: mpsc::error::TrySendError<T>) -> Self {
        match err {
            mpsc::error::TrySendError::Full(_) => ControllerError::Busy,
            mpsc::error::TrySendError::Closed(_) => ControllerError::Closed,
        }
    }
}

#[derive(Debug)]
enum Command {
    Start,
    Restart,
    Stop,
    Classify(ClassificationEvent),
    Shutdown,
}

/// Cloneable, non-blocking front door to a running controller
#[derive(Debug, Clone)]
pub struct GameHandle {
    tx: mpsc::Sender<Command>,
    state_rx: watch::Receiver<RoundSnapshot>,
    high_rx: watch::Receiver<u32>,
    update_tx: broadcast::Sender<GameUpdate>,
}

impl GameHandle {
    fn send(&self, cmd: Command) -> Result<(), ControllerError> {
        self.tx.try_send(cmd).map_err(ControllerError::from)
    }

    pub fn start(&self) -> Result<(), ControllerError> {
        self.send(Command::Start)
    }

    pub fn restart(&self) -> Result<(), ControllerError> {
        self.send(Command::Restart)
    }

    pub fn stop(&self) -> Result<(), ControllerError> {
        self.send(Command::Stop)
    }

    /// Queue a classifier result. Stale results are judged as no-ops.
    pub fn classify(&self, event: ClassificationEvent) -> Result<(), ControllerError> {
        self.send(Command::Classify(event))
    }

    /// Ask the controller task to exit
    pub fn shutdown(&self) -> Result<(), ControllerError> {
        self.send(Command::Shutdown)
    }

    /// Latest published round state
    pub fn snapshot(&self) -> RoundSnapshot {
        self.state_rx.borrow().clone()
    }

    /// High score as of the last finished round
    pub fn high_score(&self) -> u32 {
        *self.high_rx.borrow()
    }

    /// Live stream of state changes and end-of-round reports
    pub fn subscribe(&self) -> broadcast::Receiver<GameUpdate> {
        self.update_tx.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Owner of the round engine and its countdown
#[derive(Debug)]
pub struct GameController {
    engine: RoundEngine,
    rx: mpsc::Receiver<Command>,
    state_tx: watch::Sender<RoundSnapshot>,
    high_tx: watch::Sender<u32>,
    update_tx: broadcast::Sender<GameUpdate>,
    ticker: Option<Interval>,
    tick_period: Duration,
}

impl GameController {
    /// Spawn the controller on the current tokio runtime
    pub fn spawn(engine: RoundEngine) -> GameHandle {
        let (tx, rx) = mpsc::channel(INGRESS_CAPACITY);
        let (state_tx, state_rx) = watch::channel(engine.snapshot());
        let (high_tx, high_rx) = watch::channel(engine.high_score());
        let (update_tx, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        let tick_period = engine.config().tick_period();

        let controller = Self {
            engine,
            rx,
            state_tx,
            high_tx,
            update_tx: update_tx.clone(),
            ticker: None,
            tick_period,
        };
        tokio::spawn(controller.run());

        GameHandle {
            tx,
            state_rx,
            high_rx,
            update_tx,
        }
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                cmd = self.rx.recv() => match cmd {
                    Some(Command::Shutdown) | None => break,
                    Some(cmd) => self.handle(cmd),
                },
                _ = next_tick(&mut self.ticker) => self.handle_tick(),
            }
        }
        info!("game controller stopped");
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Start | Command::Restart => {
                if let Some(snapshot) = self.engine.start() {
                    self.ticker = Some(new_ticker(self.tick_period));
                    self.publish(snapshot);
                }
            }
            Command::Stop => {
                if let Some(report) = self.engine.stop() {
                    self.finish(report);
                }
            }
            Command::Classify(event) => {
                let outcome = self.engine.on_classification(&event);
                debug!("{:?} -> {}", event.label, outcome.reason.code());
                if outcome.scored() {
                    self.publish(outcome.snapshot);
                }
            }
            Command::Shutdown => {}
        }
    }

    fn handle_tick(&mut self) {
        match self.engine.on_tick() {
            TickOutcome::Counting(snapshot) => {
                debug!("{} remaining={}s", ReasonCode::G202_TICK.code(), snapshot.remaining_secs);
                self.publish(snapshot);
            }
            TickOutcome::Ended(report) => self.finish(report),
            TickOutcome::Ignored => {
                warn!("tick while not running, dropping ticker");
                self.ticker = None;
            }
        }
    }

    fn finish(&mut self, report: RoundReport) {
        self.ticker = None;
        self.publish(self.engine.snapshot());
        self.high_tx.send_replace(report.high_score);
        // No subscribers is fine
        let _ = self.update_tx.send(GameUpdate::Ended(report));
    }

    fn publish(&self, snapshot: RoundSnapshot) {
        self.state_tx.send_replace(snapshot.clone());
        let _ = self.update_tx.send(GameUpdate::State(snapshot));
    }
}

fn new_ticker(period: Duration) -> Interval {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(t) => {
            t.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::MemoryStore;
    use crate::types::{GameConfig, Phase};

    fn spawn_game() -> GameHandle {
        let engine = RoundEngine::new(GameConfig::default().with_seed(11), Box::new(MemoryStore::new()));
        GameController::spawn(engine)
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_starts_idle() {
        let handle = spawn_game();
        assert_eq!(handle.snapshot().phase, Phase::Idle);
        assert_eq!(handle.high_score(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_publishes_running() {
        let handle = spawn_game();
        let mut updates = handle.subscribe();
        handle.start().unwrap();

        match updates.recv().await.unwrap() {
            GameUpdate::State(s) => {
                assert_eq!(s.phase, Phase::Running);
                assert_eq!(s.remaining_secs, 30);
            }
            other => panic!("unexpected update {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_ingress_reports_busy() {
        // current-thread runtime: the controller task has not run yet
        let handle = spawn_game();
        for _ in 0..INGRESS_CAPACITY {
            handle.classify(ClassificationEvent::new("FistHand", 0.9)).unwrap();
        }
        assert_eq!(
            handle.classify(ClassificationEvent::new("FistHand", 0.9)),
            Err(ControllerError::Busy)
        );

        // Draining frees the queue again
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(handle.start(), Ok(()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_closes_ingress() {
        let handle = spawn_game();
        handle.shutdown().unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(handle.is_closed());
        assert_eq!(handle.start(), Err(ControllerError::Closed));
    }
}
