//! Integration tests for the async controller
//!
//! Timer behaviour runs on tokio's paused clock: sleeps auto-advance time.

use std::time::Duration;

use handsign::core::{GameController, GameHandle, MemoryStore, RoundEngine};
use handsign::types::{ClassificationEvent, GameConfig, GameUpdate, Gesture, Phase, RoundReport};
use pretty_assertions::assert_eq;
use tokio::sync::broadcast;

fn label_beating(target: Gesture) -> &'static str {
    match target.counter() {
        Gesture::Rock => "FistHand",
        Gesture::Paper => "FiveHand",
        Gesture::Scissors => "VictoryHand",
    }
}

fn spawn(store: MemoryStore) -> GameHandle {
    let engine = RoundEngine::new(GameConfig::default().with_seed(31), Box::new(store));
    GameController::spawn(engine)
}

/// Drain updates until the round report arrives, returning every remaining_secs seen
async fn collect_until_end(rx: &mut broadcast::Receiver<GameUpdate>) -> (Vec<u32>, RoundReport) {
    let mut remaining = Vec::new();
    loop {
        match rx.recv().await.expect("controller alive") {
            GameUpdate::State(s) => remaining.push(s.remaining_secs),
            GameUpdate::Ended(report) => return (remaining, report),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_full_round_ends_once() {
    let handle = spawn(MemoryStore::new());
    let mut rx = handle.subscribe();
    handle.start().unwrap();

    let (remaining, report) = collect_until_end(&mut rx).await;
    assert_eq!(report.final_score, 0);
    assert_eq!(remaining.first(), Some(&30));
    assert_eq!(remaining.last(), Some(&0));
    assert!(remaining.windows(2).all(|w| w[1] < w[0]));

    // No ticks after the round ended
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Empty)));

    let snap = handle.snapshot();
    assert_eq!(snap.phase, Phase::Ended);
    assert_eq!(snap.remaining_secs, 0);
}

#[tokio::test(start_paused = true)]
async fn test_round_lasts_thirty_seconds() {
    let handle = spawn(MemoryStore::new());
    let mut rx = handle.subscribe();
    let started = tokio::time::Instant::now();
    handle.start().unwrap();

    collect_until_end(&mut rx).await;
    assert_eq!(started.elapsed(), Duration::from_secs(30));
}

#[tokio::test(start_paused = true)]
async fn test_scoring_through_handle() {
    let store = MemoryStore::with_value(1);
    let handle = spawn(store.clone());
    let mut rx = handle.subscribe();
    handle.start().unwrap();
    rx.recv().await.unwrap();

    for expected in 1..=3u32 {
        let target = handle.snapshot().target;
        handle
            .classify(ClassificationEvent::new(label_beating(target), 0.9))
            .unwrap();
        loop {
            if let GameUpdate::State(s) = rx.recv().await.unwrap() {
                if s.score == expected {
                    assert_ne!(s.target, target);
                    break;
                }
            }
        }
    }

    let (_, report) = collect_until_end(&mut rx).await;
    assert_eq!(report.final_score, 3);
    assert_eq!(report.high_score, 3);
    assert_eq!(store.value(), 3);
    assert_eq!(handle.high_score(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_low_confidence_publishes_nothing() {
    let handle = spawn(MemoryStore::new());
    handle.start().unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    let before = handle.snapshot();

    handle
        .classify(ClassificationEvent::new(label_beating(before.target), 0.5))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let after = handle.snapshot();
    assert_eq!(after.score, 0);
    assert_eq!(after.target, before.target);
}

#[tokio::test(start_paused = true)]
async fn test_stale_classification_after_end() {
    let handle = spawn(MemoryStore::new());
    let mut rx = handle.subscribe();
    handle.start().unwrap();
    collect_until_end(&mut rx).await;

    let ended = handle.snapshot();
    handle
        .classify(ClassificationEvent::new(label_beating(ended.target), 1.0))
        .unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert!(handle.snapshot().same_state(&ended));
    assert!(matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Empty)));
}

#[tokio::test(start_paused = true)]
async fn test_stop_then_restart() {
    let handle = spawn(MemoryStore::new());
    let mut rx = handle.subscribe();
    handle.start().unwrap();
    tokio::time::sleep(Duration::from_millis(5500)).await;

    handle.stop().unwrap();
    let (_, report) = collect_until_end(&mut rx).await;
    assert_eq!(report.round, 1);

    let stopped = handle.snapshot();
    assert_eq!(stopped.phase, Phase::Ended);
    assert_eq!(stopped.remaining_secs, 25);

    // Clock stays frozen while ended
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(handle.snapshot().remaining_secs, 25);

    handle.restart().unwrap();
    match rx.recv().await.unwrap() {
        GameUpdate::State(s) => {
            assert_eq!((s.phase, s.score, s.remaining_secs, s.round), (Phase::Running, 0, 30, 2));
        }
        other => panic!("expected state, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_start_while_running_keeps_clock() {
    let handle = spawn(MemoryStore::new());
    handle.start().unwrap();
    tokio::time::sleep(Duration::from_millis(2500)).await;
    handle.start().unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let snap = handle.snapshot();
    assert_eq!(snap.round, 1);
    assert_eq!(snap.remaining_secs, 28);
}
