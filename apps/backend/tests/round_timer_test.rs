//! Round timer behaviour observable through events.

mod support;

use std::time::Duration;

use backend::domain::{Phase, TimerState};
use backend::events::GameEvent;
use serial_test::serial;
use support::{build_service, create_game_with_players, drain};

#[tokio::test]
#[serial]
async fn expiry_pauses_the_game_for_hostage_selection() {
    let service = build_service();
    let game = create_game_with_players(&service, 6).await;
    game.lock_and_confirm().await;
    game.set_round_durations(vec![Duration::from_millis(150); 3])
        .await;
    game.start().await;

    let mut mailbox = game.observe(game.host).await;
    drain(&mut mailbox);

    game.elect_first_leaders().await;
    game.wait_for_hostage_phase().await;

    let view = game.view().await;
    assert!(view.paused);
    assert_eq!(view.pause_reason.as_deref(), Some("hostage selection phase"));
    assert_eq!(view.timer.state, TimerState::Stopped);
    assert_eq!(view.phase, Phase::Round { round: 1 });

    let events = drain(&mut mailbox);
    let paused = events
        .iter()
        .find_map(|record| match &record.event {
            GameEvent::GamePaused { reason } => Some(reason.clone()),
            _ => None,
        })
        .expect("GAME_PAUSED published");
    assert_eq!(paused, "hostage selection phase");

    // The igniting election announced the resume on the public scope.
    assert!(events.iter().any(|record| matches!(
        &record.event,
        GameEvent::GameResumed { reason } if reason == "both leaders elected"
    )));
}

#[tokio::test]
#[serial]
async fn timer_updates_tick_down_while_running() {
    let service = build_service();
    let game = create_game_with_players(&service, 6).await;
    game.lock_and_confirm().await;
    game.set_round_durations(vec![Duration::from_secs(3); 3]).await;
    game.start().await;

    let mut mailbox = game.observe(game.host).await;
    drain(&mut mailbox);

    game.elect_first_leaders().await;
    tokio::time::sleep(Duration::from_millis(2200)).await;

    let updates: Vec<u64> = drain(&mut mailbox)
        .into_iter()
        .filter_map(|record| match record.event {
            GameEvent::TimerUpdate { timer } => Some(timer.remaining_secs),
            _ => None,
        })
        .collect();

    assert!(
        updates.len() >= 2,
        "expected roughly one update per second, got {updates:?}"
    );
    assert!(
        updates.windows(2).all(|w| w[1] <= w[0]),
        "remaining must not increase while running: {updates:?}"
    );
}
