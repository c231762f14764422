//! End-to-end happy path: six players, three rounds, two hostage swaps
//! per round boundary, resolution.

mod support;

use std::time::Duration;

use backend::domain::{Phase, RoomId, TimerState};
use backend::events::GameEvent;
use support::{create_game_with_players, build_service};

const CODE_ALPHABET: &str = "ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

#[tokio::test]
async fn six_player_three_round_game_runs_to_finish() {
    let service = build_service();
    let game = create_game_with_players(&service, 6).await;

    assert_eq!(game.code.len(), 6);
    assert!(game.code.chars().all(|c| CODE_ALPHABET.contains(c)));

    game.lock_and_confirm().await;
    assert_eq!(game.view().await.phase, Phase::RoomAssignment);

    // Six players split three and three.
    let room_a = game.room_members(RoomId::A).await;
    let room_b = game.room_members(RoomId::B).await;
    assert_eq!(room_a.len(), 3);
    assert_eq!(room_b.len(), 3);

    game.set_round_durations(vec![Duration::from_millis(150); 3])
        .await;
    game.start().await;

    // Round 1 waits for leaders: timer armed but frozen at full duration.
    let view = game.view().await;
    assert_eq!(view.phase, Phase::Round { round: 1 });
    assert_eq!(view.timer.state, TimerState::Paused);
    assert!(view.leader_a.is_none() && view.leader_b.is_none());

    game.elect_first_leaders().await;
    let view = game.view().await;
    assert_eq!(view.timer.state, TimerState::Running);
    assert!(view.leader_a.is_some() && view.leader_b.is_some());

    for _ in 0..3 {
        game.run_hostage_exchange().await;

        // Rooms stay balanced after every exchange.
        let a = game.room_members(RoomId::A).await.len();
        let b = game.room_members(RoomId::B).await.len();
        assert!(a.abs_diff(b) <= 1, "rooms unbalanced: {a} vs {b}");
    }

    let view = game
        .wait_until(Duration::from_secs(5), |view| view.phase == Phase::Finished)
        .await;
    assert_eq!(view.phase, Phase::Finished);

    let journal = game.journal().await;
    assert!(journal
        .iter()
        .any(|record| matches!(record.event, GameEvent::GameFinished { .. })));

    // At resolution everyone still has a room and a role.
    {
        let handle = service.state().store.require(game.game_id).unwrap();
        let locked = handle.lock().await;
        for player in locked.players.values() {
            assert!(player.current_room.is_some());
            assert!(player.current_role.is_some());
        }
        locked.check_room_partition().expect("rooms stay partitioned");
    }

    // Three ROUND_STARTED and three ROUND_ENDED events.
    let starts = journal
        .iter()
        .filter(|record| matches!(record.event, GameEvent::RoundStarted { .. }))
        .count();
    let ends = journal
        .iter()
        .filter(|record| matches!(record.event, GameEvent::RoundEnded { .. }))
        .count();
    assert_eq!(starts, 3);
    assert_eq!(ends, 3);
}

#[tokio::test]
async fn rounds_after_the_first_start_their_timer_immediately() {
    let service = build_service();
    let game = create_game_with_players(&service, 6).await;
    game.lock_and_confirm().await;
    game.set_round_durations(vec![
        Duration::from_millis(150),
        Duration::from_secs(30),
        Duration::from_secs(30),
    ])
    .await;
    game.start().await;
    game.elect_first_leaders().await;

    game.run_hostage_exchange().await;

    let view = game.view().await;
    assert_eq!(view.phase, Phase::Round { round: 2 });
    assert_eq!(view.timer.state, TimerState::Running);
    // Leaders carry over between rounds.
    assert!(view.leader_a.is_some() && view.leader_b.is_some());
}
