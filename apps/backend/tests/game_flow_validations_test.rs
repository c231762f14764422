//! Integration tests for command validation and denial codes.

mod support;

use backend::domain::ids::RoomId;
use backend::domain::CharacterId;
use backend::errors::ErrorCode;
use support::{build_service, create_game_with_players, standard_deck};

#[tokio::test]
async fn lock_with_five_players_is_denied() {
    let service = build_service();
    let game = create_game_with_players(&service, 5).await;

    let err = service
        .lock_room(game.game_id, game.host)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InsufficientPlayers);
    assert!(err.suggestion().is_some(), "denial should carry a suggestion");
}

#[tokio::test]
async fn thirty_first_player_cannot_join() {
    let service = build_service();
    let game = create_game_with_players(&service, 30).await;

    let err = service
        .join_game(&game.code, "late".to_string())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::TooManyPlayers);
}

#[tokio::test]
async fn only_the_host_may_lock() {
    let service = build_service();
    let game = create_game_with_players(&service, 6).await;

    let not_host = game.players[1];
    let err = service.lock_room(game.game_id, not_host).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotHost);
}

#[tokio::test]
async fn duplicate_names_are_rejected() {
    let service = build_service();
    let game = create_game_with_players(&service, 6).await;

    let err = service
        .join_game(&game.code, "P1".to_string())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NameTaken);
}

#[tokio::test]
async fn join_is_case_insensitive_on_the_code() {
    let service = build_service();
    let game = create_game_with_players(&service, 6).await;

    let outcome = service
        .join_game(&game.code.to_ascii_lowercase(), "late".to_string())
        .await;
    assert!(outcome.is_ok());
}

#[tokio::test]
async fn set_rounds_accepts_only_three_or_five() {
    let service = build_service();
    let game = create_game_with_players(&service, 6).await;
    service.lock_room(game.game_id, game.host).await.unwrap();

    let err = service
        .set_rounds(game.game_id, game.host, 4)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidRounds);

    service.set_rounds(game.game_id, game.host, 5).await.unwrap();
    let handle = service.state().store.require(game.game_id).unwrap();
    let locked = handle.lock().await;
    assert_eq!(locked.config.total_rounds, 5);
    // Durations re-derive to match the new count.
    assert_eq!(locked.config.round_durations.len(), 5);
}

#[tokio::test]
async fn confirm_without_primaries_is_denied() {
    let service = build_service();
    let game = create_game_with_players(&service, 6).await;
    service.lock_room(game.game_id, game.host).await.unwrap();

    let deck: Vec<CharacterId> = vec![
        "blue_team".into(),
        "red_team".into(),
        "blue_team".into(),
        "red_team".into(),
        "blue_team".into(),
        "red_team".into(),
    ];
    service
        .select_roles(game.game_id, game.host, deck)
        .await
        .unwrap();
    let err = service
        .confirm_roles(game.game_id, game.host)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::MissingPrimary);
}

#[tokio::test]
async fn confirm_with_wrong_deck_size_is_denied() {
    let service = build_service();
    let game = create_game_with_players(&service, 6).await;
    service.lock_room(game.game_id, game.host).await.unwrap();

    service
        .select_roles(game.game_id, game.host, standard_deck(5))
        .await
        .unwrap();
    let err = service
        .confirm_roles(game.game_id, game.host)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::RoleCountMismatch);
}

#[tokio::test]
async fn team_imbalance_warns_but_confirms() {
    let service = build_service();
    let game = create_game_with_players(&service, 6).await;
    service.lock_room(game.game_id, game.host).await.unwrap();

    let deck: Vec<CharacterId> = vec![
        "president".into(),
        "bomber".into(),
        "blue_team".into(),
        "blue_team".into(),
        "blue_team".into(),
        "blue_team".into(),
    ];
    service
        .select_roles(game.game_id, game.host, deck)
        .await
        .unwrap();
    let outcome = service.confirm_roles(game.game_id, game.host).await.unwrap();
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].code, ErrorCode::TeamImbalance);
}

#[tokio::test]
async fn unlock_reopens_the_lobby_before_roles_exist() {
    let service = build_service();
    let game = create_game_with_players(&service, 6).await;
    service.lock_room(game.game_id, game.host).await.unwrap();
    service.unlock_room(game.game_id, game.host).await.unwrap();

    // The reopened lobby accepts another player.
    assert!(service.join_game(&game.code, "late".to_string()).await.is_ok());
}

#[tokio::test]
async fn hostage_selection_is_closed_while_the_clock_runs() {
    let service = build_service();
    let game = create_game_with_players(&service, 6).await;
    game.lock_and_confirm().await;
    game.set_round_durations(vec![std::time::Duration::from_secs(30); 3])
        .await;
    game.start().await;
    game.elect_first_leaders().await;

    let leader = game.leader_of(RoomId::A).await.unwrap();
    let target = game
        .room_members(RoomId::A)
        .await
        .into_iter()
        .find(|id| *id != leader)
        .unwrap();

    let err = service
        .select_hostage(game.game_id, leader, RoomId::A, target)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidState);
}

#[tokio::test]
async fn commands_against_unknown_games_fail_cleanly() {
    let service = build_service();
    let err = service
        .join_game("ZZZZZZ", "alice".to_string())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::GameNotFound);
}
