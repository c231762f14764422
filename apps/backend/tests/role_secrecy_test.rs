//! Information hiding: the role→player mapping never leaves player scope,
//! not even for the host.

mod support;

use std::time::Duration;

use backend::domain::ids::RoomId;
use backend::events::{GameEvent, Scope};
use support::{build_service, create_game_with_players, distinct_deck, drain, standard_deck};

#[tokio::test]
async fn the_host_receives_only_their_own_role() {
    let service = build_service();
    let game = create_game_with_players(&service, 7).await;
    let mut host_mailbox = game.observe(game.host).await;

    // bury_card: seven players, eight roles.
    service.lock_room(game.game_id, game.host).await.unwrap();
    service
        .set_bury_card(game.game_id, game.host, true)
        .await
        .unwrap();
    service
        .select_roles(game.game_id, game.host, standard_deck(8))
        .await
        .unwrap();
    service
        .confirm_roles(game.game_id, game.host)
        .await
        .unwrap();

    let role_events: Vec<_> = drain(&mut host_mailbox)
        .into_iter()
        .filter(|record| matches!(record.event, GameEvent::RoleAssigned { .. }))
        .collect();
    assert_eq!(
        role_events.len(),
        1,
        "the host sees exactly one ROLE_ASSIGNED: their own"
    );
    assert_eq!(role_events[0].scope, Scope::player(game.host));
}

#[tokio::test]
async fn role_assigned_events_are_player_scoped_one_each() {
    let service = build_service();
    let game = create_game_with_players(&service, 6).await;
    game.lock_and_confirm().await;

    let journal = game.journal().await;
    let mut scopes = Vec::new();
    for record in &journal {
        if matches!(record.event, GameEvent::RoleAssigned { .. }) {
            scopes.push(record.scope);
        }
    }
    assert_eq!(scopes.len(), 6);
    for player in &game.players {
        assert!(scopes.contains(&Scope::player(*player)));
    }
}

#[tokio::test]
async fn no_public_or_room_event_carries_a_character_id() {
    let service = build_service();
    let game = create_game_with_players(&service, 6).await;
    game.lock_and_confirm().await;
    game.set_round_durations(vec![Duration::from_millis(150); 3])
        .await;
    game.start().await;
    game.elect_first_leaders().await;
    game.run_hostage_exchange().await;

    // Collect the dealt character ids from private state.
    let handle = service.state().store.require(game.game_id).unwrap();
    let assigned: Vec<String> = {
        let locked = handle.lock().await;
        locked
            .state
            .private
            .role_assignments
            .values()
            .map(|id| id.as_str().to_string())
            .collect()
    };
    assert_eq!(assigned.len(), 6);

    for record in game.journal().await {
        if matches!(record.scope, Scope::Player { .. }) {
            continue;
        }
        let json = serde_json::to_string(&record).expect("record serializes");
        for character in &assigned {
            // "president"/"bomber" style ids must never appear in any
            // public- or room-scoped payload.
            assert!(
                !json.contains(&format!("\"{character}\"")),
                "character id {character} leaked in {json}"
            );
        }
    }
}

#[tokio::test]
async fn buried_card_is_set_and_never_published() {
    let service = build_service();
    let game = create_game_with_players(&service, 7).await;
    service.lock_room(game.game_id, game.host).await.unwrap();
    service
        .set_bury_card(game.game_id, game.host, true)
        .await
        .unwrap();
    service
        .select_roles(game.game_id, game.host, distinct_deck(8))
        .await
        .unwrap();
    service
        .confirm_roles(game.game_id, game.host)
        .await
        .unwrap();

    let handle = service.state().store.require(game.game_id).unwrap();
    let buried = {
        let locked = handle.lock().await;
        locked
            .state
            .private
            .buried_card
            .clone()
            .expect("one card buried")
    };

    // The buried identity must not appear in ANY event, player-scoped
    // included: nobody holds that card.
    for record in game.journal().await {
        let json = serde_json::to_string(&record).unwrap();
        assert!(
            !json.contains(&format!("\"{}\"", buried.as_str())),
            "buried card leaked in {json}"
        );
    }
}

#[tokio::test]
async fn room_scoped_events_stay_inside_the_room() {
    let service = build_service();
    let game = create_game_with_players(&service, 6).await;
    game.lock_and_confirm().await;
    game.set_round_durations(vec![Duration::from_secs(30); 3])
        .await;
    game.start().await;

    let room_a = game.room_members(RoomId::A).await;
    let room_b = game.room_members(RoomId::B).await;
    let mut a_mailbox = game.observe(room_a[0]).await;
    let mut b_mailbox = game.observe(room_b[0]).await;
    drain(&mut a_mailbox);
    drain(&mut b_mailbox);

    // A room-A vote is visible to room A only.
    game.service
        .nominate_leader(game.game_id, room_a[0], RoomId::A, room_a[1])
        .await
        .unwrap();

    let a_events = drain(&mut a_mailbox);
    let b_events = drain(&mut b_mailbox);
    assert!(a_events
        .iter()
        .any(|record| matches!(record.event, GameEvent::VoteCast { .. })));
    assert!(!b_events
        .iter()
        .any(|record| matches!(record.event, GameEvent::VoteCast { .. })));
}
