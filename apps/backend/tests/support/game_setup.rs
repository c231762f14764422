//! Builders that drive games through the controller, the same way a
//! transport would.

use std::sync::Arc;
use std::time::{Duration, Instant};

use backend::config::Settings;
use backend::domain::ids::{GameId, PlayerId, RoomId};
use backend::domain::rules::hostage_count;
use backend::domain::{Phase, PublicGameView};
use backend::protocol::CommandResponse;
use backend::services::GameFlowService;
use backend::state::AppState;

use super::catalog::{standard_catalog, standard_deck};

/// Settings that keep test suites fast: 10 ms ticks, 50 ms parlays.
pub fn fast_settings() -> Settings {
    Settings {
        retention: Duration::from_secs(3600),
        reap_interval: Duration::from_millis(100),
        tick_interval: Duration::from_millis(10),
        parlay_duration: Duration::from_millis(50),
    }
}

pub fn build_service() -> GameFlowService {
    super::init();
    GameFlowService::new(Arc::new(AppState::with_settings(
        standard_catalog(),
        fast_settings(),
    )))
}

/// One game plus the ids needed to drive it.
pub struct TestGame {
    pub service: GameFlowService,
    pub game_id: GameId,
    pub code: String,
    pub host: PlayerId,
    /// Host first, then every joined player.
    pub players: Vec<PlayerId>,
}

/// Create a lobby with `count` players (host included).
pub async fn create_game_with_players(service: &GameFlowService, count: usize) -> TestGame {
    let outcome = service
        .create_game(backend_test_support::unique_helpers::unique_name("host"))
        .await
        .expect("create game");
    let Some(CommandResponse::GameCreated {
        game_id,
        player_id: host,
        code,
    }) = outcome.response
    else {
        panic!("create_game returned no payload");
    };

    let mut players = vec![host];
    for i in 1..count {
        let outcome = service
            .join_game(&code, format!("p{i}"))
            .await
            .expect("join game");
        let Some(CommandResponse::Joined { player_id, .. }) = outcome.response else {
            panic!("join_game returned no payload");
        };
        players.push(player_id);
    }

    TestGame {
        service: service.clone(),
        game_id,
        code,
        host,
        players,
    }
}

impl TestGame {
    /// Lock the room, select a standard deck, and confirm roles.
    pub async fn lock_and_confirm(&self) {
        self.service
            .lock_room(self.game_id, self.host)
            .await
            .expect("lock room");
        self.service
            .select_roles(self.game_id, self.host, standard_deck(self.players.len()))
            .await
            .expect("select roles");
        self.service
            .confirm_roles(self.game_id, self.host)
            .await
            .expect("confirm roles");
    }

    /// Override per-round durations before the game starts.
    pub async fn set_round_durations(&self, durations: Vec<Duration>) {
        let handle = self
            .service
            .state()
            .store
            .require(self.game_id)
            .expect("game in store");
        let mut game = handle.lock().await;
        game.config.total_rounds = durations.len() as u8;
        game.config.round_durations = durations;
    }

    pub async fn start(&self) {
        self.service
            .start_game(self.game_id, self.host)
            .await
            .expect("start game");
    }

    pub async fn view(&self) -> PublicGameView {
        let handle = self
            .service
            .state()
            .store
            .require(self.game_id)
            .expect("game in store");
        let game = handle.lock().await;
        game.public_view(Instant::now())
    }

    pub async fn room_members(&self, room: RoomId) -> Vec<PlayerId> {
        let handle = self
            .service
            .state()
            .store
            .require(self.game_id)
            .expect("game in store");
        let game = handle.lock().await;
        game.state.rooms.get(room).members.clone()
    }

    pub async fn leader_of(&self, room: RoomId) -> Option<PlayerId> {
        let handle = self
            .service
            .state()
            .store
            .require(self.game_id)
            .expect("game in store");
        let game = handle.lock().await;
        game.state.rooms.get(room).leader
    }

    /// Every member of each room votes for its first member: unanimous
    /// first-poll elections in both rooms.
    pub async fn elect_first_leaders(&self) {
        for room in [RoomId::A, RoomId::B] {
            let members = self.room_members(room).await;
            let candidate = members[0];
            for voter in &members {
                self.service
                    .nominate_leader(self.game_id, *voter, room, candidate)
                    .await
                    .expect("nominate leader");
            }
            assert_eq!(self.leader_of(room).await, Some(candidate));
        }
    }

    /// Poll the public view until `predicate` holds or `timeout` elapses.
    pub async fn wait_until(
        &self,
        timeout: Duration,
        predicate: impl Fn(&PublicGameView) -> bool,
    ) -> PublicGameView {
        let deadline = Instant::now() + timeout;
        loop {
            let view = self.view().await;
            if predicate(&view) {
                return view;
            }
            assert!(
                Instant::now() < deadline,
                "condition not reached before timeout; last view: {view:?}"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Wait for the round timer to expire into the hostage phase.
    pub async fn wait_for_hostage_phase(&self) {
        self.wait_until(Duration::from_secs(5), |view| view.paused)
            .await;
    }

    /// Drive the current round from hostage selection through exchange:
    /// each leader picks the required count of eligible members and locks.
    pub async fn run_hostage_exchange(&self) {
        self.wait_for_hostage_phase().await;
        let round = self.view().await.current_round;
        let required = hostage_count(self.players.len(), round) as usize;

        for room in [RoomId::A, RoomId::B] {
            let leader = self.leader_of(room).await.expect("room has a leader");
            let members = self.room_members(room).await;
            let hostages: Vec<PlayerId> = members
                .into_iter()
                .filter(|id| *id != leader)
                .take(required)
                .collect();
            assert_eq!(hostages.len(), required, "enough eligible members");

            for hostage in &hostages {
                self.service
                    .select_hostage(self.game_id, leader, room, *hostage)
                    .await
                    .expect("select hostage");
            }
            self.service
                .lock_hostages(self.game_id, leader, room)
                .await
                .expect("lock hostages");
        }

        // Parlay runs, the exchange fires, and the round rolls over.
        self.wait_until(Duration::from_secs(5), |view| {
            !view.parlay_active
                && (view.current_round != round || view.phase == Phase::Finished)
        })
        .await;
    }
}
