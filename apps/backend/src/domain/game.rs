//! The `Game` aggregate: the single-writer root every command mutates.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::catalog::CharacterCatalog;
use crate::domain::character::{CharacterId, RoleCard};
use crate::domain::ids::{GameId, PlayerId, RoomId};
use crate::domain::phase::Phase;
use crate::domain::player::{Player, PlayerPrivateView, PublicPlayerInfo};
use crate::domain::rules;
use crate::domain::timer::{GameTimer, TimerView};
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::events::bus::GameBus;
use crate::events::types::{EventRecord, GameEvent, Scope};

/// Host-chosen configuration, immutable once a round has started.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// 3 or 5.
    pub total_rounds: u8,
    /// One duration per round; length always equals `total_rounds`.
    pub round_durations: Vec<Duration>,
    pub bury_card: bool,
    /// Character ids chosen for this game, in host selection order.
    pub selected_roles: Vec<CharacterId>,
}

impl Default for GameConfig {
    fn default() -> Self {
        let total_rounds = 3;
        Self {
            total_rounds,
            round_durations: rules::default_round_durations(total_rounds),
            bury_card: false,
            selected_roles: Vec::new(),
        }
    }
}

impl GameConfig {
    /// Duration configured for a 1-based round number.
    pub fn round_duration(&self, round: u8) -> Duration {
        self.round_durations
            .get(round.saturating_sub(1) as usize)
            .copied()
            .unwrap_or(Duration::ZERO)
    }
}

/// Per-room state, reset between rounds.
#[derive(Debug, Clone, Default)]
pub struct RoomState {
    pub members: Vec<PlayerId>,
    pub leader: Option<PlayerId>,
    /// voter id -> candidate id; re-voting overwrites.
    pub leader_votes: HashMap<PlayerId, PlayerId>,
    pub leader_voting_active: bool,
    pub leader_voting_tie_count: u8,
    /// Usurpation votes, counted separately from leader polls.
    pub usurp_votes: HashMap<PlayerId, PlayerId>,
    /// Order-insignificant selection; toggled by the leader.
    pub hostage_candidates: Vec<PlayerId>,
    pub hostages_locked: bool,
    pub parlay_complete: bool,
}

impl RoomState {
    /// Reset everything a new round starts fresh.
    pub fn clear_round_fields(&mut self) {
        self.leader_votes.clear();
        self.leader_voting_active = false;
        self.leader_voting_tie_count = 0;
        self.usurp_votes.clear();
        self.hostage_candidates.clear();
        self.hostages_locked = false;
        self.parlay_complete = false;
    }

    pub fn clear_votes(&mut self) {
        self.leader_votes.clear();
    }
}

/// The two rooms, addressed by `RoomId`.
#[derive(Debug, Clone, Default)]
pub struct Rooms {
    a: RoomState,
    b: RoomState,
}

impl Rooms {
    pub fn get(&self, room: RoomId) -> &RoomState {
        match room {
            RoomId::A => &self.a,
            RoomId::B => &self.b,
        }
    }

    pub fn get_mut(&mut self, room: RoomId) -> &mut RoomState {
        match room {
            RoomId::A => &mut self.a,
            RoomId::B => &mut self.b,
        }
    }

    /// Which room currently lists `player_id` as a member.
    pub fn room_of(&self, player_id: PlayerId) -> Option<RoomId> {
        if self.a.members.contains(&player_id) {
            Some(RoomId::A)
        } else if self.b.members.contains(&player_id) {
            Some(RoomId::B)
        } else {
            None
        }
    }
}

/// What kind of information a share reveals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShareKind {
    Card,
    Color,
}

/// One completed share, kept in private history.
#[derive(Debug, Clone)]
pub struct CardShareRecord {
    pub round: u8,
    pub initiator: PlayerId,
    pub target: PlayerId,
    pub kind: ShareKind,
    pub at: OffsetDateTime,
}

/// State that never leaves the server in any event or view.
#[derive(Debug, Clone)]
pub struct PrivateState {
    pub host_id: PlayerId,
    pub role_assignments: HashMap<PlayerId, CharacterId>,
    /// The shuffled deck as dealt, for diagnostics.
    pub deck: Vec<CharacterId>,
    pub buried_card: Option<CharacterId>,
    /// Random seed drawn at creation; diagnostics only, never published.
    pub seed: [u8; 32],
    /// round number -> players who usurped that round.
    pub usurpations: HashMap<u8, Vec<PlayerId>>,
    pub card_shares: Vec<CardShareRecord>,
}

impl PrivateState {
    fn new(host_id: PlayerId) -> Self {
        let mut seed = [0u8; 32];
        OsRng.fill_bytes(&mut seed);
        Self {
            host_id,
            role_assignments: HashMap::new(),
            deck: Vec::new(),
            buried_card: None,
            seed,
            usurpations: HashMap::new(),
            card_shares: Vec::new(),
        }
    }
}

/// Full authoritative state, partitioned by who may observe it.
#[derive(Debug)]
pub struct GameState {
    pub phase: Phase,
    /// 0 until the first round starts.
    pub current_round: u8,
    pub paused: bool,
    pub pause_reason: Option<String>,
    pub parlay_active: bool,
    pub rooms: Rooms,
    pub round_timer: GameTimer,
    pub parlay_timer: GameTimer,
    pub private: PrivateState,
}

/// Aggregate root. Owned by exactly one writer at a time (the store wraps
/// it in a mutex); every mutation bumps `version`.
#[derive(Debug)]
pub struct Game {
    pub id: GameId,
    /// Short human-visible room code, unique across live games.
    pub code: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub version: u64,
    pub config: GameConfig,
    pub players: HashMap<PlayerId, Player>,
    pub state: GameState,
    pub bus: GameBus,
}

impl Game {
    /// Create a game with its host already joined.
    pub fn new(code: String, host_name: String) -> Self {
        let now = OffsetDateTime::now_utc();
        let host = Player::new(host_name, true, now);
        let host_id = host.id;
        let mut players = HashMap::new();
        players.insert(host_id, host);

        Self {
            id: GameId::new(),
            code,
            created_at: now,
            updated_at: now,
            version: 0,
            config: GameConfig::default(),
            players,
            state: GameState {
                phase: Phase::Lobby,
                current_round: 0,
                paused: false,
                pause_reason: None,
                parlay_active: false,
                rooms: Rooms::default(),
                round_timer: GameTimer::idle(),
                parlay_timer: GameTimer::idle(),
                private: PrivateState::new(host_id),
            },
            bus: GameBus::new(),
        }
    }

    pub fn host_id(&self) -> PlayerId {
        self.state.private.host_id
    }

    /// Add a non-host player. Caller validates phase and name first.
    pub fn add_player(&mut self, display_name: String) -> PlayerId {
        let player = Player::new(display_name, false, OffsetDateTime::now_utc());
        let id = player.id;
        self.players.insert(id, player);
        id
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    pub fn require_player(&self, id: PlayerId) -> Result<&Player, DomainError> {
        self.players
            .get(&id)
            .ok_or_else(|| DomainError::not_found(NotFoundKind::Player, format!("player {id}")))
    }

    pub fn require_player_mut(&mut self, id: PlayerId) -> Result<&mut Player, DomainError> {
        self.players
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found(NotFoundKind::Player, format!("player {id}")))
    }

    /// Player ids in a stable order, for reproducible iteration.
    pub fn sorted_player_ids(&self) -> Vec<PlayerId> {
        let mut ids: Vec<PlayerId> = self.players.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Record a mutation: bump the version and the last-mutation timestamp.
    pub fn touch(&mut self) {
        self.version += 1;
        self.updated_at = OffsetDateTime::now_utc();
    }

    /// Journal and fan out an event. Room membership is resolved now, not
    /// when subscribers attached.
    pub fn publish(&mut self, scope: Scope, event: GameEvent) -> EventRecord {
        self.bus
            .publish(scope, event, &self.state.rooms, OffsetDateTime::now_utc())
    }

    /// Attach an observer mailbox, replaying matching entries newer than
    /// `acked_seq` against current room membership.
    pub fn subscribe(
        &mut self,
        player_id: PlayerId,
        acked_seq: u64,
    ) -> (uuid::Uuid, tokio::sync::mpsc::UnboundedReceiver<EventRecord>) {
        self.bus.subscribe(player_id, acked_seq, &self.state.rooms)
    }

    /// Observer-safe projection of the whole game.
    pub fn public_view(&self, now: Instant) -> PublicGameView {
        let mut room_assignments = BTreeMap::new();
        for room_id in [RoomId::A, RoomId::B] {
            for member in &self.state.rooms.get(room_id).members {
                room_assignments.insert(*member, room_id);
            }
        }

        let mut players: Vec<PublicPlayerInfo> =
            self.players.values().map(Player::public_info).collect();
        players.sort_by(|x, y| x.id.cmp(&y.id));

        PublicGameView {
            phase: self.state.phase,
            current_round: self.state.current_round,
            total_rounds: self.config.total_rounds,
            room_assignments,
            leader_a: self.state.rooms.get(RoomId::A).leader,
            leader_b: self.state.rooms.get(RoomId::B).leader,
            timer: self.state.round_timer.view(now),
            paused: self.state.paused,
            pause_reason: self.state.pause_reason.clone(),
            parlay_active: self.state.parlay_active,
            players,
        }
    }

    /// The private projection sent only to `player_id`.
    pub fn player_private_view(
        &self,
        player_id: PlayerId,
        catalog: &CharacterCatalog,
    ) -> Result<PlayerPrivateView, DomainError> {
        let player = self.require_player(player_id)?;
        let card = |id: &CharacterId| catalog.get(id).map(RoleCard::from_def);
        Ok(PlayerPrivateView {
            current_role: player.current_role.as_ref().and_then(card),
            original_role: player.original_role.as_ref().and_then(card),
            conditions: player.conditions.clone(),
            collected_cards: player.collected_cards.iter().filter_map(card).collect(),
            known_information: player.known_information.clone(),
        })
    }

    /// Room-partition invariant: every roomed player appears in exactly one
    /// member list, and every listed member is a known player.
    pub fn check_room_partition(&self) -> Result<(), DomainError> {
        let room_a = &self.state.rooms.get(RoomId::A).members;
        let room_b = &self.state.rooms.get(RoomId::B).members;

        for id in room_a {
            if room_b.contains(id) {
                return Err(DomainError::internal(format!(
                    "player {id} listed in both rooms"
                )));
            }
        }
        for id in room_a.iter().chain(room_b.iter()) {
            let player = self.require_player(*id)?;
            let listed_room = self.state.rooms.room_of(*id);
            if player.current_room != listed_room {
                return Err(DomainError::internal(format!(
                    "player {id} room field disagrees with member lists"
                )));
            }
        }
        Ok(())
    }
}

/// Everything any observer may see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicGameView {
    pub phase: Phase,
    pub current_round: u8,
    pub total_rounds: u8,
    pub room_assignments: BTreeMap<PlayerId, RoomId>,
    pub leader_a: Option<PlayerId>,
    pub leader_b: Option<PlayerId>,
    pub timer: TimerView,
    pub paused: bool,
    pub pause_reason: Option<String>,
    pub parlay_active: bool,
    pub players: Vec<PublicPlayerInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_game_has_host_in_lobby() {
        let game = Game::new("ABCDEF".to_string(), "alice".to_string());
        assert_eq!(game.state.phase, Phase::Lobby);
        assert_eq!(game.players.len(), 1);
        let host = game.require_player(game.host_id()).unwrap();
        assert!(host.is_host);
        assert_eq!(host.display_name, "alice");
    }

    #[test]
    fn touch_bumps_version_monotonically() {
        let mut game = Game::new("ABCDEF".to_string(), "alice".to_string());
        assert_eq!(game.version, 0);
        game.touch();
        game.touch();
        assert_eq!(game.version, 2);
    }

    #[test]
    fn sorted_player_ids_are_stable() {
        let mut game = Game::new("ABCDEF".to_string(), "alice".to_string());
        for i in 0..5 {
            game.add_player(format!("p{i}"));
        }
        let first = game.sorted_player_ids();
        let second = game.sorted_player_ids();
        assert_eq!(first, second);
        assert_eq!(first.len(), 6);
    }

    #[test]
    fn public_view_carries_no_private_state() {
        let game = Game::new("ABCDEF".to_string(), "alice".to_string());
        let view = game.public_view(Instant::now());
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("private").is_none());
        assert!(json.get("seed").is_none());
        assert!(json.get("role_assignments").is_none());
    }

    #[test]
    fn room_partition_detects_double_listing() {
        let mut game = Game::new("ABCDEF".to_string(), "alice".to_string());
        let bob = game.add_player("bob".to_string());
        game.state.rooms.get_mut(RoomId::A).members.push(bob);
        game.state.rooms.get_mut(RoomId::B).members.push(bob);
        assert!(game.check_room_partition().is_err());
    }

    #[test]
    fn round_duration_indexes_one_based() {
        let config = GameConfig::default();
        assert_eq!(config.round_duration(1), rules::default_round_durations(3)[0]);
        assert_eq!(config.round_duration(3), rules::default_round_durations(3)[2]);
        assert_eq!(config.round_duration(9), Duration::ZERO);
    }
}
