//! Typed game events and their audience scopes.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::character::{RoleCard, Team};
use crate::domain::ids::{PlayerId, RoomId};
use crate::domain::phase::{Phase, Trigger};
use crate::domain::player::{PlayerPrivateView, PublicPlayerInfo};
use crate::domain::timer::TimerView;
use crate::errors::error_code::ErrorCode;

/// Audience filter attached to every journal entry.
///
/// Room scopes are resolved against membership at publish time, so an
/// entry published before a hostage exchange never leaks to the player's
/// new roommates on replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Scope {
    Public,
    Room { room: RoomId },
    Player { player_id: PlayerId },
}

impl Scope {
    pub fn room(room: RoomId) -> Self {
        Scope::Room { room }
    }

    pub fn player(player_id: PlayerId) -> Self {
        Scope::Player { player_id }
    }
}

/// How a leader vote concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElectionMethod {
    Majority,
    RandomSelection,
}

/// Why a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundEndReason {
    HostagesExchanged,
    EndedEarly,
}

/// Every event the core publishes.
///
/// No variant published on a `Public` or `Room` scope may carry a player's
/// assigned character id; role-bearing variants are player-scoped only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameEvent {
    // Connection
    Connected {
        player_id: PlayerId,
    },
    Disconnected {
        player_id: PlayerId,
    },
    Error {
        code: ErrorCode,
        message: String,
    },

    // Lifecycle
    GameCreated {
        code: String,
        host_id: PlayerId,
    },
    PlayerJoined {
        player: PublicPlayerInfo,
    },
    PlayerLeft {
        player_id: PlayerId,
    },
    RoomLocked,
    RoomUnlocked,
    PhaseChanged {
        from: Phase,
        to: Phase,
        trigger: Trigger,
    },

    // Role setup
    RolesSelected {
        count: usize,
    },
    GameConfigUpdated {
        total_rounds: u8,
        bury_card: bool,
    },
    /// Player-scoped only: the one card dealt to that player.
    RoleAssigned {
        role: RoleCard,
    },
    RoomsAssigned {
        assignments: Vec<(PlayerId, RoomId)>,
    },

    // Round flow
    RoundStarted {
        round: u8,
        duration_secs: u64,
        leader_voting: bool,
    },
    RoundEnded {
        round: u8,
        reason: RoundEndReason,
    },
    TimerUpdate {
        timer: TimerView,
    },
    GamePaused {
        reason: String,
    },
    GameResumed {
        reason: String,
    },
    GameFinished {
        winning_teams: Vec<Team>,
    },

    // Leadership
    VoteCast {
        room: RoomId,
        voter_id: PlayerId,
        candidate_id: PlayerId,
        votes_cast: usize,
        votes_needed: usize,
    },
    LeaderVoteStarted {
        room: RoomId,
    },
    LeaderVoteTied {
        room: RoomId,
        tie_count: u8,
        candidates: Vec<PlayerId>,
    },
    LeaderElected {
        room: RoomId,
        leader_id: PlayerId,
        method: ElectionMethod,
        tie_count: u8,
    },
    LeaderUsurped {
        room: RoomId,
        old_leader_id: PlayerId,
        new_leader_id: PlayerId,
    },
    LeaderAbdicated {
        room: RoomId,
        old_leader_id: PlayerId,
        new_leader_id: PlayerId,
    },
    LeaderDisconnected {
        room: RoomId,
        player_id: PlayerId,
    },

    // Hostages & parlay
    HostageSelected {
        room: RoomId,
        player_id: PlayerId,
        selected: bool,
        count: usize,
        required: usize,
    },
    HostagesLocked {
        room: RoomId,
    },
    ParlayStarted {
        leader_a: PlayerId,
        leader_b: PlayerId,
    },
    ParlayEnded,
    HostagesExchanged {
        to_room_a: Vec<PlayerId>,
        to_room_b: Vec<PlayerId>,
    },

    // Shares & reveals (role-bearing variants are player-scoped)
    CardShared {
        with_player_id: PlayerId,
        role: RoleCard,
    },
    ColorShared {
        with_player_id: PlayerId,
        team: Team,
    },
    PrivateRevealReceived {
        from_player_id: PlayerId,
        role: RoleCard,
    },
    /// Room-scoped: colour only, never the character id.
    PublicReveal {
        player_id: PlayerId,
        team: Team,
    },

    // Sync
    PlayerDisconnected {
        player_id: PlayerId,
    },
    PlayerReconnected {
        player_id: PlayerId,
    },
    StateSync {
        view: PlayerPrivateView,
    },
    DesyncDetected {
        acked_seq: u64,
        head_seq: u64,
    },
}

impl GameEvent {
    /// Canonical wire name of the event type.
    pub fn kind(&self) -> &'static str {
        match self {
            GameEvent::Connected { .. } => "CONNECTED",
            GameEvent::Disconnected { .. } => "DISCONNECTED",
            GameEvent::Error { .. } => "ERROR",
            GameEvent::GameCreated { .. } => "GAME_CREATED",
            GameEvent::PlayerJoined { .. } => "PLAYER_JOINED",
            GameEvent::PlayerLeft { .. } => "PLAYER_LEFT",
            GameEvent::RoomLocked => "ROOM_LOCKED",
            GameEvent::RoomUnlocked => "ROOM_UNLOCKED",
            GameEvent::PhaseChanged { .. } => "PHASE_CHANGED",
            GameEvent::RolesSelected { .. } => "ROLES_SELECTED",
            GameEvent::GameConfigUpdated { .. } => "GAME_CONFIG_UPDATED",
            GameEvent::RoleAssigned { .. } => "ROLE_ASSIGNED",
            GameEvent::RoomsAssigned { .. } => "ROOMS_ASSIGNED",
            GameEvent::RoundStarted { .. } => "ROUND_STARTED",
            GameEvent::RoundEnded { .. } => "ROUND_ENDED",
            GameEvent::TimerUpdate { .. } => "TIMER_UPDATE",
            GameEvent::GamePaused { .. } => "GAME_PAUSED",
            GameEvent::GameResumed { .. } => "GAME_RESUMED",
            GameEvent::GameFinished { .. } => "GAME_FINISHED",
            GameEvent::VoteCast { .. } => "VOTE_CAST",
            GameEvent::LeaderVoteStarted { .. } => "LEADER_VOTE_STARTED",
            GameEvent::LeaderVoteTied { .. } => "LEADER_VOTE_TIED",
            GameEvent::LeaderElected { .. } => "LEADER_ELECTED",
            GameEvent::LeaderUsurped { .. } => "LEADER_USURPED",
            GameEvent::LeaderAbdicated { .. } => "LEADER_ABDICATED",
            GameEvent::LeaderDisconnected { .. } => "LEADER_DISCONNECTED",
            GameEvent::HostageSelected { .. } => "HOSTAGE_SELECTED",
            GameEvent::HostagesLocked { .. } => "HOSTAGES_LOCKED",
            GameEvent::ParlayStarted { .. } => "PARLAY_STARTED",
            GameEvent::ParlayEnded => "PARLAY_ENDED",
            GameEvent::HostagesExchanged { .. } => "HOSTAGES_EXCHANGED",
            GameEvent::CardShared { .. } => "CARD_SHARED",
            GameEvent::ColorShared { .. } => "COLOR_SHARED",
            GameEvent::PrivateRevealReceived { .. } => "PRIVATE_REVEAL_RECEIVED",
            GameEvent::PublicReveal { .. } => "PUBLIC_REVEAL",
            GameEvent::PlayerDisconnected { .. } => "PLAYER_DISCONNECTED",
            GameEvent::PlayerReconnected { .. } => "PLAYER_RECONNECTED",
            GameEvent::StateSync { .. } => "STATE_SYNC",
            GameEvent::DesyncDetected { .. } => "DESYNC_DETECTED",
        }
    }
}

/// One journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_id: Uuid,
    pub sequence_number: u64,
    pub scope: Scope,
    #[serde(flatten)]
    pub event: GameEvent,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_tagged() {
        let event = GameEvent::RoundStarted {
            round: 2,
            duration_secs: 120,
            leader_voting: false,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "ROUND_STARTED");
        assert_eq!(json["payload"]["round"], 2);
    }

    #[test]
    fn kind_matches_serde_tag() {
        let event = GameEvent::HostagesLocked { room: RoomId::A };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.kind());
    }

    #[test]
    fn record_flattens_event_fields() {
        let record = EventRecord {
            event_id: Uuid::new_v4(),
            sequence_number: 7,
            scope: Scope::Public,
            event: GameEvent::ParlayEnded,
            timestamp: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["sequence_number"], 7);
        assert_eq!(json["type"], "PARLAY_ENDED");
    }
}
