//! Player records.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::character::{CharacterId, KnownInformation, RoleCard};
use crate::domain::ids::{PlayerId, RoomId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
    Reconnecting,
}

/// Transport binding for one player.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub status: ConnectionStatus,
    /// Token of the live transport connection, if any.
    pub token: Option<Uuid>,
    pub last_seen: OffsetDateTime,
    /// Highest journal sequence the client has acknowledged.
    pub acked_seq: u64,
}

impl ConnectionInfo {
    pub fn connected(token: Uuid, now: OffsetDateTime) -> Self {
        Self {
            status: ConnectionStatus::Connected,
            token: Some(token),
            last_seen: now,
            acked_seq: 0,
        }
    }
}

/// One participant. Created on join, kept for the game's lifetime;
/// disconnection never destroys it.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub display_name: String,
    pub is_host: bool,
    pub connection: ConnectionInfo,

    pub current_role: Option<CharacterId>,
    pub original_role: Option<CharacterId>,
    pub current_room: Option<RoomId>,
    pub is_leader: bool,
    pub can_be_hostage: bool,
    pub alive: bool,

    pub conditions: Vec<String>,
    pub collected_cards: Vec<CharacterId>,
    pub known_information: Vec<KnownInformation>,

    pub was_sent_as_hostage: bool,
    pub usurped_leaders: u32,
}

impl Player {
    pub fn new(display_name: String, is_host: bool, now: OffsetDateTime) -> Self {
        Self {
            id: PlayerId::new(),
            display_name,
            is_host,
            connection: ConnectionInfo::connected(Uuid::new_v4(), now),
            current_role: None,
            original_role: None,
            current_room: None,
            is_leader: false,
            can_be_hostage: true,
            alive: true,
            conditions: Vec::new(),
            collected_cards: Vec::new(),
            known_information: Vec::new(),
            was_sent_as_hostage: false,
            usurped_leaders: 0,
        }
    }

    /// The roster projection every observer may see.
    pub fn public_info(&self) -> PublicPlayerInfo {
        PublicPlayerInfo {
            id: self.id,
            display_name: self.display_name.clone(),
            is_host: self.is_host,
            connection_status: self.connection.status,
            is_leader: self.is_leader,
            current_room: self.current_room,
        }
    }
}

/// Everything one player may know about their own hand: sent only to that
/// player, never journaled on a wider scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerPrivateView {
    pub current_role: Option<RoleCard>,
    pub original_role: Option<RoleCard>,
    pub conditions: Vec<String>,
    pub collected_cards: Vec<RoleCard>,
    pub known_information: Vec<KnownInformation>,
}

/// Roster entry. Never carries role information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicPlayerInfo {
    pub id: PlayerId,
    pub display_name: String,
    pub is_host: bool,
    pub connection_status: ConnectionStatus,
    pub is_leader: bool,
    pub current_room: Option<RoomId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_player_starts_connected_and_roleless() {
        let player = Player::new("alice".to_string(), true, OffsetDateTime::now_utc());
        assert_eq!(player.connection.status, ConnectionStatus::Connected);
        assert!(player.current_role.is_none());
        assert!(player.can_be_hostage);
        assert!(player.alive);
    }

    #[test]
    fn public_info_has_no_role_fields() {
        let player = Player::new("bob".to_string(), false, OffsetDateTime::now_utc());
        let info = player.public_info();
        let json = serde_json::to_value(&info).unwrap();
        assert!(json.get("current_role").is_none());
        assert!(json.get("original_role").is_none());
    }
}
