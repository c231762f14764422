//! Command surface submitted by the transport adapter.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::character::CharacterId;
use crate::domain::ids::{GameId, PlayerId, RoomId};
use crate::validation::ValidationIssue;

/// Typed message submitted on behalf of an authenticated player.
///
/// `game_id` and `player_id` come from the transport's authentication
/// binding; only `CREATE_GAME` and `JOIN_GAME` arrive without them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub game_id: Option<GameId>,
    pub player_id: Option<PlayerId>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(flatten)]
    pub command: Command,
}

impl CommandEnvelope {
    pub fn anonymous(command: Command) -> Self {
        Self {
            game_id: None,
            player_id: None,
            timestamp: OffsetDateTime::now_utc(),
            command,
        }
    }

    pub fn from_player(game_id: GameId, player_id: PlayerId, command: Command) -> Self {
        Self {
            game_id: Some(game_id),
            player_id: Some(player_id),
            timestamp: OffsetDateTime::now_utc(),
            command,
        }
    }
}

/// Every command the core accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    CreateGame {
        host_name: String,
    },
    JoinGame {
        code: String,
        player_name: String,
    },
    LeaveGame,
    LockRoom,
    UnlockRoom,
    SelectRoles {
        roles: Vec<CharacterId>,
    },
    SetRounds {
        total_rounds: u8,
    },
    ConfirmRoles,
    StartGame,
    NominateLeader {
        room: RoomId,
        candidate_id: PlayerId,
    },
    InitiateNewLeaderVote {
        room: RoomId,
    },
    VoteUsurp {
        room: RoomId,
        candidate_id: PlayerId,
    },
    Abdicate {
        room: RoomId,
        successor_id: PlayerId,
    },
    SelectHostage {
        room: RoomId,
        target_player_id: PlayerId,
    },
    LockHostages {
        room: RoomId,
    },
    CardShare {
        target_player_id: PlayerId,
    },
    ColorShare {
        target_player_id: PlayerId,
    },
    PrivateReveal {
        target_player_id: PlayerId,
    },
    PublicReveal,
    ActivateAbility {
        ability: String,
        targets: Vec<PlayerId>,
    },
}

/// Small response payloads for the commands that return one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandResponse {
    GameCreated {
        game_id: GameId,
        player_id: PlayerId,
        code: String,
    },
    Joined {
        game_id: GameId,
        player_id: PlayerId,
    },
}

/// Successful command result: optional payload plus any validator warnings
/// the caller should surface.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommandOutcome {
    pub response: Option<CommandResponse>,
    pub warnings: Vec<ValidationIssue>,
}

impl CommandOutcome {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_warnings(warnings: Vec<ValidationIssue>) -> Self {
        Self {
            response: None,
            warnings,
        }
    }

    pub fn with_response(response: CommandResponse) -> Self {
        Self {
            response: Some(response),
            warnings: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_serialize_tagged() {
        let cmd = Command::SetRounds { total_rounds: 5 };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["type"], "SET_ROUNDS");
        assert_eq!(json["payload"]["total_rounds"], 5);
    }

    #[test]
    fn envelope_flattens_command() {
        let envelope = CommandEnvelope::anonymous(Command::CreateGame {
            host_name: "alice".to_string(),
        });
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["type"], "CREATE_GAME");
        assert_eq!(json["payload"]["host_name"], "alice");
        assert!(json["game_id"].is_null());
    }
}
