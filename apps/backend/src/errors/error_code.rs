//! Error codes for the game core.
//!
//! This module defines all error codes surfaced to callers. Add new codes
//! here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings the
//! transport serialises into denial responses.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Centralized error codes for the game core.
///
/// This enum ensures type safety and prevents the use of ad-hoc error
/// codes. Each variant maps to a canonical SCREAMING_SNAKE_CASE string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Authorization
    /// Caller is not allowed to perform this command at all
    Unauthorized,
    /// Command is restricted to the game host
    NotHost,
    /// Command is restricted to the current room leader
    NotLeader,
    /// Caller is not a member of the addressed room
    NotRoomMember,

    // Lobby bounds
    /// Fewer than the minimum players present
    InsufficientPlayers,
    /// More than the maximum players present
    TooManyPlayers,
    /// Display name already taken in this game
    NameTaken,

    // State
    /// Command is not legal in the current phase
    PhaseMismatch,
    /// Command is legal in this phase but the game is in the wrong sub-state
    InvalidState,
    /// Requested rounds value is not supported
    InvalidRounds,

    // Role configuration
    /// Deck size does not match the player count
    RoleCountMismatch,
    /// A mandatory primary character is missing from the deck
    MissingPrimary,
    /// A selected character's requirement is not in the deck
    MissingDependency,
    /// Two selected characters exclude each other
    MutuallyExclusive,
    /// Red/blue counts differ by more than the advisory bound (warning)
    TeamImbalance,
    /// Character id not present in the catalogue
    UnknownCharacter,

    // Round actions
    /// Referenced player does not exist in this game
    MissingTarget,
    /// Target is in the other room
    WrongRoom,
    /// Hostage candidate list already holds the required count
    HostageLimitReached,
    /// Hostage candidate count does not match the required count
    HostageCountMismatch,
    /// Leader poll finished tied; a re-vote is required
    TiedVote,
    /// No leader vote is currently open
    VoteNotActive,
    /// A leader vote is already open
    VoteAlreadyActive,
    /// The addressed room has no leader
    NoLeader,
    /// Target may not be selected as a hostage
    IneligibleHostage,

    // Resources
    /// Game not found
    GameNotFound,
    /// Player not found
    PlayerNotFound,
    /// Room code collided with a live game
    RoomCodeConflict,
    /// Room code generation exhausted its retries
    RoomCodeExhausted,

    // System
    /// Character catalogue failed validation at startup
    InvalidCatalog,
    /// Internal inconsistency; the command was aborted
    Internal,
}

impl ErrorCode {
    /// Canonical string for this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::NotHost => "NOT_HOST",
            ErrorCode::NotLeader => "NOT_LEADER",
            ErrorCode::NotRoomMember => "NOT_ROOM_MEMBER",
            ErrorCode::InsufficientPlayers => "INSUFFICIENT_PLAYERS",
            ErrorCode::TooManyPlayers => "TOO_MANY_PLAYERS",
            ErrorCode::NameTaken => "NAME_TAKEN",
            ErrorCode::PhaseMismatch => "PHASE_MISMATCH",
            ErrorCode::InvalidState => "INVALID_STATE",
            ErrorCode::InvalidRounds => "INVALID_ROUNDS",
            ErrorCode::RoleCountMismatch => "ROLE_COUNT_MISMATCH",
            ErrorCode::MissingPrimary => "MISSING_PRIMARY",
            ErrorCode::MissingDependency => "MISSING_DEPENDENCY",
            ErrorCode::MutuallyExclusive => "MUTUALLY_EXCLUSIVE",
            ErrorCode::TeamImbalance => "TEAM_IMBALANCE",
            ErrorCode::UnknownCharacter => "UNKNOWN_CHARACTER",
            ErrorCode::MissingTarget => "MISSING_TARGET",
            ErrorCode::WrongRoom => "WRONG_ROOM",
            ErrorCode::HostageLimitReached => "HOSTAGE_LIMIT_REACHED",
            ErrorCode::HostageCountMismatch => "HOSTAGE_COUNT_MISMATCH",
            ErrorCode::TiedVote => "TIED_VOTE",
            ErrorCode::VoteNotActive => "VOTE_NOT_ACTIVE",
            ErrorCode::VoteAlreadyActive => "VOTE_ALREADY_ACTIVE",
            ErrorCode::NoLeader => "NO_LEADER",
            ErrorCode::IneligibleHostage => "INELIGIBLE_HOSTAGE",
            ErrorCode::GameNotFound => "GAME_NOT_FOUND",
            ErrorCode::PlayerNotFound => "PLAYER_NOT_FOUND",
            ErrorCode::RoomCodeConflict => "ROOM_CODE_CONFLICT",
            ErrorCode::RoomCodeExhausted => "ROOM_CODE_EXHAUSTED",
            ErrorCode::InvalidCatalog => "INVALID_CATALOG",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
