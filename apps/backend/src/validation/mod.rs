//! Validation layer: every externally submitted command passes through
//! here before any mutation.
//!
//! Issues are structured values; warnings ride alongside acceptance and
//! are forwarded to the caller without blocking the command.

use serde::Serialize;
use serde_json::json;

use crate::domain::catalog::CharacterCatalog;
use crate::domain::character::Team;
use crate::domain::game::Game;
use crate::domain::ids::{PlayerId, RoomId};
use crate::domain::rules::{MAX_PLAYERS, MIN_PLAYERS, VALID_TOTAL_ROUNDS};
use crate::errors::domain::DomainError;
use crate::errors::error_code::ErrorCode;

/// Red/blue counts may differ by at most this much before a warning.
const TEAM_BALANCE_TOLERANCE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// One finding from the validator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub code: ErrorCode,
    pub message: String,
    pub severity: Severity,
    pub suggestion: Option<String>,
    pub context: Option<serde_json::Value>,
}

impl ValidationIssue {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            severity: Severity::Error,
            suggestion: None,
            context: None,
        }
    }

    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            severity: Severity::Warning,
            suggestion: None,
            context: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }
}

/// Accumulated findings for one command.
#[derive(Debug, Clone, Default)]
pub struct Validation {
    issues: Vec<ValidationIssue>,
}

impl Validation {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn is_ok(&self) -> bool {
        !self
            .issues
            .iter()
            .any(|issue| issue.severity == Severity::Error)
    }

    pub fn warnings(&self) -> Vec<ValidationIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Warning)
            .cloned()
            .collect()
    }

    /// Accept (keeping warnings) or deny with the first error.
    pub fn into_result(self) -> Result<Vec<ValidationIssue>, DomainError> {
        match self
            .issues
            .iter()
            .find(|issue| issue.severity == Severity::Error)
        {
            None => Ok(self.warnings()),
            Some(first) => Err(DomainError::Validation {
                code: first.code,
                detail: first.message.clone(),
                suggestion: first.suggestion.clone(),
                context: first.context.clone(),
            }),
        }
    }
}

/// ROOM_LOCK: player count must sit inside the supported band.
pub fn validate_player_count(count: usize) -> Validation {
    let mut validation = Validation::ok();
    if count < MIN_PLAYERS {
        validation.push(
            ValidationIssue::error(
                ErrorCode::InsufficientPlayers,
                format!("{count} players joined; at least {MIN_PLAYERS} required"),
            )
            .with_suggestion(format!("invite {} more", MIN_PLAYERS - count)),
        );
    } else if count > MAX_PLAYERS {
        validation.push(ValidationIssue::error(
            ErrorCode::TooManyPlayers,
            format!("{count} players joined; at most {MAX_PLAYERS} supported"),
        ));
    }
    validation
}

/// SET_ROUNDS: only the published round counts are playable.
pub fn validate_total_rounds(total_rounds: u8) -> Validation {
    let mut validation = Validation::ok();
    if !VALID_TOTAL_ROUNDS.contains(&total_rounds) {
        validation.push(ValidationIssue::error(
            ErrorCode::InvalidRounds,
            format!("total_rounds must be one of {VALID_TOTAL_ROUNDS:?}, got {total_rounds}"),
        ));
    }
    validation
}

/// ROLE_CONFIGURATION: the full deck check run on `confirm_roles`.
pub fn validate_role_configuration(game: &Game, catalog: &CharacterCatalog) -> Validation {
    let mut validation = Validation::ok();
    let selected = &game.config.selected_roles;
    let player_count = game.players.len();

    for id in selected {
        if !catalog.contains(id) {
            validation.push(ValidationIssue::error(
                ErrorCode::UnknownCharacter,
                format!("character {id} is not in the catalogue"),
            ));
        }
    }

    // Every PRIMARY-class card must be in the deck; that is how the two
    // designated required characters are identified without magic ids.
    for primary in catalog.primaries() {
        if !selected.contains(primary) {
            validation.push(
                ValidationIssue::error(
                    ErrorCode::MissingPrimary,
                    format!("deck must include {primary}"),
                )
                .with_suggestion(format!("add {primary} to the selected roles")),
            );
        }
    }

    let expected = player_count + usize::from(game.config.bury_card);
    if selected.len() != expected {
        validation.push(
            ValidationIssue::error(
                ErrorCode::RoleCountMismatch,
                format!(
                    "deck has {} roles for {player_count} players (bury_card = {})",
                    selected.len(),
                    game.config.bury_card
                ),
            )
            .with_suggestion(format!("select exactly {expected} roles")),
        );
    }

    for id in selected {
        let Some(def) = catalog.get(id) else { continue };
        for required in &def.requires {
            if !selected.contains(required) {
                validation.push(
                    ValidationIssue::error(
                        ErrorCode::MissingDependency,
                        format!("{id} requires {required} in the deck"),
                    )
                    .with_context(json!({ "character": id, "missing": required })),
                );
            }
        }
        for excluded in &def.mutually_exclusive {
            if selected.contains(excluded) {
                validation.push(
                    ValidationIssue::error(
                        ErrorCode::MutuallyExclusive,
                        format!("{id} cannot share a deck with {excluded}"),
                    )
                    .with_context(json!({ "character": id, "excluded": excluded })),
                );
            }
        }
    }

    let red = team_count(selected, catalog, Team::Red);
    let blue = team_count(selected, catalog, Team::Blue);
    if red.abs_diff(blue) > TEAM_BALANCE_TOLERANCE {
        validation.push(
            ValidationIssue::warning(
                ErrorCode::TeamImbalance,
                format!("deck has {red} red vs {blue} blue characters"),
            )
            .with_context(json!({ "red": red, "blue": blue })),
        );
    }

    validation
}

fn team_count(selected: &[crate::domain::CharacterId], catalog: &CharacterCatalog, team: Team) -> usize {
    selected
        .iter()
        .filter(|id| catalog.get(id).is_some_and(|def| def.team == team))
        .count()
}

/// Host-only commands.
pub fn require_host(game: &Game, player_id: PlayerId) -> Result<(), DomainError> {
    let player = game.require_player(player_id)?;
    if !player.is_host {
        return Err(DomainError::validation(
            ErrorCode::NotHost,
            "only the host may do this",
        ));
    }
    Ok(())
}

/// Commands restricted to the room's current leader.
pub fn require_leader(game: &Game, room: RoomId, player_id: PlayerId) -> Result<(), DomainError> {
    if game.state.rooms.get(room).leader != Some(player_id) {
        return Err(DomainError::validation(
            ErrorCode::NotLeader,
            format!("only the leader of room {room} may do this"),
        ));
    }
    Ok(())
}

/// Commands any member of the addressed room may issue.
pub fn require_room_member(
    game: &Game,
    room: RoomId,
    player_id: PlayerId,
) -> Result<(), DomainError> {
    game.require_player(player_id)?;
    if !game.state.rooms.get(room).members.contains(&player_id) {
        return Err(DomainError::validation(
            ErrorCode::NotRoomMember,
            format!("player is not in room {room}"),
        ));
    }
    Ok(())
}

/// Hostage targets: a non-leader, hostage-eligible member of the leader's
/// own room.
pub fn validate_hostage_target(
    game: &Game,
    room: RoomId,
    target: PlayerId,
) -> Result<(), DomainError> {
    let player = game
        .player(target)
        .ok_or_else(|| DomainError::validation(ErrorCode::MissingTarget, "no such player"))?;
    if !game.state.rooms.get(room).members.contains(&target) {
        return Err(DomainError::validation(
            ErrorCode::WrongRoom,
            "hostage must be selected from the leader's own room",
        ));
    }
    if game.state.rooms.get(room).leader == Some(target) || !player.can_be_hostage {
        return Err(DomainError::validation(
            ErrorCode::IneligibleHostage,
            "that player cannot be sent as a hostage",
        ));
    }
    Ok(())
}

/// Share targets must share a room with the initiator.
pub fn validate_share_target(
    game: &Game,
    initiator: PlayerId,
    target: PlayerId,
) -> Result<RoomId, DomainError> {
    if initiator == target {
        return Err(DomainError::validation(
            ErrorCode::MissingTarget,
            "cannot share with yourself",
        ));
    }
    game.require_player(target).map_err(|_| {
        DomainError::validation(ErrorCode::MissingTarget, "no such player to share with")
    })?;
    let initiator_room = game.state.rooms.room_of(initiator);
    let target_room = game.state.rooms.room_of(target);
    match (initiator_room, target_room) {
        (Some(a), Some(b)) if a == b => Ok(a),
        _ => Err(DomainError::validation(
            ErrorCode::WrongRoom,
            "share target must be in the same room",
        )),
    }
}
