//! Phase machine: phases, triggers, and the pure transition function.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::game::Game;
use crate::domain::ids::RoomId;
use crate::domain::rules::{MAX_PLAYERS, MIN_PLAYERS};

/// Top-level game phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Lobby,
    Locked,
    RoleSelection,
    RoleDistribution,
    RoomAssignment,
    Round { round: u8 },
    Resolution,
    Finished,
}

impl Phase {
    /// True in any `ROUND_k` phase.
    pub fn is_round(&self) -> bool {
        matches!(self, Phase::Round { .. })
    }

    /// The 1-based round number, when in a round.
    pub fn round_number(&self) -> Option<u8> {
        match self {
            Phase::Round { round } => Some(*round),
            _ => None,
        }
    }
}

/// What is asking the machine to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trigger {
    LockRoom,
    UnlockRoom,
    StartRoleSelection,
    CancelRoleSelection,
    ConfirmRoles,
    RolesDistributed,
    StartGame,
    RoundComplete,
    InstantWin,
    WinConditionsResolved,
}

/// Typed denial reason returned by the machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionDenied {
    #[error("no transition from {phase:?} on {trigger:?}")]
    NoSuchTransition { phase: Phase, trigger: Trigger },
    #[error("player count {count} outside {MIN_PLAYERS}..={MAX_PLAYERS}")]
    PlayerCountOutOfRange { count: usize },
    #[error("roles have already been assigned")]
    RolesAlreadyAssigned,
    #[error("not every player has an assigned role")]
    RolesNotDistributed,
    #[error("rooms are unbalanced ({room_a} vs {room_b})")]
    RoomsUnbalanced { room_a: usize, room_b: usize },
    #[error("hostage candidates are still selected or locked")]
    HostagesOutstanding,
}

/// Decide whether `trigger` may fire for `game`, and where it leads.
///
/// Pure: inspects the game, never mutates it. The controller owns applying
/// the returned phase and publishing the transition event.
pub fn next_phase(game: &Game, trigger: Trigger) -> Result<Phase, TransitionDenied> {
    let phase = game.state.phase;
    match (phase, trigger) {
        (Phase::Lobby, Trigger::LockRoom) => {
            let count = game.players.len();
            if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&count) {
                return Err(TransitionDenied::PlayerCountOutOfRange { count });
            }
            Ok(Phase::Locked)
        }
        (Phase::Locked, Trigger::UnlockRoom) => {
            if !game.state.private.role_assignments.is_empty() {
                return Err(TransitionDenied::RolesAlreadyAssigned);
            }
            Ok(Phase::Lobby)
        }
        (Phase::Locked, Trigger::StartRoleSelection) => Ok(Phase::RoleSelection),
        (Phase::RoleSelection, Trigger::CancelRoleSelection) => Ok(Phase::Locked),
        // The role-configuration validator gates this trigger before it
        // reaches the machine.
        (Phase::RoleSelection, Trigger::ConfirmRoles) => Ok(Phase::RoleDistribution),
        (Phase::RoleDistribution, Trigger::RolesDistributed) => {
            let all_assigned = game.players.values().all(|p| p.current_role.is_some());
            if !all_assigned {
                return Err(TransitionDenied::RolesNotDistributed);
            }
            Ok(Phase::RoomAssignment)
        }
        (Phase::RoomAssignment, Trigger::StartGame) => {
            let room_a = game.state.rooms.get(RoomId::A).members.len();
            let room_b = game.state.rooms.get(RoomId::B).members.len();
            if room_a.abs_diff(room_b) > 1 {
                return Err(TransitionDenied::RoomsUnbalanced { room_a, room_b });
            }
            Ok(Phase::Round { round: 1 })
        }
        (Phase::Round { round }, Trigger::RoundComplete) => {
            for room_id in [RoomId::A, RoomId::B] {
                let room = game.state.rooms.get(room_id);
                if !room.hostage_candidates.is_empty() || room.hostages_locked {
                    return Err(TransitionDenied::HostagesOutstanding);
                }
            }
            if round < game.config.total_rounds {
                Ok(Phase::Round { round: round + 1 })
            } else {
                Ok(Phase::Resolution)
            }
        }
        (Phase::Round { .. }, Trigger::InstantWin) => Ok(Phase::Resolution),
        (Phase::Resolution, Trigger::WinConditionsResolved) => Ok(Phase::Finished),
        (phase, trigger) => Err(TransitionDenied::NoSuchTransition { phase, trigger }),
    }
}
