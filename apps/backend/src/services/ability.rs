//! Ability engine contract.
//!
//! The core treats character abilities as data: at typed trigger points it
//! asks the engine for an ordered list of effect applications and applies
//! them one by one, each with its own version bump and scoped event. The
//! standard engine evaluates only the generic envelope (win conditions at
//! resolution); embedders plug richer engines through the trait.

use crate::domain::catalog::CharacterCatalog;
use crate::domain::character::{Team, WinCondition, WinPredicate};
use crate::domain::game::Game;
use crate::domain::ids::PlayerId;
use crate::domain::player::Player;

/// Trigger points the controller fires into the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineTrigger {
    RoundStart { round: u8 },
    RoundEnd { round: u8 },
    CardShare { initiator: PlayerId, target: PlayerId },
    ColorShare { initiator: PlayerId, target: PlayerId },
    PrivateReveal { initiator: PlayerId, target: PlayerId },
    PublicReveal { player: PlayerId },
    BecameHostage { player: PlayerId },
    Manual {
        player: PlayerId,
        ability: String,
        targets: Vec<PlayerId>,
    },
    Resolution,
}

/// One effect application, applied by the controller in returned order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ApplyCondition { player: PlayerId, condition: String },
    RemoveCondition { player: PlayerId, condition: String },
    /// Reveal the player's team colour to their room.
    ForceReveal { player: PlayerId },
    SwapCard { first: PlayerId, second: PlayerId },
    EndRoundEarly,
    InstantWin { team: Team },
}

/// Evaluates ability data against the current game.
pub trait AbilityEngine: Send + Sync {
    fn evaluate(
        &self,
        game: &Game,
        catalog: &CharacterCatalog,
        trigger: &EngineTrigger,
    ) -> Vec<Effect>;
}

/// The built-in engine: win-condition evaluation at resolution, nothing
/// else. Advanced per-character abilities are an embedder concern.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardAbilityEngine;

impl AbilityEngine for StandardAbilityEngine {
    fn evaluate(
        &self,
        game: &Game,
        catalog: &CharacterCatalog,
        trigger: &EngineTrigger,
    ) -> Vec<Effect> {
        match trigger {
            EngineTrigger::Resolution => resolve_win_conditions(game, catalog),
            _ => Vec::new(),
        }
    }
}

/// Walk every player's win conditions in priority order. An overriding
/// satisfied condition decides the game on its own; otherwise every
/// satisfied condition's team shares the win.
fn resolve_win_conditions(game: &Game, catalog: &CharacterCatalog) -> Vec<Effect> {
    let mut satisfied: Vec<(&WinCondition, Team)> = Vec::new();

    for id in game.sorted_player_ids() {
        let Some(player) = game.player(id) else { continue };
        let Some(role) = &player.current_role else { continue };
        let Some(def) = catalog.get(role) else { continue };
        for condition in &def.win_conditions {
            if predicate_holds(&condition.predicate, player, game) {
                satisfied.push((condition, def.team));
            }
        }
    }

    satisfied.sort_by_key(|(condition, _)| condition.priority);

    if let Some((_, team)) = satisfied
        .iter()
        .find(|(condition, _)| condition.overrides_team_victory)
    {
        return vec![Effect::InstantWin { team: *team }];
    }

    let mut teams: Vec<Team> = Vec::new();
    for (_, team) in &satisfied {
        if !teams.contains(team) {
            teams.push(*team);
        }
    }
    teams
        .into_iter()
        .map(|team| Effect::InstantWin { team })
        .collect()
}

fn predicate_holds(predicate: &WinPredicate, holder: &Player, game: &Game) -> bool {
    match predicate {
        WinPredicate::SameRoomAs { character } => match rooms_of(holder, character, game) {
            Some((own, other)) => own == other,
            None => false,
        },
        WinPredicate::DifferentRoomFrom { character } => match rooms_of(holder, character, game) {
            Some((own, other)) => own != other,
            None => false,
        },
        WinPredicate::WasHostage => holder.was_sent_as_hostage,
        WinPredicate::UsurpedAtLeast { count } => holder.usurped_leaders >= *count,
    }
}

/// The holder's room and the room of whoever currently holds `character`.
fn rooms_of(
    holder: &Player,
    character: &crate::domain::CharacterId,
    game: &Game,
) -> Option<(crate::domain::RoomId, crate::domain::RoomId)> {
    let own = holder.current_room?;
    let other = game
        .players
        .values()
        .find(|p| p.current_role.as_ref() == Some(character))?
        .current_room?;
    Some((own, other))
}
