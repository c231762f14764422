//! Game flow orchestration service - the single public entry point for
//! every external command.
//!
//! The controller composes the validator, the pure phase machine, the
//! round engine, and the event bus. It is the only component that mutates
//! a `Game`, always under the game's own lock.

mod connections;
mod hostages;
mod leadership;
mod lobby;
mod role_setup;
mod round_lifecycle;
mod sharing;

pub use connections::EventSubscription;

use std::sync::Arc;

use crate::domain::character::Team;
use crate::domain::game::Game;
use crate::domain::ids::PlayerId;
use crate::domain::phase::{next_phase, Phase, TransitionDenied, Trigger};
use crate::error::AppError;
use crate::errors::domain::DomainError;
use crate::errors::error_code::ErrorCode;
use crate::events::types::{GameEvent, Scope};
use crate::protocol::{Command, CommandEnvelope, CommandOutcome};
use crate::services::ability::{AbilityEngine, Effect, EngineTrigger, StandardAbilityEngine};
use crate::state::AppState;

/// What a batch of ability effects asked the controller to do next.
#[derive(Debug, Default)]
pub(super) struct EffectOutcome {
    pub winning_teams: Vec<Team>,
    pub end_round_early: bool,
}

/// The controller. Cheap to clone; all state lives behind `Arc`s.
#[derive(Clone)]
pub struct GameFlowService {
    state: Arc<AppState>,
    abilities: Arc<dyn AbilityEngine>,
}

impl GameFlowService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self::with_ability_engine(state, Arc::new(StandardAbilityEngine))
    }

    pub fn with_ability_engine(state: Arc<AppState>, abilities: Arc<dyn AbilityEngine>) -> Self {
        Self { state, abilities }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Dispatch one transport command to its handler.
    pub async fn handle(&self, envelope: CommandEnvelope) -> Result<CommandOutcome, AppError> {
        use Command::*;

        let command = match envelope.command {
            CreateGame { host_name } => return self.create_game(host_name).await,
            JoinGame { code, player_name } => return self.join_game(&code, player_name).await,
            command => command,
        };

        let game_id = envelope.game_id.ok_or_else(|| {
            AppError::validation(ErrorCode::GameNotFound, "command requires a game binding")
        })?;
        let player_id = envelope.player_id.ok_or_else(|| {
            AppError::validation(
                ErrorCode::Unauthorized,
                "command requires an authenticated player",
            )
        })?;

        match command {
            CreateGame { .. } | JoinGame { .. } => unreachable!("handled above"),
            LeaveGame => self.leave_game(game_id, player_id).await,
            LockRoom => self.lock_room(game_id, player_id).await,
            UnlockRoom => self.unlock_room(game_id, player_id).await,
            SelectRoles { roles } => self.select_roles(game_id, player_id, roles).await,
            SetRounds { total_rounds } => {
                self.set_rounds(game_id, player_id, total_rounds).await
            }
            ConfirmRoles => self.confirm_roles(game_id, player_id).await,
            StartGame => self.start_game(game_id, player_id).await,
            NominateLeader { room, candidate_id } => {
                self.nominate_leader(game_id, player_id, room, candidate_id)
                    .await
            }
            InitiateNewLeaderVote { room } => {
                self.initiate_new_leader_vote(game_id, player_id, room).await
            }
            VoteUsurp { room, candidate_id } => {
                self.vote_usurp(game_id, player_id, room, candidate_id).await
            }
            Abdicate { room, successor_id } => {
                self.abdicate(game_id, player_id, room, successor_id).await
            }
            SelectHostage {
                room,
                target_player_id,
            } => {
                self.select_hostage(game_id, player_id, room, target_player_id)
                    .await
            }
            LockHostages { room } => self.lock_hostages(game_id, player_id, room).await,
            CardShare { target_player_id } => {
                self.card_share(game_id, player_id, target_player_id).await
            }
            ColorShare { target_player_id } => {
                self.color_share(game_id, player_id, target_player_id).await
            }
            PrivateReveal { target_player_id } => {
                self.private_reveal(game_id, player_id, target_player_id)
                    .await
            }
            PublicReveal => self.public_reveal(game_id, player_id).await,
            ActivateAbility { ability, targets } => {
                self.activate_ability(game_id, player_id, ability, targets)
                    .await
            }
        }
    }

    /// Run the phase machine and, on success, apply the transition: new
    /// phase, version bump, and a public transition event.
    pub(super) fn apply_transition(
        &self,
        game: &mut Game,
        trigger: Trigger,
    ) -> Result<Phase, DomainError> {
        let from = game.state.phase;
        let to = next_phase(game, trigger).map_err(denied_to_domain)?;
        game.state.phase = to;
        game.touch();
        game.publish(Scope::Public, GameEvent::PhaseChanged { from, to, trigger });
        tracing::debug!(game_id = %game.id, ?from, ?to, ?trigger, "Phase transition");
        Ok(to)
    }

    /// Evaluate the ability engine at a trigger point and apply whatever
    /// it returns.
    pub(super) fn fire_trigger(&self, game: &mut Game, trigger: EngineTrigger) -> EffectOutcome {
        let effects = self.abilities.evaluate(game, &self.state.catalog, &trigger);
        self.apply_effects(game, effects)
    }

    /// Apply engine effects in order, each with its own version bump and
    /// scoped event.
    pub(super) fn apply_effects(&self, game: &mut Game, effects: Vec<Effect>) -> EffectOutcome {
        let mut outcome = EffectOutcome::default();

        for effect in effects {
            match effect {
                Effect::ApplyCondition { player, condition } => {
                    if let Some(target) = game.player_mut(player) {
                        if !target.conditions.contains(&condition) {
                            target.conditions.push(condition);
                        }
                        game.touch();
                        self.sync_private_view(game, player);
                    }
                }
                Effect::RemoveCondition { player, condition } => {
                    if let Some(target) = game.player_mut(player) {
                        target.conditions.retain(|c| c != &condition);
                        game.touch();
                        self.sync_private_view(game, player);
                    }
                }
                Effect::ForceReveal { player } => {
                    let revealed = game.player(player).and_then(|p| {
                        let role = p.current_role.as_ref()?;
                        let team = self.state.catalog.get(role)?.team;
                        Some((p.current_room?, team))
                    });
                    if let Some((room, team)) = revealed {
                        game.touch();
                        game.publish(
                            Scope::room(room),
                            GameEvent::PublicReveal {
                                player_id: player,
                                team,
                            },
                        );
                    }
                }
                Effect::SwapCard { first, second } => {
                    self.swap_cards(game, first, second);
                }
                Effect::EndRoundEarly => {
                    outcome.end_round_early = true;
                }
                Effect::InstantWin { team } => {
                    if !outcome.winning_teams.contains(&team) {
                        outcome.winning_teams.push(team);
                    }
                }
            }
        }

        outcome
    }

    /// Swap two players' current cards and re-deal the role events.
    fn swap_cards(&self, game: &mut Game, first: PlayerId, second: PlayerId) {
        let first_role = game.player(first).and_then(|p| p.current_role.clone());
        let second_role = game.player(second).and_then(|p| p.current_role.clone());
        let (Some(first_role), Some(second_role)) = (first_role, second_role) else {
            return;
        };

        if let Some(player) = game.player_mut(first) {
            player.current_role = Some(second_role.clone());
        }
        if let Some(player) = game.player_mut(second) {
            player.current_role = Some(first_role.clone());
        }
        game.state
            .private
            .role_assignments
            .insert(first, second_role.clone());
        game.state
            .private
            .role_assignments
            .insert(second, first_role.clone());
        game.touch();

        for (player_id, role) in [(first, second_role), (second, first_role)] {
            if let Some(def) = self.state.catalog.get(&role) {
                game.publish(
                    Scope::player(player_id),
                    GameEvent::RoleAssigned {
                        role: crate::domain::RoleCard::from_def(def),
                    },
                );
            }
        }
    }

    /// Act on whatever a trigger's effects demanded: an instant win beats
    /// an early round end.
    pub(super) fn settle_outcome(
        &self,
        game: &mut Game,
        outcome: EffectOutcome,
    ) -> Result<(), DomainError> {
        if !outcome.winning_teams.is_empty() {
            return self.force_resolution(game, outcome.winning_teams);
        }
        if outcome.end_round_early && game.state.phase.is_round() {
            return self.end_round(game, crate::events::RoundEndReason::EndedEarly);
        }
        Ok(())
    }

    /// Push a fresh private view to one player.
    pub(super) fn sync_private_view(&self, game: &mut Game, player_id: PlayerId) {
        if let Ok(view) = game.player_private_view(player_id, &self.state.catalog) {
            game.publish(Scope::player(player_id), GameEvent::StateSync { view });
        }
    }
}

/// Map a typed machine denial onto the error taxonomy.
fn denied_to_domain(denied: TransitionDenied) -> DomainError {
    let code = match &denied {
        TransitionDenied::PlayerCountOutOfRange { count } => {
            if *count < crate::domain::rules::MIN_PLAYERS {
                ErrorCode::InsufficientPlayers
            } else {
                ErrorCode::TooManyPlayers
            }
        }
        TransitionDenied::NoSuchTransition { .. } => ErrorCode::PhaseMismatch,
        _ => ErrorCode::InvalidState,
    };
    DomainError::validation(code, denied.to_string())
}
