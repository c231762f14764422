//! Role configuration, secret distribution, and room assignment.

use tracing::{debug, info};

use super::GameFlowService;
use crate::domain::character::CharacterId;
use crate::domain::game::Game;
use crate::domain::ids::{GameId, PlayerId, RoomId};
use crate::domain::phase::{Phase, Trigger};
use crate::domain::roles::{deal_roles, split_rooms};
use crate::domain::rules::default_round_durations;
use crate::domain::RoleCard;
use crate::error::AppError;
use crate::errors::domain::DomainError;
use crate::errors::error_code::ErrorCode;
use crate::events::types::{GameEvent, Scope};
use crate::protocol::CommandOutcome;
use crate::validation;

impl GameFlowService {
    /// SELECT_ROLES: host picks the deck. Issued from LOCKED it also opens
    /// role selection.
    pub async fn select_roles(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        roles: Vec<CharacterId>,
    ) -> Result<CommandOutcome, AppError> {
        let handle = self.state.store.require(game_id)?;
        let mut game = handle.lock().await;

        validation::require_host(&game, player_id)?;
        match game.state.phase {
            Phase::Locked => {
                self.apply_transition(&mut game, Trigger::StartRoleSelection)?;
            }
            Phase::RoleSelection => {}
            other => {
                return Err(AppError::validation(
                    ErrorCode::PhaseMismatch,
                    format!("cannot select roles in phase {other:?}"),
                ));
            }
        }

        for id in &roles {
            if !self.state.catalog.contains(id) {
                return Err(AppError::validation(
                    ErrorCode::UnknownCharacter,
                    format!("character {id} is not in the catalogue"),
                ));
            }
        }

        let count = roles.len();
        game.config.selected_roles = roles;
        game.touch();
        game.publish(Scope::Public, GameEvent::RolesSelected { count });
        Ok(CommandOutcome::empty())
    }

    /// SET_ROUNDS: host picks 3 or 5 rounds; durations re-derive from the
    /// default table for the new count.
    pub async fn set_rounds(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        total_rounds: u8,
    ) -> Result<CommandOutcome, AppError> {
        let handle = self.state.store.require(game_id)?;
        let mut game = handle.lock().await;

        validation::require_host(&game, player_id)?;
        if !matches!(game.state.phase, Phase::Locked | Phase::RoleSelection) {
            return Err(AppError::validation(
                ErrorCode::PhaseMismatch,
                "rounds can only change during setup",
            ));
        }
        validation::validate_total_rounds(total_rounds).into_result()?;

        game.config.total_rounds = total_rounds;
        game.config.round_durations = default_round_durations(total_rounds);
        game.touch();
        let bury_card = game.config.bury_card;
        game.publish(
            Scope::Public,
            GameEvent::GameConfigUpdated {
                total_rounds,
                bury_card,
            },
        );
        Ok(CommandOutcome::empty())
    }

    /// Host toggles the buried-card variant during setup.
    pub async fn set_bury_card(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        bury_card: bool,
    ) -> Result<CommandOutcome, AppError> {
        let handle = self.state.store.require(game_id)?;
        let mut game = handle.lock().await;

        validation::require_host(&game, player_id)?;
        if !matches!(game.state.phase, Phase::Locked | Phase::RoleSelection) {
            return Err(AppError::validation(
                ErrorCode::PhaseMismatch,
                "the buried card can only change during setup",
            ));
        }

        game.config.bury_card = bury_card;
        game.touch();
        let total_rounds = game.config.total_rounds;
        game.publish(
            Scope::Public,
            GameEvent::GameConfigUpdated {
                total_rounds,
                bury_card,
            },
        );
        Ok(CommandOutcome::empty())
    }

    /// CONFIRM_ROLES: the full cascade. Validates the deck, deals roles in
    /// secret, then assigns rooms, all under one lock acquisition.
    pub async fn confirm_roles(
        &self,
        game_id: GameId,
        player_id: PlayerId,
    ) -> Result<CommandOutcome, AppError> {
        let handle = self.state.store.require(game_id)?;
        let mut game = handle.lock().await;

        validation::require_host(&game, player_id)?;
        if game.state.phase != Phase::RoleSelection {
            return Err(AppError::validation(
                ErrorCode::PhaseMismatch,
                "roles can only be confirmed during role selection",
            ));
        }

        let warnings =
            validation::validate_role_configuration(&game, &self.state.catalog).into_result()?;

        self.apply_transition(&mut game, Trigger::ConfirmRoles)?;
        self.distribute_roles(&mut game)?;
        self.apply_transition(&mut game, Trigger::RolesDistributed)?;
        self.assign_rooms(&mut game)?;

        info!(game_id = %game.id, players = game.players.len(), "Roles confirmed and distributed");
        Ok(CommandOutcome::with_warnings(warnings))
    }

    /// START_GAME: host launches round 1 once rooms are balanced.
    pub async fn start_game(
        &self,
        game_id: GameId,
        player_id: PlayerId,
    ) -> Result<CommandOutcome, AppError> {
        let handle = self.state.store.require(game_id)?;
        let mut game = handle.lock().await;

        validation::require_host(&game, player_id)?;
        let to = self.apply_transition(&mut game, Trigger::StartGame)?;
        debug_assert_eq!(to, Phase::Round { round: 1 });
        self.begin_round(&mut game, 1);
        Ok(CommandOutcome::empty())
    }

    /// Shuffle the deck with OS randomness and deal one card per player.
    ///
    /// The mapping lands in private state and in per-player events only;
    /// nothing wider ever carries it, so not even the host can see another
    /// player's card.
    fn distribute_roles(&self, game: &mut Game) -> Result<(), DomainError> {
        let player_ids = game.sorted_player_ids();
        let deal = deal_roles(
            &player_ids,
            &game.config.selected_roles,
            game.config.bury_card,
        )?;

        game.state.private.deck = deal.shuffled_deck;
        game.state.private.buried_card = deal.buried;

        for (player_id, character_id) in &deal.assignments {
            let def = self.state.catalog.get(character_id).ok_or_else(|| {
                DomainError::internal(format!("dealt character {character_id} not in catalogue"))
            })?;
            let card = RoleCard::from_def(def);

            let player = game.require_player_mut(*player_id)?;
            player.current_role = Some(character_id.clone());
            player.original_role = Some(character_id.clone());
            game.state
                .private
                .role_assignments
                .insert(*player_id, character_id.clone());
            game.touch();
            game.publish(
                Scope::player(*player_id),
                GameEvent::RoleAssigned { role: card },
            );
        }

        debug!(
            game_id = %game.id,
            dealt = deal.assignments.len(),
            buried = game.state.private.buried_card.is_some(),
            "Roles distributed"
        );
        Ok(())
    }

    /// Shuffle the players and split them across the two rooms.
    fn assign_rooms(&self, game: &mut Game) -> Result<(), DomainError> {
        let player_ids = game.sorted_player_ids();
        let (room_a, room_b) = split_rooms(&player_ids);

        for (room_id, members) in [(RoomId::A, &room_a), (RoomId::B, &room_b)] {
            for player_id in members {
                game.require_player_mut(*player_id)?.current_room = Some(room_id);
            }
            let room = game.state.rooms.get_mut(room_id);
            room.members = members.to_vec();
        }
        game.touch();

        let assignments: Vec<(PlayerId, RoomId)> = room_a
            .iter()
            .map(|id| (*id, RoomId::A))
            .chain(room_b.iter().map(|id| (*id, RoomId::B)))
            .collect();
        game.publish(Scope::Public, GameEvent::RoomsAssigned { assignments });

        debug!(
            game_id = %game.id,
            room_a = room_a.len(),
            room_b = room_b.len(),
            "Rooms assigned"
        );
        Ok(())
    }
}
