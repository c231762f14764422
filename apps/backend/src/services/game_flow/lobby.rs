//! Lobby commands: create, join, leave, lock, unlock.

use tracing::info;

use super::GameFlowService;
use crate::domain::game::Game;
use crate::domain::ids::{GameId, PlayerId};
use crate::domain::phase::{Phase, Trigger};
use crate::domain::rules::MAX_PLAYERS;
use crate::error::AppError;
use crate::errors::domain::DomainError;
use crate::errors::error_code::ErrorCode;
use crate::events::types::{GameEvent, Scope};
use crate::protocol::{CommandOutcome, CommandResponse};
use crate::validation;

impl GameFlowService {
    /// CREATE_GAME: allocate a code, create the aggregate with its host.
    pub async fn create_game(&self, host_name: String) -> Result<CommandOutcome, AppError> {
        let handle = self.state.store.create_game(host_name)?;
        let mut game = handle.lock().await;

        let host_id = game.host_id();
        let code = game.code.clone();
        game.touch();
        game.publish(
            Scope::Public,
            GameEvent::GameCreated {
                code: code.clone(),
                host_id,
            },
        );

        Ok(CommandOutcome::with_response(CommandResponse::GameCreated {
            game_id: game.id,
            player_id: host_id,
            code,
        }))
    }

    /// JOIN_GAME: add a player to a lobby, addressed by room code.
    pub async fn join_game(
        &self,
        code: &str,
        player_name: String,
    ) -> Result<CommandOutcome, AppError> {
        let handle = self.state.store.require_by_code(code)?;
        let mut game = handle.lock().await;

        if game.state.phase != Phase::Lobby {
            return Err(AppError::validation(
                ErrorCode::PhaseMismatch,
                "the game is no longer accepting players",
            ));
        }
        if game.players.len() >= MAX_PLAYERS {
            return Err(AppError::validation(
                ErrorCode::TooManyPlayers,
                format!("game is full ({MAX_PLAYERS} players)"),
            ));
        }
        let name_taken = game
            .players
            .values()
            .any(|p| p.display_name.eq_ignore_ascii_case(&player_name));
        if name_taken {
            return Err(AppError::validation(
                ErrorCode::NameTaken,
                format!("the name {player_name:?} is already in use"),
            ));
        }

        let player_id = game.add_player(player_name);
        game.touch();
        let info = game
            .require_player(player_id)
            .map_err(AppError::from)?
            .public_info();
        game.publish(Scope::Public, GameEvent::PlayerJoined { player: info });

        info!(game_id = %game.id, player_id = %player_id, "Player joined");
        Ok(CommandOutcome::with_response(CommandResponse::Joined {
            game_id: game.id,
            player_id,
        }))
    }

    /// LEAVE_GAME: removal in the lobby, disconnection afterwards.
    pub async fn leave_game(
        &self,
        game_id: GameId,
        player_id: PlayerId,
    ) -> Result<CommandOutcome, AppError> {
        let handle = self.state.store.require(game_id)?;
        let mut game = handle.lock().await;
        game.require_player(player_id)?;

        if game.state.phase == Phase::Lobby {
            let was_host = game
                .player(player_id)
                .is_some_and(|player| player.is_host);
            game.players.remove(&player_id);
            game.touch();
            game.publish(Scope::Public, GameEvent::PlayerLeft { player_id });

            // A lobby without its host cannot proceed; tear it down.
            if was_host {
                drop(game);
                self.state.store.remove(game_id);
                info!(game_id = %game_id, "Host left; lobby closed");
            }
            return Ok(CommandOutcome::empty());
        }

        // The seat survives: a started game only marks the player gone.
        self.mark_disconnected(&mut game, player_id)?;
        Ok(CommandOutcome::empty())
    }

    /// LOCK_ROOM: host freezes the roster.
    pub async fn lock_room(
        &self,
        game_id: GameId,
        player_id: PlayerId,
    ) -> Result<CommandOutcome, AppError> {
        let handle = self.state.store.require(game_id)?;
        let mut game = handle.lock().await;

        validation::require_host(&game, player_id)?;
        validation::validate_player_count(game.players.len()).into_result()?;

        self.apply_transition(&mut game, Trigger::LockRoom)?;
        game.publish(Scope::Public, GameEvent::RoomLocked);
        info!(game_id = %game.id, players = game.players.len(), "Room locked");
        Ok(CommandOutcome::empty())
    }

    /// UNLOCK_ROOM: host reopens the lobby; denied once roles exist.
    pub async fn unlock_room(
        &self,
        game_id: GameId,
        player_id: PlayerId,
    ) -> Result<CommandOutcome, AppError> {
        let handle = self.state.store.require(game_id)?;
        let mut game = handle.lock().await;

        validation::require_host(&game, player_id)?;
        self.apply_transition(&mut game, Trigger::UnlockRoom)?;
        game.publish(Scope::Public, GameEvent::RoomUnlocked);
        Ok(CommandOutcome::empty())
    }

    /// Shared by LEAVE_GAME after lock and by transport disconnects.
    pub(super) fn mark_disconnected(
        &self,
        game: &mut Game,
        player_id: PlayerId,
    ) -> Result<(), DomainError> {
        let now = time::OffsetDateTime::now_utc();
        let player = game.require_player_mut(player_id)?;
        player.connection.status = crate::domain::ConnectionStatus::Disconnected;
        player.connection.token = None;
        player.connection.last_seen = now;
        let was_leader_of = game
            .player(player_id)
            .and_then(|p| p.is_leader.then(|| p.current_room).flatten());
        game.touch();
        game.publish(Scope::Public, GameEvent::PlayerDisconnected { player_id });

        // No auto-demotion: the room may re-vote if it wants a new leader.
        if let Some(room) = was_leader_of {
            game.publish(
                Scope::room(room),
                GameEvent::LeaderDisconnected { room, player_id },
            );
        }
        Ok(())
    }
}
