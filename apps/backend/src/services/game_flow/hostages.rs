//! Hostage selection, the parlay window, and the exchange.

use std::time::Instant;

use tracing::{debug, info};

use super::GameFlowService;
use crate::domain::game::Game;
use crate::domain::ids::{GameId, PlayerId, RoomId};
use crate::domain::rules::hostage_count;
use crate::domain::timer::TimerState;
use crate::error::AppError;
use crate::errors::domain::DomainError;
use crate::errors::error_code::ErrorCode;
use crate::events::types::{GameEvent, RoundEndReason, Scope};
use crate::protocol::CommandOutcome;
use crate::services::ability::EngineTrigger;
use crate::validation;

impl GameFlowService {
    /// SELECT_HOSTAGE: toggle a candidate. Selecting an already selected
    /// player removes them; adding past the required count is rejected.
    pub async fn select_hostage(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        room: RoomId,
        target: PlayerId,
    ) -> Result<CommandOutcome, AppError> {
        let handle = self.state.store.require(game_id)?;
        let mut game = handle.lock().await;

        validation::require_leader(&game, room, player_id)?;
        require_hostage_selection_open(&game, room)?;

        let required = hostage_count(game.players.len(), game.state.current_round) as usize;

        let already_selected = game
            .state
            .rooms
            .get(room)
            .hostage_candidates
            .contains(&target);
        let (selected, count) = if already_selected {
            let state = game.state.rooms.get_mut(room);
            state.hostage_candidates.retain(|id| *id != target);
            (false, state.hostage_candidates.len())
        } else {
            validation::validate_hostage_target(&game, room, target)?;
            let state = game.state.rooms.get_mut(room);
            if state.hostage_candidates.len() >= required {
                return Err(AppError::validation(
                    ErrorCode::HostageLimitReached,
                    format!("this round sends {required} hostage(s); deselect one first"),
                ));
            }
            state.hostage_candidates.push(target);
            (true, state.hostage_candidates.len())
        };

        game.touch();
        game.publish(
            Scope::room(room),
            GameEvent::HostageSelected {
                room,
                player_id: target,
                selected,
                count,
                required,
            },
        );
        Ok(CommandOutcome::empty())
    }

    /// LOCK_HOSTAGES: freeze the room's selection. When both rooms are
    /// locked the parlay begins automatically.
    pub async fn lock_hostages(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        room: RoomId,
    ) -> Result<CommandOutcome, AppError> {
        let handle = self.state.store.require(game_id)?;
        let mut game = handle.lock().await;

        validation::require_leader(&game, room, player_id)?;
        require_hostage_selection_open(&game, room)?;

        let required = hostage_count(game.players.len(), game.state.current_round) as usize;
        let count = game.state.rooms.get(room).hostage_candidates.len();
        if count != required {
            return Err(AppError::validation(
                ErrorCode::HostageCountMismatch,
                format!("{count} of {required} hostages selected"),
            ));
        }

        game.state.rooms.get_mut(room).hostages_locked = true;
        game.touch();
        game.publish(Scope::room(room), GameEvent::HostagesLocked { room });
        info!(game_id = %game.id, %room, count, "Hostages locked");

        let both_locked = [RoomId::A, RoomId::B]
            .iter()
            .all(|r| game.state.rooms.get(*r).hostages_locked);
        if both_locked {
            self.start_parlay(&mut game)?;
        }
        Ok(CommandOutcome::empty())
    }

    /// Both rooms are locked: open the leaders' parlay window.
    fn start_parlay(&self, game: &mut Game) -> Result<(), DomainError> {
        let leader_a = game
            .state
            .rooms
            .get(RoomId::A)
            .leader
            .ok_or_else(|| DomainError::internal("parlay without a room A leader"))?;
        let leader_b = game
            .state
            .rooms
            .get(RoomId::B)
            .leader
            .ok_or_else(|| DomainError::internal("parlay without a room B leader"))?;

        game.state.parlay_active = true;
        let duration = self.state.settings.parlay_duration;
        let generation = game.state.parlay_timer.start(duration, Instant::now());
        game.touch();
        game.publish(
            Scope::Public,
            GameEvent::ParlayStarted { leader_a, leader_b },
        );
        info!(game_id = %game.id, duration_secs = duration.as_secs(), "Parlay started");

        let service = self.clone();
        let game_id = game.id;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            service.on_parlay_expired(game_id, generation).await;
        });
        Ok(())
    }

    /// Scheduled callback for parlay expiry.
    async fn on_parlay_expired(&self, game_id: GameId, generation: u64) {
        let Some(handle) = self.state.store.get(game_id) else {
            return;
        };
        let mut game = handle.lock().await;

        let timer = &game.state.parlay_timer;
        if timer.generation() != generation
            || timer.state() != TimerState::Running
            || !game.state.parlay_active
        {
            return;
        }

        if let Err(err) = self.exchange_hostages(&mut game) {
            tracing::error!(game_id = %game.id, error = %err, "Hostage exchange failed");
        }
    }

    /// Atomically swap the locked hostages between the rooms, then close
    /// the round.
    fn exchange_hostages(&self, game: &mut Game) -> Result<(), DomainError> {
        game.state.parlay_timer.stop();
        game.state.parlay_active = false;
        game.touch();
        game.publish(Scope::Public, GameEvent::ParlayEnded);

        let to_room_b = game.state.rooms.get(RoomId::A).hostage_candidates.clone();
        let to_room_a = game.state.rooms.get(RoomId::B).hostage_candidates.clone();

        for (movers, from, to) in [
            (&to_room_b, RoomId::A, RoomId::B),
            (&to_room_a, RoomId::B, RoomId::A),
        ] {
            for player_id in movers {
                let player = game.require_player_mut(*player_id)?;
                player.current_room = Some(to);
                player.was_sent_as_hostage = true;
                game.state
                    .rooms
                    .get_mut(from)
                    .members
                    .retain(|id| id != player_id);
                game.state.rooms.get_mut(to).members.push(*player_id);
            }
        }

        for room_id in [RoomId::A, RoomId::B] {
            let state = game.state.rooms.get_mut(room_id);
            state.hostage_candidates.clear();
            state.hostages_locked = false;
        }
        game.state.paused = false;
        game.state.pause_reason = None;
        game.touch();
        game.publish(
            Scope::Public,
            GameEvent::HostagesExchanged {
                to_room_a: to_room_a.clone(),
                to_room_b: to_room_b.clone(),
            },
        );
        debug!(
            game_id = %game.id,
            moved_to_a = to_room_a.len(),
            moved_to_b = to_room_b.len(),
            "Hostages exchanged"
        );

        let mut winners = Vec::new();
        for mover in to_room_a.iter().chain(to_room_b.iter()) {
            let outcome = self.fire_trigger(game, EngineTrigger::BecameHostage { player: *mover });
            for team in outcome.winning_teams {
                if !winners.contains(&team) {
                    winners.push(team);
                }
            }
        }
        if !winners.is_empty() {
            return self.force_resolution(game, winners);
        }

        self.end_round(game, RoundEndReason::HostagesExchanged)
    }
}

/// Hostage commands are only legal after the round clock has run out and
/// before the room locks.
fn require_hostage_selection_open(game: &Game, room: RoomId) -> Result<(), DomainError> {
    if !game.state.phase.is_round() {
        return Err(DomainError::validation(
            ErrorCode::PhaseMismatch,
            "hostage selection happens during a round",
        ));
    }
    if !game.state.paused || game.state.round_timer.state() != TimerState::Stopped {
        return Err(DomainError::validation(
            ErrorCode::InvalidState,
            "hostage selection opens when the round timer expires",
        ));
    }
    if game.state.rooms.get(room).hostages_locked {
        return Err(DomainError::validation(
            ErrorCode::InvalidState,
            "this room has already locked its hostages",
        ));
    }
    Ok(())
}
