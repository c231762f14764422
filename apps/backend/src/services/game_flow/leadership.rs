//! Leader elections, ties, usurpation, and abdication.

use std::collections::HashMap;

use serde_json::json;
use tracing::{debug, info};

use super::round_lifecycle::BOTH_LEADERS_REASON;
use super::GameFlowService;
use crate::domain::game::Game;
use crate::domain::ids::{GameId, PlayerId, RoomId};
use crate::domain::roles::pick_random;
use crate::domain::rules::{usurp_threshold, MAX_TIE_COUNT};
use crate::domain::timer::TimerState;
use crate::error::AppError;
use crate::errors::domain::DomainError;
use crate::errors::error_code::ErrorCode;
use crate::events::types::{ElectionMethod, GameEvent, Scope};
use crate::protocol::CommandOutcome;
use crate::validation;

impl GameFlowService {
    /// NOMINATE_LEADER: cast (or change) a vote in an open poll. The vote
    /// that completes the poll resolves it.
    pub async fn nominate_leader(
        &self,
        game_id: GameId,
        voter_id: PlayerId,
        room: RoomId,
        candidate_id: PlayerId,
    ) -> Result<CommandOutcome, AppError> {
        let handle = self.state.store.require(game_id)?;
        let mut game = handle.lock().await;

        require_round(&game)?;
        validation::require_room_member(&game, room, voter_id)?;
        validation::require_room_member(&game, room, candidate_id).map_err(|_| {
            DomainError::validation(
                ErrorCode::MissingTarget,
                "candidate must be a member of the room",
            )
        })?;
        if !game.state.rooms.get(room).leader_voting_active {
            return Err(AppError::validation(
                ErrorCode::VoteNotActive,
                "no leader vote is open in this room",
            ));
        }

        let (votes_cast, votes_needed) = {
            let state = game.state.rooms.get_mut(room);
            state.leader_votes.insert(voter_id, candidate_id);
            (state.leader_votes.len(), state.members.len())
        };
        game.touch();
        game.publish(
            Scope::room(room),
            GameEvent::VoteCast {
                room,
                voter_id,
                candidate_id,
                votes_cast,
                votes_needed,
            },
        );

        if votes_cast == votes_needed {
            self.resolve_leader_poll(&mut game, room)?;
        }
        Ok(CommandOutcome::empty())
    }

    /// All votes are in: elect on a unique maximum, otherwise count the
    /// tie and either re-open or (third tie) pick at random.
    fn resolve_leader_poll(&self, game: &mut Game, room: RoomId) -> Result<(), DomainError> {
        let mut counts: HashMap<PlayerId, usize> = HashMap::new();
        for candidate in game.state.rooms.get(room).leader_votes.values() {
            *counts.entry(*candidate).or_insert(0) += 1;
        }
        let max_votes = counts.values().copied().max().unwrap_or(0);
        let mut winners: Vec<PlayerId> = counts
            .iter()
            .filter(|(_, votes)| **votes == max_votes)
            .map(|(candidate, _)| *candidate)
            .collect();
        winners.sort();

        if winners.len() == 1 {
            self.elect_leader(game, room, winners[0], ElectionMethod::Majority, 0);
            return Ok(());
        }

        let tie_count = {
            let state = game.state.rooms.get_mut(room);
            state.leader_voting_tie_count += 1;
            state.leader_voting_tie_count
        };

        if tie_count >= MAX_TIE_COUNT {
            let winner = pick_random(&winners)
                .ok_or_else(|| DomainError::internal("tied poll with no candidates"))?;
            self.elect_leader(game, room, winner, ElectionMethod::RandomSelection, tie_count);
            return Ok(());
        }

        // Re-open the poll and tell the last voter why their vote did not
        // conclude it.
        game.state.rooms.get_mut(room).clear_votes();
        game.touch();
        game.publish(
            Scope::room(room),
            GameEvent::LeaderVoteTied {
                room,
                tie_count,
                candidates: winners.clone(),
            },
        );
        Err(DomainError::validation_with_suggestion(
            ErrorCode::TiedVote,
            format!("leader vote tied {tie_count} time(s); voting reopened"),
            "coordinate on a single candidate and vote again",
        )
        .with_context(json!({ "tie_count": tie_count, "candidates": winners })))
    }

    /// Seat a leader, however they were chosen, and handle timer ignition.
    pub(super) fn elect_leader(
        &self,
        game: &mut Game,
        room: RoomId,
        leader_id: PlayerId,
        method: ElectionMethod,
        tie_count: u8,
    ) {
        if let Some(previous) = game.state.rooms.get(room).leader {
            if let Some(player) = game.player_mut(previous) {
                player.is_leader = false;
                player.can_be_hostage = true;
            }
        }
        if let Some(player) = game.player_mut(leader_id) {
            player.is_leader = true;
            player.can_be_hostage = false;
        }

        {
            let state = game.state.rooms.get_mut(room);
            state.leader = Some(leader_id);
            state.leader_votes.clear();
            state.leader_voting_tie_count = 0;
            state.leader_voting_active = false;
        }
        game.touch();
        game.publish(
            Scope::room(room),
            GameEvent::LeaderElected {
                room,
                leader_id,
                method,
                tie_count,
            },
        );
        info!(game_id = %game.id, %room, leader_id = %leader_id, ?method, "Leader elected");

        let round = game.state.current_round;
        let timer_paused = game.state.round_timer.state() == TimerState::Paused;
        if round == 1 {
            let both_elected = [RoomId::A, RoomId::B]
                .iter()
                .all(|r| game.state.rooms.get(*r).leader.is_some());
            if both_elected && timer_paused {
                self.resume_round_timer(game, BOTH_LEADERS_REASON);
            }
        } else if timer_paused {
            // Election concluded a mid-round re-vote that paused the clock.
            self.resume_round_timer(game, "leader vote concluded");
        }
    }

    /// INITIATE_NEW_LEADER_VOTE: pause the round and re-open the poll.
    pub async fn initiate_new_leader_vote(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        room: RoomId,
    ) -> Result<CommandOutcome, AppError> {
        let handle = self.state.store.require(game_id)?;
        let mut game = handle.lock().await;

        require_round(&game)?;
        if game.state.current_round <= 1 {
            return Err(AppError::validation(
                ErrorCode::InvalidState,
                "round 1 elects its leaders through the opening vote",
            ));
        }
        validation::require_room_member(&game, room, player_id)?;

        let state = game.state.rooms.get(room);
        if state.leader.is_none() {
            return Err(AppError::validation(
                ErrorCode::NoLeader,
                "there is no leader to replace",
            ));
        }
        if state.leader_voting_active {
            return Err(AppError::validation(
                ErrorCode::VoteAlreadyActive,
                "a leader vote is already open",
            ));
        }

        game.state.round_timer.pause(std::time::Instant::now());
        {
            let state = game.state.rooms.get_mut(room);
            state.leader_voting_active = true;
            state.leader_votes.clear();
            state.leader_voting_tie_count = 0;
        }
        game.touch();
        game.publish(Scope::room(room), GameEvent::LeaderVoteStarted { room });
        debug!(game_id = %game.id, %room, "Leader re-vote opened; round timer paused");
        Ok(CommandOutcome::empty())
    }

    /// VOTE_USURP: the alternate path to the chair. A strict majority for
    /// one candidate replaces the leader immediately.
    pub async fn vote_usurp(
        &self,
        game_id: GameId,
        voter_id: PlayerId,
        room: RoomId,
        candidate_id: PlayerId,
    ) -> Result<CommandOutcome, AppError> {
        let handle = self.state.store.require(game_id)?;
        let mut game = handle.lock().await;

        require_round(&game)?;
        validation::require_room_member(&game, room, voter_id)?;
        validation::require_room_member(&game, room, candidate_id).map_err(|_| {
            DomainError::validation(
                ErrorCode::MissingTarget,
                "usurp candidate must be a member of the room",
            )
        })?;
        let Some(current_leader) = game.state.rooms.get(room).leader else {
            return Err(AppError::validation(
                ErrorCode::NoLeader,
                "nobody holds the chair to usurp",
            ));
        };
        if candidate_id == current_leader {
            return Err(AppError::validation(
                ErrorCode::MissingTarget,
                "the current leader cannot usurp themselves",
            ));
        }

        let threshold = usurp_threshold(game.state.rooms.get(room).members.len());
        let (votes_for_candidate, votes_cast) = {
            let state = game.state.rooms.get_mut(room);
            state.usurp_votes.insert(voter_id, candidate_id);
            let for_candidate = state
                .usurp_votes
                .values()
                .filter(|c| **c == candidate_id)
                .count();
            (for_candidate, state.usurp_votes.len())
        };
        game.touch();
        game.publish(
            Scope::room(room),
            GameEvent::VoteCast {
                room,
                voter_id,
                candidate_id,
                votes_cast,
                votes_needed: threshold,
            },
        );

        if votes_for_candidate >= threshold {
            self.usurp(&mut game, room, current_leader, candidate_id);
        }
        Ok(CommandOutcome::empty())
    }

    fn usurp(&self, game: &mut Game, room: RoomId, old_leader: PlayerId, new_leader: PlayerId) {
        if let Some(player) = game.player_mut(old_leader) {
            player.is_leader = false;
            player.can_be_hostage = true;
        }
        if let Some(player) = game.player_mut(new_leader) {
            player.is_leader = true;
            player.can_be_hostage = false;
            player.usurped_leaders += 1;
        }
        {
            let state = game.state.rooms.get_mut(room);
            state.leader = Some(new_leader);
            state.usurp_votes.clear();
        }
        let round = game.state.current_round;
        game.state
            .private
            .usurpations
            .entry(round)
            .or_default()
            .push(new_leader);
        game.touch();
        game.publish(
            Scope::room(room),
            GameEvent::LeaderUsurped {
                room,
                old_leader_id: old_leader,
                new_leader_id: new_leader,
            },
        );
        info!(game_id = %game.id, %room, old = %old_leader, new = %new_leader, "Leader usurped");
    }

    /// ABDICATE: the leader hands the chair to a successor in their room.
    pub async fn abdicate(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        room: RoomId,
        successor_id: PlayerId,
    ) -> Result<CommandOutcome, AppError> {
        let handle = self.state.store.require(game_id)?;
        let mut game = handle.lock().await;

        require_round(&game)?;
        validation::require_leader(&game, room, player_id)?;
        validation::require_room_member(&game, room, successor_id).map_err(|_| {
            DomainError::validation(
                ErrorCode::MissingTarget,
                "successor must be a member of the room",
            )
        })?;
        if successor_id == player_id {
            return Err(AppError::validation(
                ErrorCode::MissingTarget,
                "cannot abdicate to yourself",
            ));
        }

        if let Some(player) = game.player_mut(player_id) {
            player.is_leader = false;
            player.can_be_hostage = true;
        }
        if let Some(player) = game.player_mut(successor_id) {
            player.is_leader = true;
            player.can_be_hostage = false;
        }
        game.state.rooms.get_mut(room).leader = Some(successor_id);
        game.touch();
        game.publish(
            Scope::room(room),
            GameEvent::LeaderAbdicated {
                room,
                old_leader_id: player_id,
                new_leader_id: successor_id,
            },
        );
        info!(game_id = %game.id, %room, old = %player_id, new = %successor_id, "Leader abdicated");
        Ok(CommandOutcome::empty())
    }
}

/// Leadership commands only exist inside a round.
fn require_round(game: &Game) -> Result<(), DomainError> {
    if !game.state.phase.is_round() {
        return Err(DomainError::validation(
            ErrorCode::PhaseMismatch,
            "this command is only valid during a round",
        ));
    }
    Ok(())
}
