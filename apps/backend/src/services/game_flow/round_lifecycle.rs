//! Round lifecycle: start, timers, expiry, end, and resolution.
//!
//! Timers are scheduled one-shot tasks that re-enter the controller and
//! re-acquire the game lock. Every callback is guarded by the timer
//! generation it was armed with, so late fires after a stop, pause, or
//! phase change are no-ops.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::GameFlowService;
use crate::domain::character::Team;
use crate::domain::game::Game;
use crate::domain::ids::{GameId, RoomId};
use crate::domain::phase::{Phase, Trigger};
use crate::domain::timer::TimerState;
use crate::errors::domain::DomainError;
use crate::events::types::{GameEvent, RoundEndReason, Scope};
use crate::services::ability::EngineTrigger;

/// Pause reason shown while leaders pick hostages.
pub(super) const HOSTAGE_SELECTION_REASON: &str = "hostage selection phase";
/// Resume reason when the round-1 timer ignites.
pub(super) const BOTH_LEADERS_REASON: &str = "both leaders elected";

impl GameFlowService {
    /// Enter round `round`: clear per-round state and arm the timer.
    ///
    /// Round 1 waits for both rooms to elect a leader before its timer
    /// runs; later rounds start counting immediately.
    pub(super) fn begin_round(&self, game: &mut Game, round: u8) {
        game.state.current_round = round;
        game.state.paused = false;
        game.state.pause_reason = None;
        game.state.parlay_active = false;
        for room_id in [RoomId::A, RoomId::B] {
            game.state.rooms.get_mut(room_id).clear_round_fields();
        }

        let duration = game.config.round_duration(round);
        let leader_voting = round == 1;
        if leader_voting {
            for room_id in [RoomId::A, RoomId::B] {
                game.state.rooms.get_mut(room_id).leader_voting_active = true;
            }
            game.state.round_timer.prepare(duration);
        } else {
            let generation = game.state.round_timer.start(duration, Instant::now());
            self.spawn_round_timer_tasks(game.id, generation, duration);
        }

        game.touch();
        game.publish(
            Scope::Public,
            GameEvent::RoundStarted {
                round,
                duration_secs: duration.as_secs(),
                leader_voting,
            },
        );
        info!(game_id = %game.id, round, leader_voting, "Round started");

        let outcome = self.fire_trigger(game, EngineTrigger::RoundStart { round });
        if !outcome.winning_teams.is_empty() {
            if let Err(err) = self.force_resolution(game, outcome.winning_teams) {
                warn!(game_id = %game.id, error = %err, "Round-start resolution failed");
            }
        }
    }

    /// Ignite or continue the round timer and schedule its callbacks.
    pub(super) fn resume_round_timer(&self, game: &mut Game, reason: &str) {
        let now = Instant::now();
        let generation = game.state.round_timer.resume(now);
        let remaining = game.state.round_timer.remaining(now);
        self.spawn_round_timer_tasks(game.id, generation, remaining);

        game.touch();
        game.publish(
            Scope::Public,
            GameEvent::GameResumed {
                reason: reason.to_string(),
            },
        );
        debug!(
            game_id = %game.id,
            remaining_secs = remaining.as_secs(),
            reason,
            "Round timer running"
        );
    }

    /// One expiry task plus one ticker, both tied to `generation`.
    fn spawn_round_timer_tasks(&self, game_id: GameId, generation: u64, remaining: Duration) {
        let service = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(remaining).await;
            service.on_round_timer_expired(game_id, generation).await;
        });

        let service = self.clone();
        tokio::spawn(async move {
            service.run_timer_ticker(game_id, generation).await;
        });
    }

    /// Scheduled callback for round-timer expiry.
    fn on_round_timer_expired(
        &self,
        game_id: GameId,
        generation: u64,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            let Some(handle) = self.state.store.get(game_id) else {
                return;
            };
            let mut game = handle.lock().await;

            let timer = &game.state.round_timer;
            if timer.generation() != generation || timer.state() != TimerState::Running {
                // The game advanced past the scheduling point; stay silent.
                return;
            }
            let remaining = timer.remaining(Instant::now());
            if remaining > self.state.settings.tick_interval {
                // Same generation, still running: the sleep woke early. Arm
                // the remainder.
                let service = self.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(remaining).await;
                    service.on_round_timer_expired(game_id, generation).await;
                });
                return;
            }

            self.on_round_expiry(&mut game);
        })
    }

    /// The round clock ran out: freeze the game for hostage selection.
    fn on_round_expiry(&self, game: &mut Game) {
        game.state.round_timer.stop();
        game.state.paused = true;
        game.state.pause_reason = Some(HOSTAGE_SELECTION_REASON.to_string());
        game.touch();
        game.publish(
            Scope::Public,
            GameEvent::GamePaused {
                reason: HOSTAGE_SELECTION_REASON.to_string(),
            },
        );
        info!(game_id = %game.id, round = game.state.current_round, "Round timer expired");
    }

    /// Publish `TIMER_UPDATE` roughly once a second while the timer runs.
    async fn run_timer_ticker(&self, game_id: GameId, generation: u64) {
        let tick = self.state.settings.tick_interval;
        let mut last_published: Option<u64> = None;

        loop {
            tokio::time::sleep(tick).await;
            let Some(handle) = self.state.store.get(game_id) else {
                return;
            };
            let mut game = handle.lock().await;

            let timer = &game.state.round_timer;
            if timer.generation() != generation || timer.state() != TimerState::Running {
                return;
            }
            let view = timer.view(Instant::now());
            if last_published != Some(view.remaining_secs) {
                last_published = Some(view.remaining_secs);
                game.publish(Scope::Public, GameEvent::TimerUpdate { timer: view });
            }
        }
    }

    /// Close the current round and ask the machine where to go next.
    pub(super) fn end_round(
        &self,
        game: &mut Game,
        reason: RoundEndReason,
    ) -> Result<(), DomainError> {
        let round = game.state.current_round;
        game.publish(Scope::Public, GameEvent::RoundEnded { round, reason });
        info!(game_id = %game.id, round, ?reason, "Round ended");

        let outcome = self.fire_trigger(game, EngineTrigger::RoundEnd { round });
        if !outcome.winning_teams.is_empty() {
            return self.force_resolution(game, outcome.winning_teams);
        }

        match self.apply_transition(game, Trigger::RoundComplete)? {
            Phase::Round { round } => {
                self.begin_round(game, round);
                Ok(())
            }
            Phase::Resolution => self.resolve(game, Vec::new()),
            other => Err(DomainError::internal(format!(
                "round_complete led to unexpected phase {other:?}"
            ))),
        }
    }

    /// An ability ended the game mid-round.
    pub(super) fn force_resolution(
        &self,
        game: &mut Game,
        winners: Vec<Team>,
    ) -> Result<(), DomainError> {
        if game.state.phase.is_round() {
            self.apply_transition(game, Trigger::InstantWin)?;
        }
        self.resolve(game, winners)
    }

    /// RESOLUTION: evaluate win conditions, then finish the game.
    pub(super) fn resolve(&self, game: &mut Game, preset: Vec<Team>) -> Result<(), DomainError> {
        let mut winning_teams = preset;
        let outcome = self.fire_trigger(game, EngineTrigger::Resolution);
        for team in outcome.winning_teams {
            if !winning_teams.contains(&team) {
                winning_teams.push(team);
            }
        }

        game.state.round_timer.stop();
        game.state.parlay_timer.stop();

        self.apply_transition(game, Trigger::WinConditionsResolved)?;
        game.publish(
            Scope::Public,
            GameEvent::GameFinished {
                winning_teams: winning_teams.clone(),
            },
        );
        info!(game_id = %game.id, ?winning_teams, "Game finished");
        Ok(())
    }
}
