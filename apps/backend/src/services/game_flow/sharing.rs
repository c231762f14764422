//! Card shares, colour shares, and reveals.
//!
//! Role-bearing events here are always scoped to a single participant;
//! room and public scopes only ever carry team colours.

use time::OffsetDateTime;
use tracing::debug;

use super::GameFlowService;
use crate::domain::character::{KnownInformation, RoleCard};
use crate::domain::game::{CardShareRecord, Game, ShareKind};
use crate::domain::ids::{GameId, PlayerId};
use crate::error::AppError;
use crate::errors::domain::DomainError;
use crate::errors::error_code::ErrorCode;
use crate::events::types::{GameEvent, Scope};
use crate::protocol::CommandOutcome;
use crate::services::ability::EngineTrigger;
use crate::validation;

impl GameFlowService {
    /// CARD_SHARE: both participants learn each other's full card.
    pub async fn card_share(
        &self,
        game_id: GameId,
        initiator: PlayerId,
        target: PlayerId,
    ) -> Result<CommandOutcome, AppError> {
        let handle = self.state.store.require(game_id)?;
        let mut game = handle.lock().await;

        require_round(&game)?;
        validation::validate_share_target(&game, initiator, target)?;
        let initiator_card = self.require_role_card(&game, initiator)?;
        let target_card = self.require_role_card(&game, target)?;

        self.record_share(&mut game, initiator, target, ShareKind::Card);

        for (learner, subject, card) in [
            (initiator, target, target_card),
            (target, initiator, initiator_card),
        ] {
            remember(&mut game, learner, KnownInformation::Card {
                player_id: subject,
                character_id: card.character_id.clone(),
            });
            game.publish(
                Scope::player(learner),
                GameEvent::CardShared {
                    with_player_id: subject,
                    role: card,
                },
            );
        }
        game.touch();
        debug!(game_id = %game.id, initiator = %initiator, target = %target, "Card share");

        let outcome = self.fire_trigger(&mut game, EngineTrigger::CardShare { initiator, target });
        self.settle_outcome(&mut game, outcome)?;
        Ok(CommandOutcome::empty())
    }

    /// COLOR_SHARE: both participants learn each other's team colour only.
    pub async fn color_share(
        &self,
        game_id: GameId,
        initiator: PlayerId,
        target: PlayerId,
    ) -> Result<CommandOutcome, AppError> {
        let handle = self.state.store.require(game_id)?;
        let mut game = handle.lock().await;

        require_round(&game)?;
        validation::validate_share_target(&game, initiator, target)?;
        let initiator_team = self.require_role_card(&game, initiator)?.team;
        let target_team = self.require_role_card(&game, target)?.team;

        self.record_share(&mut game, initiator, target, ShareKind::Color);

        for (learner, subject, team) in [
            (initiator, target, target_team),
            (target, initiator, initiator_team),
        ] {
            remember(&mut game, learner, KnownInformation::Color {
                player_id: subject,
                team,
            });
            game.publish(
                Scope::player(learner),
                GameEvent::ColorShared {
                    with_player_id: subject,
                    team,
                },
            );
        }
        game.touch();

        let outcome =
            self.fire_trigger(&mut game, EngineTrigger::ColorShare { initiator, target });
        self.settle_outcome(&mut game, outcome)?;
        Ok(CommandOutcome::empty())
    }

    /// PRIVATE_REVEAL: one-way; the target learns the initiator's card.
    pub async fn private_reveal(
        &self,
        game_id: GameId,
        initiator: PlayerId,
        target: PlayerId,
    ) -> Result<CommandOutcome, AppError> {
        let handle = self.state.store.require(game_id)?;
        let mut game = handle.lock().await;

        require_round(&game)?;
        validation::validate_share_target(&game, initiator, target)?;
        let card = self.require_role_card(&game, initiator)?;

        remember(&mut game, target, KnownInformation::Card {
            player_id: initiator,
            character_id: card.character_id.clone(),
        });
        game.touch();
        game.publish(
            Scope::player(target),
            GameEvent::PrivateRevealReceived {
                from_player_id: initiator,
                role: card,
            },
        );

        let outcome =
            self.fire_trigger(&mut game, EngineTrigger::PrivateReveal { initiator, target });
        self.settle_outcome(&mut game, outcome)?;
        Ok(CommandOutcome::empty())
    }

    /// PUBLIC_REVEAL: show the room your team colour. The character id
    /// itself never reaches a room scope.
    pub async fn public_reveal(
        &self,
        game_id: GameId,
        player_id: PlayerId,
    ) -> Result<CommandOutcome, AppError> {
        let handle = self.state.store.require(game_id)?;
        let mut game = handle.lock().await;

        require_round(&game)?;
        let team = self.require_role_card(&game, player_id)?.team;
        let room = game
            .state
            .rooms
            .room_of(player_id)
            .ok_or_else(|| DomainError::validation(ErrorCode::WrongRoom, "player has no room"))?;

        let members = game.state.rooms.get(room).members.clone();
        for member in members {
            if member != player_id {
                remember(&mut game, member, KnownInformation::Color { player_id, team });
            }
        }
        game.touch();
        game.publish(Scope::room(room), GameEvent::PublicReveal { player_id, team });

        let outcome = self.fire_trigger(&mut game, EngineTrigger::PublicReveal { player: player_id });
        self.settle_outcome(&mut game, outcome)?;
        Ok(CommandOutcome::empty())
    }

    /// ACTIVATE_ABILITY: hand the request straight to the ability engine.
    pub async fn activate_ability(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        ability: String,
        targets: Vec<PlayerId>,
    ) -> Result<CommandOutcome, AppError> {
        let handle = self.state.store.require(game_id)?;
        let mut game = handle.lock().await;

        require_round(&game)?;
        game.require_player(player_id)?;

        let outcome = self.fire_trigger(
            &mut game,
            EngineTrigger::Manual {
                player: player_id,
                ability,
                targets,
            },
        );
        self.settle_outcome(&mut game, outcome)?;
        Ok(CommandOutcome::empty())
    }

    fn require_role_card(&self, game: &Game, player_id: PlayerId) -> Result<RoleCard, DomainError> {
        let player = game.require_player(player_id)?;
        let role = player.current_role.as_ref().ok_or_else(|| {
            DomainError::validation(ErrorCode::InvalidState, "player has no assigned role")
        })?;
        let def = self
            .state
            .catalog
            .get(role)
            .ok_or_else(|| DomainError::internal(format!("assigned role {role} not in catalogue")))?;
        Ok(RoleCard::from_def(def))
    }

    fn record_share(&self, game: &mut Game, initiator: PlayerId, target: PlayerId, kind: ShareKind) {
        let round = game.state.current_round;
        game.state.private.card_shares.push(CardShareRecord {
            round,
            initiator,
            target,
            kind,
            at: OffsetDateTime::now_utc(),
        });
    }
}

fn remember(game: &mut Game, learner: PlayerId, info: KnownInformation) {
    if let Some(player) = game.player_mut(learner) {
        if !player.known_information.contains(&info) {
            player.known_information.push(info);
        }
    }
}

fn require_round(game: &Game) -> Result<(), DomainError> {
    if !game.state.phase.is_round() {
        return Err(DomainError::validation(
            ErrorCode::PhaseMismatch,
            "shares and reveals happen during a round",
        ));
    }
    Ok(())
}
