//! Connection tracking: subscribe with replay, disconnect, reconnect.

use time::OffsetDateTime;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;
use uuid::Uuid;

use super::GameFlowService;
use crate::domain::ids::{GameId, PlayerId};
use crate::domain::ConnectionStatus;
use crate::error::AppError;
use crate::events::types::{EventRecord, GameEvent, Scope};
use crate::protocol::CommandOutcome;

/// A live event subscription handed to the transport.
pub struct EventSubscription {
    pub token: Uuid,
    pub receiver: UnboundedReceiver<EventRecord>,
}

impl GameFlowService {
    /// Attach an observer for `player_id`.
    ///
    /// Every retained journal entry newer than `acked_seq` whose scope
    /// matches is drained into the mailbox, in order, before any live
    /// event. An acknowledgement ahead of the journal is answered with a
    /// `DESYNC_DETECTED` event instead of silence.
    pub async fn subscribe(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        acked_seq: u64,
    ) -> Result<EventSubscription, AppError> {
        let handle = self.state.store.require(game_id)?;
        let mut game = handle.lock().await;
        game.require_player(player_id)?;

        let head_seq = game.bus.head_seq();
        let (token, receiver) = game.subscribe(player_id, acked_seq.min(head_seq));

        {
            let player = game.require_player_mut(player_id)?;
            player.connection.status = ConnectionStatus::Connected;
            player.connection.token = Some(token);
            player.connection.acked_seq = acked_seq.min(head_seq);
            player.connection.last_seen = OffsetDateTime::now_utc();
        }
        game.touch();

        if acked_seq > head_seq {
            game.publish(
                Scope::player(player_id),
                GameEvent::DesyncDetected {
                    acked_seq,
                    head_seq,
                },
            );
        }
        game.publish(Scope::player(player_id), GameEvent::Connected { player_id });

        Ok(EventSubscription { token, receiver })
    }

    /// Transport lost the player. Phase never changes; the seat stays.
    pub async fn disconnect(
        &self,
        game_id: GameId,
        player_id: PlayerId,
    ) -> Result<CommandOutcome, AppError> {
        let handle = self.state.store.require(game_id)?;
        let mut game = handle.lock().await;
        self.mark_disconnected(&mut game, player_id)?;
        Ok(CommandOutcome::empty())
    }

    /// Transport re-authenticated the player: bind a fresh subscription,
    /// replay what they missed, and push their private view.
    pub async fn reconnect(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        acked_seq: u64,
    ) -> Result<EventSubscription, AppError> {
        let subscription = self.subscribe(game_id, player_id, acked_seq).await?;

        let handle = self.state.store.require(game_id)?;
        let mut game = handle.lock().await;
        game.publish(Scope::Public, GameEvent::PlayerReconnected { player_id });
        self.sync_private_view(&mut game, player_id);
        info!(game_id = %game.id, player_id = %player_id, "Player reconnected");

        Ok(subscription)
    }
}
