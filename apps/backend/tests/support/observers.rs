//! Event-subscription helpers.

use backend::domain::ids::PlayerId;
use backend::events::EventRecord;
use backend::services::game_flow::EventSubscription;

use super::game_setup::TestGame;

impl TestGame {
    /// Subscribe an observer mailbox for one player.
    pub async fn observe(&self, player_id: PlayerId) -> EventSubscription {
        self.observe_since(player_id, 0).await
    }

    pub async fn observe_since(&self, player_id: PlayerId, acked_seq: u64) -> EventSubscription {
        self.service
            .subscribe(self.game_id, player_id, acked_seq)
            .await
            .expect("subscribe")
    }

    /// Everything currently journaled, for whole-journal assertions.
    pub async fn journal(&self) -> Vec<EventRecord> {
        let handle = self
            .service
            .state()
            .store
            .require(self.game_id)
            .expect("game in store");
        let game = handle.lock().await;
        game.bus.journal().since(0).cloned().collect()
    }
}

/// Pop every event currently queued in a mailbox.
pub fn drain(subscription: &mut EventSubscription) -> Vec<EventRecord> {
    let mut records = Vec::new();
    while let Ok(record) = subscription.receiver.try_recv() {
        records.push(record);
    }
    records
}
