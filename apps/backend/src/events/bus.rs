//! Scoped fan-out over the per-game journal.
//!
//! Subscriptions are typed to a player; scope matching for room events is
//! resolved against room membership at publish time (live delivery) or at
//! subscribe time (replay), never against the membership that held when an
//! entry was written.

use std::collections::HashMap;

use time::OffsetDateTime;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

use crate::domain::game::Rooms;
use crate::domain::ids::PlayerId;
use crate::events::journal::EventJournal;
use crate::events::types::{EventRecord, GameEvent, Scope};

/// One live observer mailbox.
#[derive(Debug)]
struct Subscriber {
    player_id: PlayerId,
    sender: UnboundedSender<EventRecord>,
}

/// Journal plus live subscribers for a single game. Owned by the game's
/// single-writer executor; all mutation happens under the game lock.
#[derive(Debug, Default)]
pub struct GameBus {
    journal: EventJournal,
    subscribers: HashMap<Uuid, Subscriber>,
}

impl GameBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn journal(&self) -> &EventJournal {
        &self.journal
    }

    /// Append to the journal and deliver to every matching subscriber.
    ///
    /// Subscribers whose receiver has gone away are pruned here.
    pub fn publish(
        &mut self,
        scope: Scope,
        event: GameEvent,
        rooms: &Rooms,
        now: OffsetDateTime,
    ) -> EventRecord {
        let record = self.journal.append(scope, event, now);
        self.subscribers.retain(|_, subscriber| {
            if !visible_to(&record.scope, subscriber.player_id, rooms) {
                return true;
            }
            subscriber.sender.send(record.clone()).is_ok()
        });
        record
    }

    /// Register a mailbox for `player_id`, first draining every retained
    /// journal entry newer than `acked_seq` whose scope matches, in order.
    pub fn subscribe(
        &mut self,
        player_id: PlayerId,
        acked_seq: u64,
        rooms: &Rooms,
    ) -> (Uuid, UnboundedReceiver<EventRecord>) {
        let (sender, receiver) = mpsc::unbounded_channel();

        for record in self.journal.since(acked_seq) {
            if visible_to(&record.scope, player_id, rooms) {
                // Receiver is held by the caller; send cannot fail here.
                let _ = sender.send(record.clone());
            }
        }

        let token = Uuid::new_v4();
        self.subscribers.insert(token, Subscriber { player_id, sender });
        (token, receiver)
    }

    pub fn unsubscribe(&mut self, token: Uuid) {
        self.subscribers.remove(&token);
    }

    /// Highest sequence number assigned so far.
    pub fn head_seq(&self) -> u64 {
        self.journal.head_seq()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

fn visible_to(scope: &Scope, player_id: PlayerId, rooms: &Rooms) -> bool {
    match scope {
        Scope::Public => true,
        Scope::Player { player_id: target } => *target == player_id,
        Scope::Room { room } => rooms.get(*room).members.contains(&player_id),
    }
}
