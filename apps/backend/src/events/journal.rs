//! Append-only per-game event journal.

use std::collections::VecDeque;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::events::types::{EventRecord, GameEvent, Scope};

/// Oldest entries may be truncated past this bound; replay is only
/// guaranteed for the most recent window.
pub const RETAINED_EVENTS: usize = 1000;

/// Per-game sequence of scoped events. Sequence numbers are gapless and
/// start at 1; past entries are never mutated.
#[derive(Debug, Default)]
pub struct EventJournal {
    entries: VecDeque<EventRecord>,
    last_seq: u64,
}

impl EventJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the next sequence number and append. Returns the stored
    /// record for fan-out.
    pub fn append(&mut self, scope: Scope, event: GameEvent, now: OffsetDateTime) -> EventRecord {
        self.last_seq += 1;
        let record = EventRecord {
            event_id: Uuid::new_v4(),
            sequence_number: self.last_seq,
            scope,
            event,
            timestamp: now,
        };
        self.entries.push_back(record.clone());
        while self.entries.len() > RETAINED_EVENTS {
            self.entries.pop_front();
        }
        record
    }

    /// Highest sequence number ever assigned (0 before the first event).
    pub fn head_seq(&self) -> u64 {
        self.last_seq
    }

    /// Entries with `sequence_number > since`, oldest first.
    pub fn since(&self, since: u64) -> impl Iterator<Item = &EventRecord> {
        self.entries
            .iter()
            .filter(move |record| record.sequence_number > since)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
