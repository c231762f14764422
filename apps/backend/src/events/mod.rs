//! Per-game event journal and scoped delivery.

pub mod bus;
pub mod journal;
pub mod types;

pub use bus::GameBus;
pub use journal::EventJournal;
pub use types::{ElectionMethod, EventRecord, GameEvent, RoundEndReason, Scope};
