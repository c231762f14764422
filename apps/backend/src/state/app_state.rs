//! Shared application state.

use std::sync::Arc;

use crate::config::Settings;
use crate::domain::catalog::CharacterCatalog;
use crate::store::GameStore;

/// Everything the controller needs, shared behind one `Arc`.
pub struct AppState {
    /// Live games. Concurrency-safe; per-game writes serialise on the
    /// game's own mutex.
    pub store: Arc<GameStore>,
    /// Read-only after load.
    pub catalog: Arc<CharacterCatalog>,
    pub settings: Settings,
}

impl AppState {
    pub fn new(catalog: CharacterCatalog) -> Self {
        Self::with_settings(catalog, Settings::default())
    }

    pub fn with_settings(catalog: CharacterCatalog, settings: Settings) -> Self {
        Self {
            store: Arc::new(GameStore::new()),
            catalog: Arc::new(catalog),
            settings,
        }
    }
}
