//! In-memory store of live games.
//!
//! The store hands out `GameHandle`s; the mutex inside each handle is what
//! enforces the single-writer rule for a game. The store itself is shared
//! freely across tasks.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::domain::game::Game;
use crate::domain::ids::GameId;
use crate::domain::phase::Phase;
use crate::errors::domain::DomainError;
use crate::errors::error_code::ErrorCode;
use crate::utils::room_code::{generate_room_code, normalize_code};

/// Collisions tolerated before code generation fails fast.
const MAX_CODE_ATTEMPTS: usize = 100;

/// Shared, lock-guarded handle to one game.
pub type GameHandle = Arc<Mutex<Game>>;

/// Concurrent map of live games, addressable by id and by room code.
#[derive(Debug, Default)]
pub struct GameStore {
    games: DashMap<GameId, GameHandle>,
    codes: DashMap<String, GameId>,
}

impl GameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a game with a freshly allocated unique room code.
    pub fn create_game(&self, host_name: String) -> Result<GameHandle, DomainError> {
        let code = self.allocate_code()?;
        let game = Game::new(code.clone(), host_name);
        let id = game.id;
        let handle: GameHandle = Arc::new(Mutex::new(game));

        self.codes.insert(code.clone(), id);
        self.games.insert(id, handle.clone());

        info!(game_id = %id, code = %code, "Game created");
        Ok(handle)
    }

    /// Reserve a code not used by any live game.
    fn allocate_code(&self) -> Result<String, DomainError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_room_code();
            // DashMap entry insertion is atomic, so two concurrent creates
            // cannot both win the same code.
            match self.codes.entry(code.clone()) {
                dashmap::mapref::entry::Entry::Occupied(_) => continue,
                dashmap::mapref::entry::Entry::Vacant(slot) => {
                    // Placeholder id; overwritten by create_game right after.
                    slot.insert(GameId::new());
                    return Ok(code);
                }
            }
        }
        Err(DomainError::conflict(
            ErrorCode::RoomCodeExhausted,
            format!("no unique room code after {MAX_CODE_ATTEMPTS} attempts"),
        ))
    }

    pub fn get(&self, id: GameId) -> Option<GameHandle> {
        self.games.get(&id).map(|entry| entry.value().clone())
    }

    pub fn require(&self, id: GameId) -> Result<GameHandle, DomainError> {
        self.get(id).ok_or_else(|| {
            DomainError::not_found(crate::errors::NotFoundKind::Game, format!("game {id}"))
        })
    }

    /// Case-insensitive lookup by room code.
    pub fn get_by_code(&self, code: &str) -> Option<GameHandle> {
        let code = normalize_code(code);
        let id = *self.codes.get(&code)?;
        self.get(id)
    }

    pub fn require_by_code(&self, code: &str) -> Result<GameHandle, DomainError> {
        self.get_by_code(code).ok_or_else(|| {
            DomainError::not_found(
                crate::errors::NotFoundKind::Game,
                format!("no live game with code {}", normalize_code(code)),
            )
        })
    }

    /// Drop a game and free its code.
    pub fn remove(&self, id: GameId) {
        if self.games.remove(&id).is_some() {
            // The code index maps code -> id; scan is fine at this scale.
            self.codes.retain(|_, mapped| *mapped != id);
            debug!(game_id = %id, "Game removed from store");
        }
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Remove every FINISHED game whose last mutation is older than
    /// `retention`. Returns how many games were reaped.
    pub async fn reap_finished(&self, retention: Duration) -> usize {
        let now = OffsetDateTime::now_utc();
        let mut expired = Vec::new();

        for entry in self.games.iter() {
            let game = entry.value().lock().await;
            if game.state.phase == Phase::Finished && now - game.updated_at >= retention {
                expired.push(game.id);
            }
        }

        for id in &expired {
            self.remove(*id);
        }

        if !expired.is_empty() {
            info!(
                reaped = expired.len(),
                remaining = self.games.len(),
                "Reaped finished games"
            );
        }
        expired.len()
    }

    /// Background task that reaps on an interval until the store is dropped.
    pub fn spawn_reaper(
        self: &Arc<Self>,
        retention: Duration,
        interval: Duration,
    ) -> JoinHandle<()> {
        let store = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    break;
                };
                store.reap_finished(retention).await;
            }
        })
    }
}
