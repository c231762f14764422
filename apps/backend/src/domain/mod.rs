//! Domain layer: pure game logic types and helpers.

pub mod catalog;
pub mod character;
pub mod game;
pub mod ids;
pub mod phase;
pub mod player;
pub mod roles;
pub mod rules;
pub mod timer;

// Re-exports for ergonomics
pub use catalog::{CatalogError, CharacterCatalog};
pub use character::{
    Ability, AbilityTrigger, CharacterClass, CharacterDef, CharacterId, KnownInformation,
    RoleCard, Team, WinCondition, WinPredicate,
};
pub use game::{Game, GameConfig, PublicGameView, RoomState, Rooms, ShareKind};
pub use ids::{GameId, PlayerId, RoomId};
pub use phase::{next_phase, Phase, TransitionDenied, Trigger};
pub use player::{ConnectionStatus, Player, PlayerPrivateView, PublicPlayerInfo};
pub use roles::{crypto_shuffle, deal_roles, split_rooms};
pub use rules::hostage_count;
pub use timer::{GameTimer, TimerState, TimerView};
