//! Character card model.
//!
//! Characters are pure data: the core never interprets an ability beyond
//! handing it to the ability engine, and win conditions are typed
//! predicates evaluated only at resolution.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::ids::PlayerId;

/// Identifier of a character card in the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(String);

impl CharacterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CharacterId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Team colour carried on every character card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Team {
    Blue,
    Red,
    Grey,
    Green,
    Purple,
    Black,
    Pink,
}

/// Role of a character within its team.
///
/// At most one `Primary` exists per protagonist/antagonist side; a deck is
/// only valid when every primary is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CharacterClass {
    Primary,
    Backup,
    Regular,
}

/// When an ability is considered for evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AbilityTrigger {
    RoundStart,
    RoundEnd,
    CardShare,
    ColorShare,
    PrivateReveal,
    PublicReveal,
    BecomeHostage,
    Manual,
    Resolution,
}

/// What kind of effect an ability produces when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AbilityEffectKind {
    ApplyCondition,
    RemoveCondition,
    ForceReveal,
    SwapCard,
    EndRoundEarly,
    InstantWin,
}

/// Who an ability may target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Targeting {
    SelfOnly,
    SameRoom,
    OtherRoom,
    AnyPlayer,
    Team(Team),
}

/// A single ability, carried as data on a character card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    pub name: String,
    pub trigger: AbilityTrigger,
    pub effect: AbilityEffectKind,
    pub targeting: Targeting,
    /// How many times the ability may fire per game; `None` is unlimited.
    pub usage_limit: Option<u8>,
    /// Conditions the owner must carry for the ability to fire.
    pub conditions: Vec<String>,
    #[serde(default)]
    pub params: HashMap<String, serde_json::Value>,
    /// Deterministic ordering when several abilities fire on one trigger.
    pub priority: i32,
}

/// Typed win predicate evaluated at resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WinPredicate {
    /// Holder ends the game in the same room as the named character.
    SameRoomAs { character: CharacterId },
    /// Holder ends the game in a different room from the named character.
    DifferentRoomFrom { character: CharacterId },
    /// Holder was relocated as a hostage at least once.
    WasHostage,
    /// Holder usurped at least `count` leaders.
    UsurpedAtLeast { count: u32 },
}

/// A win condition carried on a character card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinCondition {
    pub predicate: WinPredicate,
    /// Lower priority values are evaluated first.
    pub priority: i32,
    /// When true, a satisfied predicate ends evaluation and decides the
    /// winning team regardless of the team-victory default.
    pub overrides_team_victory: bool,
}

/// Immutable definition of one character card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterDef {
    pub id: CharacterId,
    pub name: String,
    pub team: Team,
    pub class: CharacterClass,
    pub description: String,
    /// 1 (simplest) to 5 (most involved).
    pub complexity: u8,
    /// Character ids that must also be in the deck.
    #[serde(default)]
    pub requires: BTreeSet<CharacterId>,
    /// Character ids that may not share a deck with this card.
    #[serde(default)]
    pub mutually_exclusive: BTreeSet<CharacterId>,
    #[serde(default)]
    pub abilities: Vec<Ability>,
    #[serde(default)]
    pub win_conditions: Vec<WinCondition>,
}

/// The display projection of a card sent to the one player holding it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleCard {
    pub character_id: CharacterId,
    pub name: String,
    pub description: String,
    pub team: Team,
}

impl RoleCard {
    pub fn from_def(def: &CharacterDef) -> Self {
        Self {
            character_id: def.id.clone(),
            name: def.name.clone(),
            description: def.description.clone(),
            team: def.team,
        }
    }
}

/// A piece of information a player has learned through shares and reveals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KnownInformation {
    Card {
        player_id: PlayerId,
        character_id: CharacterId,
    },
    Color {
        player_id: PlayerId,
        team: Team,
    },
}
