//! Services: the controller and the ability-engine contract.

pub mod ability;
pub mod game_flow;

pub use ability::{AbilityEngine, Effect, EngineTrigger, StandardAbilityEngine};
pub use game_flow::{EventSubscription, GameFlowService};
