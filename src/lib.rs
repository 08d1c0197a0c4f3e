//! combatd - encounter combat engine
//!
//! Tracks initiative, turns, hit points, conditions and death saves for
//! tabletop RPG encounters. Campaign data lives elsewhere and is reached
//! through the `Roster` trait.

pub mod combat;
pub mod config;
pub mod script;

pub use combat::{CombatError, CombatManager, Roster};
pub use config::Config;
