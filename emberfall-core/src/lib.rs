//! Emberfall rules core: combat, progression, and quest tracking for a
//! narrated adventure.
//!
//! The crate is split along one rule: numbers are decided here,
//! synchronously and deterministically given a seed, before any prose
//! is generated. [`session::GameSession`] is the entry point; the
//! modules underneath are pure reducers over character and battle
//! snapshots.

pub mod battle;
pub mod catalog;
pub mod error;
pub mod gateway;
pub mod loot;
pub mod narrate;
pub mod progression;
pub mod quest;
pub mod rolls;
pub mod session;
pub mod stats;
pub mod store;
pub mod testing;
pub mod world;

pub use battle::{Battle, BattleEvent, BattlePhase, PlayerAction, TurnReport};
pub use error::{EngineError, Rejection};
pub use session::{GameSession, SessionConfig};
pub use world::{Character, CharacterClass, CharacterId};
