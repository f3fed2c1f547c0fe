//! Error types. `Rejection` is a rule saying "no": the character is
//! left untouched and the player can try something else. `EngineError`
//! additionally covers infrastructure failures around the rules core.

use crate::world::CharacterClass;
use thiserror::Error;

/// A rejected action. Every variant leaves game state exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("not enough MP: need {needed}, have {available}")]
    NotEnoughMp { needed: i32, available: i32 },

    #[error("skill '{0}' is on cooldown this encounter")]
    SkillOnCooldown(String),

    #[error("skill '{0}' does not exist")]
    UnknownSkill(String),

    #[error("skill '{0}' is not known")]
    SkillNotKnown(String),

    #[error("item '{0}' does not exist")]
    UnknownItem(String),

    #[error("item '{0}' is not in the inventory")]
    ItemNotOwned(String),

    #[error("item '{0}' cannot be used that way")]
    ItemNotUsable(String),

    #[error("monster '{0}' does not exist")]
    UnknownMonster(String),

    #[error("quest '{0}' does not exist")]
    UnknownQuest(String),

    #[error("quest '{0}' is already active")]
    QuestAlreadyActive(String),

    #[error("quest '{0}' has already been completed")]
    QuestAlreadyCompleted(String),

    #[error("quest '{0}' is not active")]
    QuestNotActive(String),

    #[error("quest '{0}' still has unmet objectives")]
    QuestNotReady(String),

    #[error("skill '{skill}' can only be used by a {required}")]
    WrongClass {
        skill: String,
        required: CharacterClass,
    },

    #[error("requires level {required}, currently level {current}")]
    LevelTooLow { required: u32, current: u32 },

    #[error("not enough stat points: need {needed}, have {available}")]
    NotEnoughStatPoints { needed: u32, available: u32 },

    #[error("no battle is in progress")]
    NoActiveBattle,

    #[error("a battle is already in progress")]
    BattleInProgress,

    #[error("the battle is already over")]
    BattleAlreadyOver,

    #[error("cannot act while defeated")]
    CharacterDefeated,
}

/// Anything the engine can fail with: a rule rejection, a persistence
/// failure, or a narrator failure.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error("store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("narrator error: {0}")]
    Narrator(#[from] narrator::Error),
}
