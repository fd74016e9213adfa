use thiserror::Error;

/// A rejected player action. Rejection never changes battle state; the caller
/// re-prompts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("the battle is already over")]
    BattleOver,
    #[error("it is not a party member's turn")]
    NotPlayerTurn,
    #[error("no skill is waiting for a target")]
    NoTargetPending,
    #[error("skill slot {index} does not exist")]
    UnknownSkill { index: usize },
    #[error("{skill} is on cooldown for {remaining} more round(s)")]
    OnCooldown { skill: String, remaining: u32 },
    #[error("{skill} needs {needed} mana, only {available} available")]
    InsufficientMana {
        skill: String,
        needed: i32,
        available: i32,
    },
    #[error("enemy slot {index} is not a living target")]
    InvalidTarget { index: usize },
    #[error("{skill} has no living target")]
    NoTargets { skill: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleError {
    #[error("world {world} does not exist")]
    UnknownWorld { world: u8 },
    #[error("world {world} is locked (requires level {required_level} and the previous world cleared)")]
    WorldLocked { world: u8, required_level: u32 },
}
